// tests/evaluator_tests.rs

use arlington_predicates::ast::NodeType;
use arlington_predicates::grammar::{Column, TsvRow};
use arlington_predicates::object::Object;
use arlington_predicates::parser::parse_row_field;
use arlington_predicates::{EvalContext, Evaluator, PdfVersion, Reduction};
use pretty_assertions::assert_eq;

fn v(text: &str) -> PdfVersion {
    text.parse().unwrap()
}

fn ctx<'a>(version: &str) -> EvalContext<'a, Object> {
    EvalContext::new(v(version))
}

fn reduce(predicate: &str, ctx: EvalContext<'_, Object>, obj: &Object) -> Reduction {
    let ast = parse_row_field(predicate).unwrap();
    Evaluator::new(ctx).evaluate(&ast, obj)
}

fn reduce_bool(predicate: &str, ctx: EvalContext<'_, Object>, obj: &Object) -> Option<bool> {
    reduce(predicate, ctx, obj).as_bool()
}

fn rect(coords: [f64; 4]) -> Object {
    Object::array(coords.map(Object::real))
}

// ============================================================================
// Version Gates
// ============================================================================

#[test]
fn test_before_version_with_payload() {
    let out = reduce("fn:BeforeVersion(1.3,string-byte)", ctx("1.2"), &Object::Null);
    assert_eq!(out.kind(), Some(NodeType::Type));
    assert_eq!(out.node(), Some("string-byte"));
    assert!(out.fully_processed);

    let out = reduce("fn:BeforeVersion(1.3,string-byte)", ctx("1.4"), &Object::Null);
    assert_eq!(out.value, None);
}

#[test]
fn test_version_gates_without_payload() {
    assert_eq!(reduce_bool("fn:SinceVersion(1.5)", ctx("1.5"), &Object::Null), Some(true));
    assert_eq!(reduce_bool("fn:SinceVersion(1.5)", ctx("1.4"), &Object::Null), Some(false));
    assert_eq!(reduce_bool("fn:IsPDFVersion(1.7)", ctx("1.7"), &Object::Null), Some(true));
    assert_eq!(reduce_bool("fn:IsPDFVersion(1.7)", ctx("2.0"), &Object::Null), Some(false));
}

#[test]
fn test_deprecated_boundary() {
    let before = reduce("fn:Deprecated(1.4,name)", ctx("1.3"), &Object::Null);
    assert_eq!(before.node(), Some("name"));
    assert!(!before.deprecated);

    let at = reduce("fn:Deprecated(1.4,name)", ctx("1.4"), &Object::Null);
    assert_eq!(at.value, None);
    assert!(at.deprecated);
}

#[test]
fn test_bad_version_argument_is_incomplete() {
    let out = reduce("fn:SinceVersion(1.8,name)", ctx("2.0"), &Object::Null);
    assert_eq!(out.value, None);
    assert!(!out.fully_processed);
}

// ============================================================================
// Arrays and Rectangles
// ============================================================================

#[test]
fn test_array_length() {
    let rows = [TsvRow::new("Matrix", "array")];
    let obj = Object::array([Object::integer(1), Object::integer(2), Object::integer(3)]);
    let out = reduce("fn:ArrayLength(Matrix)", ctx("1.7").with_rows(&rows, 0), &obj);
    assert_eq!(out.kind(), Some(NodeType::ConstInt));
    assert_eq!(out.node(), Some("3"));
}

#[test]
fn test_reduced_arguments_are_attached() {
    let rows = [TsvRow::new("Matrix", "array")];
    let obj = Object::array([Object::integer(1)]);
    let out = reduce("fn:ArrayLength(Matrix)", ctx("1.7").with_rows(&rows, 0), &obj);
    let value = out.value.unwrap();
    assert_eq!(value.left().map(|n| n.node.as_str()), Some("Matrix"));
    assert!(value.valid());
}

#[test]
fn test_rect_width_and_height() {
    let rows = [TsvRow::new("Rect", "rectangle")];
    let obj = rect([0.0, 0.0, 10.0, 20.0]);

    let width = reduce("fn:RectWidth(Rect)", ctx("1.7").with_rows(&rows, 0), &obj);
    assert_eq!(width.kind(), Some(NodeType::ConstNum));
    assert_eq!(width.node(), Some("10.0"));

    let height = reduce("fn:RectHeight(Rect)", ctx("1.7").with_rows(&rows, 0), &obj);
    assert_eq!(height.kind(), Some(NodeType::ConstNum));
    assert_eq!(height.node(), Some("20.0"));
}

#[test]
fn test_rect_height_rounds_and_width_does_not() {
    let rows = [TsvRow::new("Rect", "rectangle")];
    let obj = rect([0.0, 0.0, 10.4, 20.4]);
    let width = reduce("fn:RectWidth(Rect)", ctx("1.7").with_rows(&rows, 0), &obj);
    let height = reduce("fn:RectHeight(Rect)", ctx("1.7").with_rows(&rows, 0), &obj);
    assert_eq!(width.node(), Some("10.4"));
    assert_eq!(height.node(), Some("20.0"));
}

#[test]
fn test_rect_of_non_rectangle() {
    let rows = [TsvRow::new("Rect", "rectangle")];
    let out = reduce("fn:RectWidth(Rect)", ctx("1.7").with_rows(&rows, 0), &Object::integer(3));
    assert_eq!(out.value, None);
}

#[test]
fn test_array_sort_ascending() {
    let rows = [TsvRow::new("Limits", "array")];
    let sorted = Object::array([1, 5, 2, 7, 3, 9].map(Object::integer));
    assert_eq!(
        reduce_bool("fn:ArraySortAscending(Limits,2)", ctx("1.7").with_rows(&rows, 0), &sorted),
        Some(true)
    );
    assert_eq!(
        reduce_bool("fn:ArraySortAscending(Limits,1)", ctx("1.7").with_rows(&rows, 0), &sorted),
        Some(false)
    );
}

#[test]
fn test_string_length() {
    let rows = [TsvRow::new("T", "string")];
    let out = reduce("fn:StringLength(T)", ctx("1.7").with_rows(&rows, 0), &Object::string("abc"));
    assert_eq!(out.node(), Some("3"));
}

// ============================================================================
// Bits
// ============================================================================

#[test]
fn test_bit_set_and_clear() {
    let five = Object::integer(5);
    assert_eq!(reduce_bool("fn:BitSet(1)", ctx("1.7"), &five), Some(true));
    assert_eq!(reduce_bool("fn:BitSet(2)", ctx("1.7"), &five), Some(false));
    assert_eq!(reduce_bool("fn:BitClear(2)", ctx("1.7"), &five), Some(true));
    assert_eq!(reduce_bool("fn:BitClear(3)", ctx("1.7"), &five), Some(false));
}

#[test]
fn test_bit_ranges() {
    let seven = Object::integer(7);
    assert_eq!(reduce_bool("fn:BitsSet(1,3)", ctx("1.7"), &seven), Some(true));
    assert_eq!(reduce_bool("fn:BitsClear(4,32)", ctx("1.7"), &seven), Some(true));
    assert_eq!(reduce_bool("fn:BitsClear(3,4)", ctx("1.7"), &seven), Some(false));
}

#[test]
fn test_reversed_bit_range() {
    let out = reduce("fn:BitsSet(3,1)", ctx("1.7"), &Object::integer(7));
    assert_eq!(out.value, None);
    assert!(!out.fully_processed);
}

#[test]
fn test_bits_of_non_integer() {
    assert_eq!(reduce_bool("fn:BitSet(1)", ctx("1.7"), &Object::real(1.0)), Some(false));
}

// ============================================================================
// Key Values and Paths
// ============================================================================

#[test]
fn test_sibling_key_from_container() {
    let rows = [TsvRow::new("Rect", "rectangle")];
    let container = Object::dict([("Subtype", Object::name("Link"))]);
    let obj = rect([0.0, 0.0, 1.0, 1.0]);
    let ctx = ctx("1.7").with_rows(&rows, 0).with_container(&container);
    assert_eq!(reduce_bool("fn:Eval(@Subtype==Link)", ctx.clone(), &obj), Some(true));
    assert_eq!(reduce_bool("fn:Eval(@Subtype!=Link)", ctx, &obj), Some(false));
}

#[test]
fn test_name_equals_quoted_string() {
    let rows = [TsvRow::new("StateModel", "name")];
    let ctx = ctx("1.7").with_rows(&rows, 0);
    let marked = Object::name("Marked");

    let out = reduce("fn:Eval(@StateModel=='Marked')", ctx.clone(), &marked);
    assert_eq!(out.as_bool(), Some(true));
    assert!(out.fully_processed);
    assert_eq!(reduce_bool("fn:Eval(@StateModel!='Marked')", ctx.clone(), &marked), Some(false));
    assert_eq!(reduce_bool("fn:Eval(@StateModel=='Review')", ctx.clone(), &marked), Some(false));
    assert_eq!(
        reduce_bool("fn:SinceVersion(1.5,fn:Eval(@StateModel=='Marked'))", ctx, &marked),
        Some(true)
    );
}

#[test]
fn test_numbers_compare_across_kinds() {
    assert_eq!(reduce_bool("fn:Eval(1==1.0)", ctx("1.7"), &Object::Null), Some(true));
    assert_eq!(reduce_bool("fn:Eval(1!=1.0)", ctx("1.7"), &Object::Null), Some(false));
}

#[test]
fn test_self_reference_to_dictionary_is_incomplete() {
    let rows = [TsvRow::new("D", "dictionary")];
    let dict = Object::dict([("A", Object::integer(1))]);
    let out = reduce("fn:Eval(@D)", ctx("1.7").with_rows(&rows, 0), &dict);
    assert_eq!(out.value, None);
    assert!(!out.fully_processed);

    let out = reduce("fn:Eval(@D==1)", ctx("1.7").with_rows(&rows, 0), &Object::integer(1));
    assert_eq!(out.as_bool(), Some(true));
    assert!(out.fully_processed);
}

#[test]
fn test_key_without_container_passes_through() {
    let out = reduce("@Subtype", ctx("1.7"), &Object::Null);
    assert_eq!(out.kind(), Some(NodeType::Key));
    assert_eq!(out.node(), Some("Subtype"));
    assert!(!out.fully_processed);
}

#[test]
fn test_self_reference_and_modulo() {
    let rows = [TsvRow::new("Length", "integer")];
    let ctx = ctx("1.7").with_rows(&rows, 0);
    assert_eq!(reduce_bool("fn:Eval((@Length mod 8)==0)", ctx.clone(), &Object::integer(16)), Some(true));
    assert_eq!(reduce_bool("fn:Eval((@Length mod 8)==0)", ctx.clone(), &Object::integer(12)), Some(false));
    assert_eq!(reduce("fn:Eval((@Length mod 0)==0)", ctx, &Object::integer(12)).value, None);
}

#[test]
fn test_decimal_arithmetic() {
    assert_eq!(reduce_bool("fn:Eval((0.1 + 0.2)==0.3)", ctx("1.7"), &Object::Null), Some(true));
    let rows = [TsvRow::new("W", "integer")];
    assert_eq!(
        reduce_bool("fn:Eval((@W * 2)==32)", ctx("1.7").with_rows(&rows, 0), &Object::integer(16)),
        Some(true)
    );
}

#[test]
fn test_trailer_catalog_path() {
    let trailer = Object::dict([("Root", Object::dict([("Type", Object::name("Catalog"))]))]);
    let container = Object::dict(Vec::<(String, Object)>::new());
    let ctx = ctx("1.7").with_container(&container).with_trailer(&trailer);
    assert_eq!(
        reduce_bool("fn:Eval(trailer::Catalog::@Type==Catalog)", ctx, &Object::Null),
        Some(true)
    );
}

#[test]
fn test_trailer_path_without_trailer() {
    let container = Object::dict(Vec::<(String, Object)>::new());
    let out = reduce("trailer::Catalog::@Type", ctx("1.7").with_container(&container), &Object::Null);
    assert_eq!(out.value, None);
    assert!(!out.fully_processed);
}

#[test]
fn test_wildcard_and_index_paths() {
    let container = Object::dict([(
        "Kids",
        Object::array([Object::dict([("Type", Object::name("Page"))])]),
    )]);
    let ctx = ctx("1.7").with_container(&container);
    assert_eq!(reduce("Kids::0::@Type", ctx.clone(), &Object::Null).node(), Some("Page"));
    assert_eq!(reduce_bool("fn:IsPresent(Kids::*::Type)", ctx.clone(), &Object::Null), Some(true));
    assert_eq!(reduce_bool("fn:IsPresent(Kids::1::Type)", ctx, &Object::Null), Some(false));
}

#[test]
fn test_default_value_fallback() {
    let rows = [
        TsvRow::new("ColorSpace", "name"),
        TsvRow::new("BitsPerComponent", "integer").with(Column::DefaultValue, "8"),
    ];
    let container = Object::dict(Vec::<(String, Object)>::new());
    let base = ctx("1.7").with_rows(&rows, 0).with_container(&container);

    assert_eq!(
        reduce_bool("fn:Eval(@BitsPerComponent==8)", base.clone().with_default_values(true), &Object::Null),
        Some(true)
    );
    assert_eq!(
        reduce("fn:Eval(@BitsPerComponent==8)", base, &Object::Null).value,
        None
    );
}

// ============================================================================
// Logical Operators
// ============================================================================

#[test]
fn test_inapplicable_side_drops_out() {
    let one = Object::integer(1);
    // SinceVersion(1.5,true) does not apply at 1.4, BitSet(1) decides
    assert_eq!(
        reduce_bool("fn:Eval(fn:SinceVersion(1.5,true) || fn:BitSet(2))", ctx("1.4"), &one),
        Some(false)
    );
    assert_eq!(
        reduce_bool("fn:Eval(fn:BitSet(2) || fn:SinceVersion(1.5,true))", ctx("1.4"), &one),
        Some(false)
    );
    assert_eq!(
        reduce_bool("fn:Eval(fn:SinceVersion(1.5,true) || fn:BitSet(2))", ctx("1.5"), &one),
        Some(true)
    );
}

#[test]
fn test_version_choice_with_extension() {
    let out = reduce(
        "fn:Eval(fn:Extension(ADBE_Extn3,1.6) || 2.0)",
        ctx("1.7").with_extensions(["ADBE_Extn3"]),
        &Object::Null,
    );
    assert_eq!(out.kind(), Some(NodeType::ConstNum));
    assert_eq!(out.node(), Some("1.6"));

    let out = reduce("fn:Eval(fn:Extension(ADBE_Extn3,1.6) || 2.0)", ctx("1.7"), &Object::Null);
    assert_eq!(out.node(), Some("2.0"));
}

#[test]
fn test_and_or() {
    let five = Object::integer(5);
    assert_eq!(reduce_bool("fn:Eval(fn:BitSet(1) && fn:BitSet(3))", ctx("1.7"), &five), Some(true));
    assert_eq!(reduce_bool("fn:Eval(fn:BitSet(1) && fn:BitSet(2))", ctx("1.7"), &five), Some(false));
    assert_eq!(reduce_bool("fn:Eval(fn:BitSet(2) || fn:BitSet(3))", ctx("1.7"), &five), Some(true));
}

#[test]
fn test_not() {
    assert_eq!(reduce_bool("fn:Not(fn:BitSet(1))", ctx("1.7"), &Object::integer(1)), Some(false));
}

// ============================================================================
// Object Predicates
// ============================================================================

#[test]
fn test_extension() {
    let supported = ctx("2.0").with_extensions(["ISO_19005_3"]);
    assert_eq!(reduce_bool("fn:Extension(ISO_19005_3)", supported, &Object::Null), Some(true));
    assert_eq!(reduce_bool("fn:Extension(ISO_19005_3)", ctx("2.0"), &Object::Null), Some(false));
    let all = ctx("2.0").with_extensions(["*"]);
    assert_eq!(reduce_bool("fn:Extension(ADBE_Extn3)", all, &Object::Null), Some(true));
}

#[test]
fn test_must_be_indirect() {
    let indirect = Object::indirect(4, Object::dict([("Type", Object::name("Font"))]));
    let direct = Object::dict([("Type", Object::name("Font"))]);
    assert_eq!(reduce_bool("fn:MustBeIndirect(true)", ctx("1.7"), &indirect), Some(true));
    assert_eq!(reduce_bool("fn:MustBeIndirect(true)", ctx("1.7"), &direct), Some(false));
    assert_eq!(reduce_bool("fn:MustBeIndirect(false)", ctx("1.7"), &indirect), Some(false));
    assert_eq!(reduce_bool("fn:MustBeDirect()", ctx("1.7"), &direct), Some(true));
}

#[test]
fn test_required_value() {
    let rows = [TsvRow::new("S", "name")];
    let container = Object::dict([("Subtype", Object::name("Link"))]);
    let ctx = ctx("1.7").with_rows(&rows, 0).with_container(&container);

    let out = reduce("fn:RequiredValue(@Subtype==Link,GoTo)", ctx.clone(), &Object::name("GoTo"));
    assert_eq!(out.node(), Some("GoTo"));

    let out = reduce("fn:RequiredValue(@Subtype==Link,GoTo)", ctx.clone(), &Object::name("URI"));
    assert_eq!(out.value, None);

    let out = reduce("fn:RequiredValue(@Subtype==Widget,GoTo)", ctx, &Object::name("URI"));
    assert_eq!(out.as_bool(), Some(false));
}

#[test]
fn test_not_standard_14_font() {
    let font = |base: &str| {
        Object::dict([
            ("Type", Object::name("Font")),
            ("Subtype", Object::name("Type1")),
            ("BaseFont", Object::name(base)),
        ])
    };
    assert_eq!(reduce_bool("fn:NotStandard14Font()", ctx("1.7"), &font("Helvetica")), Some(false));
    assert_eq!(reduce_bool("fn:NotStandard14Font()", ctx("1.7"), &font("Garamond")), Some(true));
}

#[test]
fn test_is_hex_string() {
    assert_eq!(reduce_bool("fn:IsHexString()", ctx("1.7"), &Object::hex_string("0A")), Some(true));
    assert_eq!(reduce_bool("fn:IsHexString()", ctx("1.7"), &Object::string("0A")), Some(false));
}

#[test]
fn test_is_field_name() {
    assert_eq!(reduce_bool("fn:IsFieldName()", ctx("1.7"), &Object::string("Name")), Some(true));
    assert_eq!(reduce_bool("fn:IsFieldName()", ctx("1.7"), &Object::string("a.b")), Some(false));
}

#[test]
fn test_is_pdf_tagged() {
    let trailer = Object::dict([(
        "Root",
        Object::dict([("MarkInfo", Object::dict([("Marked", Object::Boolean(true))]))]),
    )]);
    assert_eq!(
        reduce_bool("fn:IsPDFTagged()", ctx("1.7").with_trailer(&trailer), &Object::Null),
        Some(true)
    );
    let out = reduce("fn:IsPDFTagged()", ctx("1.7"), &Object::Null);
    assert_eq!(out.as_bool(), Some(false));
    assert!(!out.fully_processed);
}

#[test]
fn test_no_cycle() {
    let rows = [TsvRow::new("Parent", "dictionary")];
    let chain = Object::indirect(
        1,
        Object::dict([("Parent", Object::indirect(2, Object::dict(Vec::<(String, Object)>::new())))]),
    );
    let cycle = Object::indirect(
        1,
        Object::dict([(
            "Parent",
            Object::indirect(
                2,
                Object::dict([("Parent", Object::indirect(1, Object::dict(Vec::<(String, Object)>::new())))]),
            ),
        )]),
    );
    let out = reduce("fn:NoCycle()", ctx("1.7").with_rows(&rows, 0), &chain);
    assert_eq!(out.as_bool(), Some(true));
    assert!(!out.fully_processed);
    assert_eq!(reduce_bool("fn:NoCycle()", ctx("1.7").with_rows(&rows, 0), &cycle), Some(false));
}

#[test]
fn test_document_facts() {
    let out = reduce("fn:Eval(fn:NumberOfPages()==2)", ctx("1.7").with_page_count(2), &Object::Null);
    assert_eq!(out.as_bool(), Some(true));
    assert!(!out.fully_processed);

    let out = reduce("fn:FileSize()", ctx("1.7"), &Object::Null);
    assert_eq!(out.value, None);
    assert!(!out.fully_processed);

    let out = reduce("fn:FileSize()", ctx("1.7").with_file_size(1024), &Object::Null);
    assert_eq!(out.node(), Some("1024"));
    assert!(out.fully_processed);
}

// ============================================================================
// Completeness
// ============================================================================

#[test]
fn test_best_effort_predicates_are_incomplete() {
    for predicate in ["fn:Ignore()", "fn:ImplementationDependent()", "fn:IsMeaningful()", "fn:KeyNameIsColorant()"] {
        let out = reduce(predicate, ctx("1.7"), &Object::Null);
        assert_eq!(out.as_bool(), Some(true), "{}", predicate);
        assert!(!out.fully_processed, "{}", predicate);
    }
}

#[test]
fn test_incompleteness_propagates_to_the_root() {
    let out = reduce("fn:Eval(fn:Ignore() && fn:BitSet(1))", ctx("1.7"), &Object::integer(1));
    assert_eq!(out.as_bool(), Some(true));
    assert!(!out.fully_processed);
}

#[test]
fn test_complete_reduction() {
    let out = reduce("fn:Eval(fn:BitSet(1) && fn:SinceVersion(1.2))", ctx("1.7"), &Object::integer(1));
    assert_eq!(out.as_bool(), Some(true));
    assert!(out.fully_processed);
    assert!(!out.deprecated);
}

// ============================================================================
// Document Structure
// ============================================================================

#[test]
fn test_contains_name_or_array_element() {
    let rows = [TsvRow::new("Filter", "array;name")];
    let filters = Object::array([Object::name("FlateDecode"), Object::name("DCTDecode")]);
    let ctx = ctx("1.7").with_rows(&rows, 0);
    assert_eq!(reduce_bool("fn:Contains(@Filter,DCTDecode)", ctx.clone(), &filters), Some(true));
    assert_eq!(reduce_bool("fn:Contains(@Filter,JPXDecode)", ctx.clone(), &filters), Some(false));
    assert_eq!(
        reduce_bool("fn:Contains(@Filter,DCTDecode)", ctx, &Object::name("DCTDecode")),
        Some(true)
    );
}

#[test]
fn test_colorants() {
    let rows = [TsvRow::new("Colorants", "array")];
    let process = Object::array([Object::name("Cyan"), Object::name("Black")]);
    let spot = Object::array([Object::name("PANTONE 300 C")]);
    let ctx = ctx("1.7").with_rows(&rows, 0);
    assert_eq!(reduce_bool("fn:HasProcessColorants(Colorants)", ctx.clone(), &process), Some(true));
    assert_eq!(reduce_bool("fn:HasSpotColorants(Colorants)", ctx.clone(), &process), Some(false));
    assert_eq!(reduce_bool("fn:HasProcessColorants(Colorants)", ctx.clone(), &spot), Some(false));
    assert_eq!(reduce_bool("fn:HasSpotColorants(Colorants)", ctx, &spot), Some(true));
}

#[test]
fn test_in_key_map_and_name_tree() {
    let trailer = Object::dict([(
        "Root",
        Object::dict([
            ("Dests", Object::dict([("Chapter1", Object::array([]))])),
            (
                "Names",
                Object::dict([(
                    "Dests",
                    Object::dict([("Names", Object::array([Object::string("Intro"), Object::array([])]))]),
                )]),
            ),
        ]),
    )]);
    let container = Object::dict(Vec::<(String, Object)>::new());
    let ctx = ctx("1.7").with_container(&container).with_trailer(&trailer);

    assert_eq!(
        reduce_bool("fn:InKeyMap(trailer::Catalog::Dests)", ctx.clone(), &Object::name("Chapter1")),
        Some(true)
    );
    assert_eq!(
        reduce_bool("fn:InKeyMap(trailer::Catalog::Dests)", ctx.clone(), &Object::name("Chapter2")),
        Some(false)
    );
    assert_eq!(
        reduce_bool("fn:InNameTree(trailer::Catalog::Names::Dests)", ctx.clone(), &Object::string("Intro")),
        Some(true)
    );
    assert_eq!(
        reduce_bool("fn:InNameTree(trailer::Catalog::Names::Dests)", ctx, &Object::string("Outro")),
        Some(false)
    );
}

#[test]
fn test_page_property() {
    let page = Object::indirect(3, Object::dict([("Type", Object::name("Page")), ("Rotate", Object::integer(90))]));
    let container = Object::dict([("P", page)]);
    let ctx = ctx("1.7").with_container(&container);
    assert_eq!(
        reduce_bool("fn:Eval(fn:PageProperty(@P,Rotate)==90)", ctx.clone(), &Object::Null),
        Some(true)
    );
    assert_eq!(reduce("fn:PageProperty(@P,UserUnit)", ctx, &Object::Null).value, None);
}

#[test]
fn test_is_last_in_number_format_array() {
    let first = Object::indirect(1, Object::dict([("U", Object::string("ft"))]));
    let last = Object::indirect(2, Object::dict([("U", Object::string("in"))]));
    let formats = Object::array([first.clone(), last.clone()]);
    let ctx = ctx("1.7").with_container(&formats);
    assert_eq!(reduce_bool("fn:IsLastInNumberFormatArray(parent)", ctx.clone(), &last), Some(true));
    assert_eq!(reduce_bool("fn:IsLastInNumberFormatArray(parent)", ctx, &first), Some(false));
}

#[test]
fn test_stream_length() {
    let rows = [TsvRow::new("Contents", "stream")];
    let stream = Object::stream(Object::dict([("Length", Object::integer(42))]));
    let out = reduce("fn:StreamLength(Contents)", ctx("1.7").with_rows(&rows, 0), &stream);
    assert_eq!(out.node(), Some("42"));
}

#[test]
fn test_object_kind_checks() {
    let descriptor = Object::dict([("Type", Object::name("FontDescriptor"))]);
    let image = Object::dict([("Subtype", Object::name("Image"))]);
    assert_eq!(reduce_bool("fn:FontHasLatinChars()", ctx("1.7"), &descriptor), Some(true));
    assert_eq!(reduce_bool("fn:FontHasLatinChars()", ctx("1.7"), &image), Some(false));
    assert_eq!(reduce_bool("fn:ImageIsStructContentItem()", ctx("1.7"), &image), Some(true));
}

#[test]
fn test_always_unencrypted() {
    let plain = Object::dict([("Size", Object::integer(10))]);
    let encrypted = Object::dict([("Encrypt", Object::dict([("Filter", Object::name("Standard"))]))]);
    let s = Object::string("abc");

    let out = reduce("fn:AlwaysUnencrypted()", ctx("1.7").with_trailer(&plain), &s);
    assert_eq!((out.as_bool(), out.fully_processed), (Some(true), true));
    let out = reduce("fn:AlwaysUnencrypted()", ctx("1.7").with_trailer(&encrypted), &s);
    assert_eq!((out.as_bool(), out.fully_processed), (Some(false), false));
    let out = reduce("fn:AlwaysUnencrypted()", ctx("1.7"), &s);
    assert_eq!((out.as_bool(), out.fully_processed), (Some(true), false));
}

#[test]
fn test_encrypted_wrapper_and_associated_files() {
    let payload = Object::indirect(7, Object::dict([("AFRelationship", Object::name("EncryptedPayload"))]));
    let trailer = Object::dict([(
        "Root",
        Object::dict([
            ("Collection", Object::dict([("View", Object::name("H"))])),
            (
                "Names",
                Object::dict([(
                    "EmbeddedFiles",
                    Object::dict([("Names", Object::array([Object::string("payload"), payload.clone()]))]),
                )]),
            ),
            ("AF", Object::array([payload.clone()])),
        ]),
    )]);
    let wrapper = ctx("2.0").with_trailer(&trailer);
    assert_eq!(reduce_bool("fn:IsEncryptedWrapper()", wrapper.clone(), &Object::Null), Some(true));
    assert_eq!(reduce_bool("fn:IsAssociatedFile()", wrapper.clone(), &payload), Some(true));

    let other = Object::indirect(8, Object::dict([("Type", Object::name("Filespec"))]));
    assert_eq!(reduce_bool("fn:IsAssociatedFile()", wrapper, &other), Some(false));

    let out = reduce("fn:IsEncryptedWrapper()", ctx("2.0"), &Object::Null);
    assert_eq!((out.as_bool(), out.fully_processed), (Some(false), false));
}

#[test]
fn test_default_value_predicate_and_not_present() {
    let link = Object::dict([("Subtype", Object::name("Link"))]);
    let widget = Object::dict([("Subtype", Object::name("Widget"))]);
    let out = reduce("fn:DefaultValue(@Subtype==Link,Foo)", ctx("1.7").with_container(&link), &Object::Null);
    assert_eq!(out.node(), Some("Foo"));
    assert_eq!(
        reduce("fn:DefaultValue(@Subtype==Link,Foo)", ctx("1.7").with_container(&widget), &Object::Null).value,
        None
    );

    assert_eq!(
        reduce_bool("fn:NotPresent(Contents)", ctx("1.7").with_container(&link), &Object::Null),
        Some(true)
    );
    assert_eq!(
        reduce_bool("fn:NotPresent(Subtype)", ctx("1.7").with_container(&link), &Object::Null),
        Some(false)
    );
}

#[test]
fn test_parent_paths_are_incomplete() {
    let container = Object::dict([("Type", Object::name("Annot"))]);
    let out = reduce("fn:Eval(parent::@Type==Page)", ctx("1.7").with_container(&container), &Object::Null);
    assert_eq!(out.value, None);
    assert!(!out.fully_processed);
}
