// tests/processor_tests.rs

use arlington_predicates::ast::NodeType;
use arlington_predicates::grammar::{Column, TsvRow};
use arlington_predicates::object::Object;
use arlington_predicates::{EvalContext, PdfVersion, PredicateProcessor, ReferenceType};
use pretty_assertions::assert_eq;

fn v(text: &str) -> PdfVersion {
    text.parse().unwrap()
}

fn ctx<'a>(version: &str) -> EvalContext<'a, Object> {
    EvalContext::new(v(version))
}

fn row(column: Column, cell: &str) -> Vec<TsvRow> {
    vec![TsvRow::new("Key", "name").with(column, cell)]
}

fn check(column: Column, cell: &str) -> bool {
    let rows = row(column, cell);
    let pp = PredicateProcessor::new(&rows);
    match column {
        Column::Key => pp.validate_key_syntax(0),
        Column::Type => pp.validate_type_syntax(0),
        Column::SinceVersion => pp.validate_since_version_syntax(0),
        Column::DeprecatedIn => pp.validate_deprecated_in_syntax(0),
        Column::Required => pp.validate_required_syntax(0),
        Column::IndirectReference => pp.validate_indirect_ref_syntax(0),
        Column::Inheritable => pp.validate_inheritable_syntax(0),
        Column::DefaultValue => pp.validate_default_value_syntax(0),
        Column::PossibleValues => pp.validate_possible_values_syntax(0),
        Column::SpecialCase => pp.validate_special_case_syntax(0),
        Column::Link => pp.validate_links_syntax(0),
        Column::Note => true,
    }
}

// ============================================================================
// Key and Type
// ============================================================================

#[test]
fn test_key_syntax() {
    for key in ["Subtype", "*", "1*", "0", "Adobe.PPKLite", "3DRenderMode"] {
        let rows = vec![TsvRow::new(key, "name")];
        assert!(PredicateProcessor::new(&rows).validate_key_syntax(0), "{}", key);
    }
    for key in ["", "a b", "fn:Eval(1)", "@Type"] {
        let rows = vec![TsvRow::new(key, "name")];
        assert!(!PredicateProcessor::new(&rows).validate_key_syntax(0), "{}", key);
    }
}

#[test]
fn test_type_syntax() {
    let valid = [
        "name",
        "integer;dictionary",
        "name;fn:SinceVersion(1.5,dictionary)",
        "fn:Deprecated(1.4,string-byte)",
        "fn:Extension(ADBE_Extn3,array)",
    ];
    for types in valid {
        assert!(check(Column::Type, types), "{}", types);
    }
    let invalid = [
        "",
        "bogus",
        "name;;integer",
        "fn:SinceVersion(1.0,name)",
        "fn:BeforeVersion(1.0,name)",
        "fn:SinceVersion(1.8,name)",
        "fn:SinceVersion(1.5,bogus)",
    ];
    for types in invalid {
        assert!(!check(Column::Type, types), "{}", types);
    }
}

#[test]
fn test_reduce_type_element() {
    assert_eq!(PredicateProcessor::reduce_type_element("name"), "name");
    assert_eq!(PredicateProcessor::reduce_type_element("fn:SinceVersion(1.5,name-tree)"), "name-tree");
    assert_eq!(PredicateProcessor::reduce_type_element("fn:Extension(ADBE_Extn3,array)"), "array");
    assert_eq!(PredicateProcessor::reduce_type_element("bogus"), "");
    assert_eq!(PredicateProcessor::reduce_type_element("fn:SinceVersion(1.5,bogus)"), "");
}

// ============================================================================
// SinceVersion and DeprecatedIn
// ============================================================================

#[test]
fn test_since_version_syntax() {
    assert!(check(Column::SinceVersion, "1.5"));
    assert!(check(
        Column::SinceVersion,
        "fn:Extension(ADBE_Extn3,1.7)"));
    assert!(!check(Column::SinceVersion, "1.8"));
    assert!(!check(Column::SinceVersion, ""));
    assert!(!check(Column::SinceVersion, "fn:Bogus(1)"));
}

#[test]
fn test_plain_since_version() {
    let rows = row(Column::SinceVersion, "1.5");
    let pp = PredicateProcessor::new(&rows);
    assert!(!pp.is_valid_for_pdf_version(&ctx("1.4"), &Object::Null, 0));
    assert!(pp.is_valid_for_pdf_version(&ctx("1.5"), &Object::Null, 0));
    assert!(pp.is_valid_for_pdf_version(&ctx("2.0"), &Object::Null, 0));
}

#[test]
fn test_extension_since_version() {
    let rows = row(Column::SinceVersion, "fn:Extension(ADBE_Extn3,1.7)");
    let pp = PredicateProcessor::new(&rows);
    assert!(pp.is_valid_for_pdf_version(&ctx("1.7").with_extensions(["ADBE_Extn3"]), &Object::Null, 0));
    assert!(!pp.is_valid_for_pdf_version(&ctx("1.6").with_extensions(["ADBE_Extn3"]), &Object::Null, 0));
    assert!(!pp.is_valid_for_pdf_version(&ctx("1.7"), &Object::Null, 0));
}

#[test]
fn test_deprecated_in() {
    assert!(check(Column::DeprecatedIn, ""));
    assert!(check(Column::DeprecatedIn, "1.4"));
    assert!(!check(Column::DeprecatedIn, "1.9"));

    let rows = row(Column::DeprecatedIn, "1.4");
    let pp = PredicateProcessor::new(&rows);
    assert!(!pp.is_deprecated(v("1.3"), 0));
    assert!(pp.is_deprecated(v("1.4"), 0));
    assert!(pp.is_deprecated(v("2.0"), 0));

    let rows = row(Column::DeprecatedIn, "");
    assert!(!PredicateProcessor::new(&rows).is_deprecated(v("2.0"), 0));
}

// ============================================================================
// Required
// ============================================================================

#[test]
fn test_required_syntax() {
    assert!(check(Column::Required, "TRUE"));
    assert!(check(Column::Required, "FALSE"));
    assert!(check(
        Column::Required,
        "fn:IsRequired(fn:IsPresent(Alternate) || (@Subtype==Link))"));
    assert!(!check(Column::Required, "fn:Eval(true)"));
    assert!(!check(Column::Required, "maybe"));

    let wildcard = vec![TsvRow::new("*", "name").with(Column::Required, "TRUE")];
    assert!(!PredicateProcessor::new(&wildcard).validate_required_syntax(0));
}

#[test]
fn test_is_required() {
    let rows = vec![
        TsvRow::new("Type", "name")
            .with(Column::SinceVersion, "1.5")
            .with(Column::Required, "TRUE"),
        TsvRow::new("Contents", "string")
            .with(Column::SinceVersion, "1.0")
            .with(Column::Required, "fn:IsRequired(@Subtype==Text)"),
    ];
    let pp = PredicateProcessor::new(&rows);
    let obj = Object::name("Annot");
    assert!(pp.is_required(&ctx("1.7"), &obj, 0, 0));
    assert!(!pp.is_required(&ctx("1.4"), &obj, 0, 0));

    let text = Object::dict([("Subtype", Object::name("Text"))]);
    let link = Object::dict([("Subtype", Object::name("Link"))]);
    assert!(pp.is_required(&ctx("1.7").with_container(&text), &Object::string("x"), 1, 0));
    assert!(!pp.is_required(&ctx("1.7").with_container(&link), &Object::string("x"), 1, 0));
}

// ============================================================================
// IndirectReference
// ============================================================================

#[test]
fn test_indirect_reference_syntax() {
    for cell in [
        "TRUE",
        "FALSE",
        "fn:MustBeDirect()",
        "[TRUE];[FALSE]",
        "fn:MustBeDirect(fn:IsPresent(Encrypt))",
        "fn:MustBeIndirect()",
    ] {
        assert!(
            check(Column::IndirectReference, cell),
            "{}",
            cell
        );
    }
    for cell in ["maybe", "fn:Eval(true)", "[TRUE];[maybe]"] {
        assert!(
            !check(Column::IndirectReference, cell),
            "{}",
            cell
        );
    }
}

#[test]
fn test_reduce_fixed_indirect_reference() {
    let cases = [
        ("TRUE", 0, ReferenceType::MustBeIndirect),
        ("FALSE", 0, ReferenceType::DontCare),
        ("", 0, ReferenceType::DontCare),
        ("fn:MustBeDirect()", 0, ReferenceType::MustBeDirect),
        ("[FALSE];[TRUE]", 0, ReferenceType::DontCare),
        ("[FALSE];[TRUE]", 1, ReferenceType::MustBeIndirect),
        ("[fn:MustBeIndirect()];[FALSE]", 0, ReferenceType::MustBeIndirect),
    ];
    for (cell, type_idx, expected) in cases {
        let rows = row(Column::IndirectReference, cell);
        let pp = PredicateProcessor::new(&rows);
        assert_eq!(
            pp.reduce_indirect_ref_row(&ctx("1.7"), &Object::Null, 0, type_idx),
            expected,
            "{} [{}]",
            cell,
            type_idx
        );
    }
}

#[test]
fn test_reduce_conditional_indirect_reference() {
    let rows = row(Column::IndirectReference, "fn:MustBeDirect(@Subtype==Link)");
    let pp = PredicateProcessor::new(&rows);
    let link = Object::dict([("Subtype", Object::name("Link"))]);
    let widget = Object::dict([("Subtype", Object::name("Widget"))]);
    let obj = Object::name("X");

    assert_eq!(
        pp.reduce_indirect_ref_row(&ctx("1.7").with_container(&link), &obj, 0, 0),
        ReferenceType::MustBeDirect
    );
    assert_eq!(
        pp.reduce_indirect_ref_row(&ctx("1.7").with_container(&widget), &obj, 0, 0),
        ReferenceType::DontCare
    );
}

// ============================================================================
// Inheritable and DefaultValue
// ============================================================================

#[test]
fn test_inheritable() {
    assert!(check(Column::Inheritable, "TRUE"));
    assert!(check(Column::Inheritable, "FALSE"));
    assert!(!check(Column::Inheritable, "true"));

    let rows = row(Column::Inheritable, "TRUE");
    assert!(PredicateProcessor::new(&rows).is_inheritable(0));
    let rows = row(Column::Inheritable, "FALSE");
    assert!(!PredicateProcessor::new(&rows).is_inheritable(0));
}

#[test]
fn test_default_value_syntax() {
    for cell in ["", "8", "[0 0 1 1]", "[Foo];[1]", "fn:SinceVersion(1.5,Foo)"] {
        assert!(
            check(Column::DefaultValue, cell),
            "{}",
            cell
        );
    }
    assert!(!check(Column::DefaultValue, "fn:Bogus(1)"));
}

#[test]
fn test_get_default_value() {
    let rows = vec![
        TsvRow::new("BitsPerComponent", "integer").with(Column::DefaultValue, "8"),
        TsvRow::new("Mode", "name;integer").with(Column::DefaultValue, "[Foo];[1]"),
        TsvRow::new("Rect", "rectangle").with(Column::DefaultValue, "[0 0 1 1]"),
        TsvRow::new("Name", "name"),
    ];
    let pp = PredicateProcessor::new(&rows);

    let dv = pp.get_default_value(0, 0).unwrap();
    assert_eq!((dv.kind, dv.node.as_str()), (NodeType::ConstInt, "8"));

    let dv = pp.get_default_value(1, 0).unwrap();
    assert_eq!((dv.kind, dv.node.as_str()), (NodeType::Key, "Foo"));
    let dv = pp.get_default_value(1, 1).unwrap();
    assert_eq!((dv.kind, dv.node.as_str()), (NodeType::ConstInt, "1"));

    assert_eq!(pp.get_default_value(2, 0), None);
    assert_eq!(pp.get_default_value(3, 0), None);
}

// ============================================================================
// PossibleValues
// ============================================================================

#[test]
fn test_possible_values_syntax() {
    let cases = [
        ("name", "", true),
        ("name", "[Foo,Bar]", true),
        ("name", "Foo,Bar", false),
        ("name;integer", "[A];[1,2]", true),
        ("name;integer", "[A]", false),
        ("boolean", "[true]", false),
        ("boolean", "[]", true),
        ("fn:SinceVersion(1.5,name)", "[fn:SinceVersion(1.5,A),B]", true),
        ("name", "[fn:Bogus(1)]", false),
    ];
    for (types, values, expected) in cases {
        let rows = vec![TsvRow::new("Key", types).with(Column::PossibleValues, values)];
        assert_eq!(
            PredicateProcessor::new(&rows).validate_possible_values_syntax(0),
            expected,
            "{} / {}",
            types,
            values
        );
    }
}

#[test]
fn test_is_valid_value() {
    let rows: Vec<TsvRow> = Vec::new();
    let pp = PredicateProcessor::new(&rows);

    assert!(pp.is_valid_value(&Object::name("Foo"), "Foo,Bar"));
    assert!(!pp.is_valid_value(&Object::name("Baz"), "Foo,Bar"));
    assert!(pp.is_valid_value(&Object::name("Baz"), "Foo,*"));
    assert!(pp.is_valid_value(&Object::string("abc"), "'abc','def'"));
    assert!(!pp.is_valid_value(&Object::string("abc"), "abc"));
    assert!(pp.is_valid_value(&Object::real(1.0), "0,1"));
    assert!(pp.is_valid_value(&Object::integer(2), "1.0,2.0"));
    assert!(!pp.is_valid_value(&Object::integer(3), "1,2"));
    assert!(pp.is_valid_value(&Object::Null, "Foo"));
    assert!(!pp.is_valid_value(&Object::Boolean(true), "true"));

    let decode = Object::array([Object::integer(1), Object::integer(0)]);
    assert!(pp.is_valid_value(&decode, "[0 1],[1 0]"));
    assert!(!pp.is_valid_value(&decode, "[0 1]"));
}

#[test]
fn test_reduce_explicit_possible_values() {
    let rows = vec![TsvRow::new("S", "name").with(Column::PossibleValues, "[Foo,Bar]")];
    let pp = PredicateProcessor::new(&rows);
    assert!(pp.reduce_possible_values_row(&ctx("1.7"), &Object::name("Foo"), 0, 0));
    assert!(!pp.reduce_possible_values_row(&ctx("1.7"), &Object::name("Baz"), 0, 0));
}

#[test]
fn test_explicit_values_only_drops_wildcard() {
    let rows = vec![TsvRow::new("S", "name").with(Column::PossibleValues, "[Foo,*]")];
    let baz = Object::name("Baz");
    assert!(PredicateProcessor::new(&rows).reduce_possible_values_row(&ctx("1.7"), &baz, 0, 0));
    assert!(
        !PredicateProcessor::new(&rows)
            .with_explicit_values_only(true)
            .reduce_possible_values_row(&ctx("1.7"), &baz, 0, 0)
    );
}

#[test]
fn test_versioned_possible_values() {
    let rows = vec![TsvRow::new("S", "name").with(Column::PossibleValues, "[fn:SinceVersion(1.5,Foo),Bar]")];
    let pp = PredicateProcessor::new(&rows);
    let foo = Object::name("Foo");
    assert!(!pp.reduce_possible_values_row(&ctx("1.4"), &foo, 0, 0));
    assert!(pp.reduce_possible_values_row(&ctx("1.5"), &foo, 0, 0));
    assert!(pp.reduce_possible_values_row(&ctx("1.4"), &Object::name("Bar"), 0, 0));

    let rows = vec![TsvRow::new("N", "integer").with(Column::PossibleValues, "[1,2,fn:SinceVersion(2.0,3)]")];
    let pp = PredicateProcessor::new(&rows);
    assert!(!pp.reduce_possible_values_row(&ctx("1.7"), &Object::integer(3), 0, 0));
    assert!(pp.reduce_possible_values_row(&ctx("2.0"), &Object::integer(3), 0, 0));
}

#[test]
fn test_possible_values_per_type() {
    let rows = vec![TsvRow::new("D", "name;dictionary").with(Column::PossibleValues, "[Foo];[]")];
    let pp = PredicateProcessor::new(&rows);
    assert!(pp.reduce_possible_values_row(&ctx("1.7"), &Object::dict([("A", Object::Null)]), 0, 1));
    assert!(!pp.reduce_possible_values_row(&ctx("1.7"), &Object::name("Bar"), 0, 0));
    assert!(!pp.reduce_possible_values_row(&ctx("1.7"), &Object::name("Bar"), 0, 2));
}

// ============================================================================
// SpecialCase and Link
// ============================================================================

#[test]
fn test_special_case_syntax() {
    for cell in ["", "[fn:Eval(@Length>0)]", "[];[fn:Eval(true)]"] {
        assert!(
            check(Column::SpecialCase, cell),
            "{}",
            cell
        );
    }
    assert!(!check(Column::SpecialCase, "[fn:Bogus(1)]"));
}

#[test]
fn test_reduce_special_case() {
    let rows = vec![TsvRow::new("Length", "integer").with(Column::SpecialCase, "[fn:Eval(@Length>0)]")];
    let pp = PredicateProcessor::new(&rows);
    assert!(pp.reduce_special_case_row(&ctx("1.7"), &Object::integer(5), 0, 0));
    assert!(!pp.reduce_special_case_row(&ctx("1.7"), &Object::integer(-1), 0, 0));
}

#[test]
fn test_special_case_per_type() {
    let rows = vec![TsvRow::new("Length", "null;integer").with(Column::SpecialCase, "[];[fn:Eval(@Length>0)]")];
    let pp = PredicateProcessor::new(&rows);
    assert!(pp.reduce_special_case_row(&ctx("1.7"), &Object::integer(-1), 0, 0));
    assert!(!pp.reduce_special_case_row(&ctx("1.7"), &Object::integer(-1), 0, 1));
}

#[test]
fn test_inapplicable_special_case_is_accepted() {
    let rows = vec![TsvRow::new("Length", "integer").with(Column::SpecialCase, "[fn:Eval(@Missing==1)]")];
    let pp = PredicateProcessor::new(&rows);
    let container = Object::dict([("Length", Object::integer(1))]);
    assert!(pp.reduce_special_case_row(&ctx("1.7").with_container(&container), &Object::integer(1), 0, 0));
}

#[test]
fn test_links_syntax() {
    for cell in [
        "",
        "[Foo]",
        "[Foo,Bar]",
        "[];[Foo]",
        "[fn:SinceVersion(1.5,Foo),Bar]",
        "[fn:SinceVersion(2.0,fn:Extension(ISO_TS_32001,HashTable))]",
        "[fn:Extension(ADBE_Extn3,Foo)]",
    ] {
        assert!(check(Column::Link, cell), "{}", cell);
    }
    for cell in ["[Foo,,Bar]", "[fn:Bogus(1.5,Foo)]", "[fn:SinceVersion(1.9,Foo)]"] {
        assert!(!check(Column::Link, cell), "{}", cell);
    }
}

// ============================================================================
// Whole Rows
// ============================================================================

#[test]
fn test_valid_row() {
    let rows = vec![
        TsvRow::new("Type", "name")
            .with(Column::SinceVersion, "1.0")
            .with(Column::Required, "TRUE")
            .with(Column::IndirectReference, "FALSE")
            .with(Column::Inheritable, "FALSE")
            .with(Column::PossibleValues, "[Annot]"),
    ];
    let report = PredicateProcessor::new(&rows).validate_row_syntax(0);
    assert!(report.is_ok());
    assert_eq!(report.to_string(), "Type: ok");
}

#[test]
fn test_invalid_row_reports_every_failing_column() {
    let rows = vec![
        TsvRow::new("Type", "name")
            .with(Column::SinceVersion, "1.9")
            .with(Column::Required, "maybe")
            .with(Column::IndirectReference, "FALSE")
            .with(Column::Inheritable, "FALSE"),
    ];
    let report = PredicateProcessor::new(&rows).validate_row_syntax(0);
    assert_eq!(report.failures, vec![Column::SinceVersion, Column::Required]);
    assert_eq!(report.to_string(), "Type: invalid SinceVersion, Required");
}

#[test]
fn test_missing_row_fails() {
    let rows: Vec<TsvRow> = Vec::new();
    let report = PredicateProcessor::new(&rows).validate_row_syntax(3);
    assert!(!report.is_ok());
    assert_eq!(report.key, "");
}
