use rust_decimal::{Decimal, prelude::ToPrimitive};
use tracing::{debug, warn};

use crate::{
    ast::{AstNode, LogicalOp, MathComp, MathOp, NodeType, Predicate},
    grammar::{Column, TsvRow},
    object::{ObjectType, PdfNumber, PdfObject},
    parser::parse_row_field,
    version::PdfVersion,
};

/// Two reals closer than this compare equal.
pub const NUMBER_TOLERANCE: f64 = 0.000005;

const STANDARD_14_FONTS: [&str; 14] = [
    "Times-Roman",
    "Helvetica",
    "Courier",
    "Symbol",
    "Times-Bold",
    "Helvetica-Bold",
    "Courier-Bold",
    "ZapfDingbats",
    "Times-Italic",
    "Helvetica-Oblique",
    "Courier-Oblique",
    "Times-BoldItalic",
    "Helvetica-BoldOblique",
    "Courier-BoldOblique",
];

const PROCESS_COLORANTS: [&str; 4] = ["Cyan", "Magenta", "Yellow", "Black"];

/// Everything a reduction may consult besides the object being checked.
///
/// `container` is the dictionary or array that holds the object, and is
/// where `@Key` references to sibling keys are looked up. `trailer` gives
/// access to `trailer::` and `trailer::Catalog::` paths.
pub struct EvalContext<'a, O: PdfObject> {
    pub version: PdfVersion,
    pub rows: &'a [TsvRow],
    pub key_idx: usize,
    pub type_idx: usize,
    pub container: Option<&'a O>,
    pub trailer: Option<&'a O>,
    pub extensions: Vec<String>,
    pub file_size: Option<u64>,
    pub page_count: Option<usize>,
    /// Fall back to a row's DefaultValue when an `@Key` is missing
    pub use_default_values: bool,
}

impl<'a, O: PdfObject> Clone for EvalContext<'a, O> {
    fn clone(&self) -> Self {
        EvalContext {
            version: self.version,
            rows: self.rows,
            key_idx: self.key_idx,
            type_idx: self.type_idx,
            container: self.container,
            trailer: self.trailer,
            extensions: self.extensions.clone(),
            file_size: self.file_size,
            page_count: self.page_count,
            use_default_values: self.use_default_values,
        }
    }
}

impl<'a, O: PdfObject> EvalContext<'a, O> {
    pub fn new(version: PdfVersion) -> Self {
        EvalContext {
            version,
            rows: &[],
            key_idx: 0,
            type_idx: 0,
            container: None,
            trailer: None,
            extensions: Vec::new(),
            file_size: None,
            page_count: None,
            use_default_values: false,
        }
    }

    /// The grammar rows of the object being checked and the row of the key
    /// being reduced.
    pub fn with_rows(mut self, rows: &'a [TsvRow], key_idx: usize) -> Self {
        self.rows = rows;
        self.key_idx = key_idx;
        self
    }

    pub fn with_type_index(mut self, type_idx: usize) -> Self {
        self.type_idx = type_idx;
        self
    }

    pub fn with_container(mut self, container: &'a O) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_trailer(mut self, trailer: &'a O) -> Self {
        self.trailer = Some(trailer);
        self
    }

    /// Extensions the document is checked against. `*` enables all of them.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_file_size(mut self, bytes: u64) -> Self {
        self.file_size = Some(bytes);
        self
    }

    pub fn with_page_count(mut self, pages: usize) -> Self {
        self.page_count = Some(pages);
        self
    }

    pub fn with_default_values(mut self, enabled: bool) -> Self {
        self.use_default_values = enabled;
        self
    }

    /// Key name of the row being reduced, or `""` without rows.
    pub fn row_key(&self) -> &'a str {
        self.rows.get(self.key_idx).map(TsvRow::key).unwrap_or("")
    }

    pub fn catalog(&self) -> Option<&'a O> {
        self.trailer.and_then(|t| t.dict_get("Root"))
    }

    pub fn supports_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e == name || e == "*")
    }
}

/// Result of reducing a predicate.
///
/// `value` is `None` when the predicate does not apply (a version gate that
/// is closed, a missing key, an argument that could not be reduced).
/// `fully_processed` is cleared when any part of the reduction relied on a
/// best-effort answer, and `deprecated` is set when a `fn:Deprecated` gate
/// was passed at or after its version.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub value: Option<AstNode>,
    pub fully_processed: bool,
    pub deprecated: bool,
}

impl Reduction {
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_ref().and_then(AstNode::as_bool)
    }

    pub fn node(&self) -> Option<&str> {
        self.value.as_ref().map(|v| v.node.as_str())
    }

    pub fn kind(&self) -> Option<NodeType> {
        self.value.as_ref().map(|v| v.kind)
    }
}

/// Completeness flags of one node and its subtree.
#[derive(Debug, Clone, Copy)]
struct Flags {
    complete: bool,
    deprecated: bool,
}

impl Flags {
    fn new() -> Self {
        Flags {
            complete: true,
            deprecated: false,
        }
    }

    fn incomplete(&mut self) {
        self.complete = false;
    }

    fn absorb(&mut self, child: &Reduction) {
        self.complete &= child.fully_processed;
        self.deprecated |= child.deprecated;
    }
}

/// Reduces predicate ASTs against a PDF object.
pub struct Evaluator<'a, O: PdfObject> {
    ctx: EvalContext<'a, O>,
}

impl<'a, O: PdfObject> Evaluator<'a, O> {
    pub fn new(ctx: EvalContext<'a, O>) -> Self {
        Evaluator { ctx }
    }

    pub fn context(&self) -> &EvalContext<'a, O> {
        &self.ctx
    }

    /// Reduces `ast` against `obj`, the object stored under the row's key.
    ///
    /// The result is a new tree: the reduced root with the reduced forms of
    /// its arguments as children. The input AST is not modified.
    pub fn evaluate(&self, ast: &AstNode, obj: &O) -> Reduction {
        let reduction = self.reduce(ast, obj);
        debug!(
            input = %ast,
            output = ?reduction.value.as_ref().map(ToString::to_string),
            complete = reduction.fully_processed,
            "reduced predicate"
        );
        reduction
    }

    fn reduce(&self, ast: &AstNode, obj: &O) -> Reduction {
        let mut flags = Flags::new();
        let left = ast.left().map(|a| self.reduce(a, obj));
        let right = ast.right().map(|a| self.reduce(a, obj));
        for child in left.iter().chain(right.iter()) {
            flags.absorb(child);
        }
        let out_left = left.and_then(|r| r.value);
        let out_right = right.and_then(|r| r.value);

        let value = match ast.kind {
            kind if kind.is_constant() => Some(ast.shallow()),
            NodeType::KeyValue => self.key_value(ast, obj, &mut flags),
            NodeType::MathComp(op) => match (&out_left, &out_right) {
                (Some(l), Some(r)) => compare(op, l, r).map(AstNode::boolean),
                _ => None,
            },
            NodeType::MathOp(op) => match (&out_left, &out_right) {
                (Some(l), Some(r)) => arithmetic(op, l, r),
                (Some(only), None) | (None, Some(only)) => Some(only.shallow()),
                (None, None) => Some(AstNode::boolean(true)),
            },
            NodeType::LogicalOp(op) => logical(op, out_left.as_ref(), out_right.as_ref()),
            NodeType::Predicate(Predicate::Eval) => {
                return Reduction {
                    value: out_left,
                    fully_processed: flags.complete,
                    deprecated: flags.deprecated,
                };
            }
            NodeType::Predicate(p) => {
                if p.is_best_effort() {
                    flags.incomplete();
                }
                self.predicate(p, ast, obj, out_left.as_ref(), out_right.as_ref(), &mut flags)
            }
            NodeType::Unknown if ast.right().is_none() && ast.left().is_some() => {
                // bracket shell left by parse_expression
                out_left.clone()
            }
            _ => {
                warn!(node = %ast, "unexpected node while reducing");
                flags.incomplete();
                None
            }
        };

        let value = value.map(|mut out| {
            if matches!(
                ast.kind,
                NodeType::Predicate(_) | NodeType::MathComp(_) | NodeType::MathOp(_) | NodeType::LogicalOp(_)
            ) {
                attach(&mut out, out_left, out_right);
            }
            out
        });

        Reduction {
            value,
            fully_processed: flags.complete,
            deprecated: flags.deprecated,
        }
    }

    fn predicate(
        &self,
        predicate: Predicate,
        ast: &AstNode,
        obj: &O,
        left: Option<&AstNode>,
        right: Option<&AstNode>,
        flags: &mut Flags,
    ) -> Option<AstNode> {
        let two_args = ast.right().is_some();
        match predicate {
            Predicate::AlwaysUnencrypted => Some(AstNode::boolean(self.always_unencrypted(obj, flags))),
            Predicate::ArrayLength => {
                let arr = self.lookup(left?, obj, flags)?;
                arr.array_len().map(|n| AstNode::integer(n as i64))
            }
            Predicate::ArraySortAscending => {
                let sorted = self.array_sort_ascending(left?, right?, obj, flags)?;
                Some(AstNode::boolean(sorted))
            }
            Predicate::BeforeVersion => self.version_gate(left, right, two_args, flags, |pdf, arl| pdf < arl),
            Predicate::SinceVersion => self.version_gate(left, right, two_args, flags, |pdf, arl| pdf >= arl),
            Predicate::IsPDFVersion => self.version_gate(left, right, two_args, flags, |pdf, arl| pdf == arl),
            Predicate::Deprecated => {
                let arl = version_arg(left, flags)?;
                if self.ctx.version >= arl {
                    flags.deprecated = true;
                }
                self.version_gate(left, right, two_args, flags, |pdf, arl| pdf < arl)
            }
            Predicate::BitClear | Predicate::BitSet => {
                let bit = bit_arg(left?)?;
                let mask = 1u32 << (bit - 1);
                Some(AstNode::boolean(bits(obj, mask, predicate == Predicate::BitSet)))
            }
            Predicate::BitsClear | Predicate::BitsSet => {
                let (low, high) = (bit_arg(left?)?, bit_arg(right?)?);
                if low > high {
                    warn!(low, high, "bit range is reversed");
                    flags.incomplete();
                    return None;
                }
                let mask = (low..=high).fold(0u32, |m, b| m | (1 << (b - 1)));
                Some(AstNode::boolean(bits(obj, mask, predicate == Predicate::BitsSet)))
            }
            Predicate::Contains => {
                let target = self.lookup(ast.left()?, obj, flags);
                let found = match (target, right) {
                    (Some(target), Some(value)) => contains(target, value),
                    _ => false,
                };
                Some(AstNode::boolean(found))
            }
            Predicate::DefaultValue => match left?.as_bool() {
                Some(true) => right.map(AstNode::shallow),
                Some(false) => None,
                None => {
                    warn!(condition = %left?, "fn:DefaultValue condition is not a boolean");
                    None
                }
            },
            Predicate::Eval => left.map(AstNode::shallow),
            Predicate::Extension => {
                let supported = self.ctx.supports_extension(&left?.node);
                if two_args {
                    if supported { right.map(AstNode::shallow) } else { None }
                } else {
                    Some(AstNode::boolean(supported))
                }
            }
            Predicate::FileSize => match self.ctx.file_size {
                Some(size) => Some(AstNode::integer(size as i64)),
                None => {
                    flags.incomplete();
                    None
                }
            },
            Predicate::FontHasLatinChars => Some(AstNode::boolean(has_name(obj, "Type", "FontDescriptor"))),
            Predicate::HasProcessColorants | Predicate::HasSpotColorants => {
                let process = predicate == Predicate::HasProcessColorants;
                let found = self
                    .lookup(left?, obj, flags)
                    .map(|arr| has_colorants(arr, process))
                    .unwrap_or(false);
                Some(AstNode::boolean(found))
            }
            Predicate::Ignore
            | Predicate::ImplementationDependent
            | Predicate::IsMeaningful
            | Predicate::KeyNameIsColorant
            | Predicate::InMap
            | Predicate::NotInMap => Some(AstNode::boolean(true)),
            Predicate::ImageIsStructContentItem => Some(AstNode::boolean(has_name(obj, "Subtype", "Image"))),
            Predicate::InKeyMap => {
                let map = self.map_object(left?, obj, flags);
                let found = match (map, obj.name()) {
                    (Some(map), Some(name)) => map.dict_has(name),
                    _ => false,
                };
                Some(AstNode::boolean(found))
            }
            Predicate::InNameTree => {
                let tree = self.map_object(left?, obj, flags);
                let found = match (tree, obj.string()) {
                    (Some(tree), Some(s)) => in_flat_name_tree(tree, s, flags),
                    _ => false,
                };
                Some(AstNode::boolean(found))
            }
            Predicate::IsAssociatedFile => Some(AstNode::boolean(self.is_associated_file(obj))),
            Predicate::IsEncryptedWrapper => Some(AstNode::boolean(self.is_encrypted_wrapper(flags))),
            Predicate::IsFieldName => {
                let name = obj.string().unwrap_or("");
                Some(AstNode::boolean(!name.is_empty() && !name.contains('.')))
            }
            Predicate::IsHexString => {
                let hex = match (obj.object_type(), obj.is_hex_string()) {
                    (ObjectType::String, Some(hex)) => hex,
                    (ObjectType::String, None) => {
                        flags.incomplete();
                        false
                    }
                    _ => false,
                };
                Some(AstNode::boolean(hex))
            }
            Predicate::IsLastInNumberFormatArray => {
                Some(AstNode::boolean(self.is_last_in_array(left?, obj)))
            }
            Predicate::IsPDFTagged => {
                let marked = match self.ctx.catalog() {
                    Some(catalog) => catalog
                        .dict_get("MarkInfo")
                        .and_then(|mi| mi.dict_get("Marked"))
                        .and_then(PdfObject::boolean)
                        .unwrap_or(false),
                    None => {
                        flags.incomplete();
                        false
                    }
                };
                Some(AstNode::boolean(marked))
            }
            Predicate::IsPresent => self.is_present(left, right, two_args, obj, flags),
            Predicate::NotPresent => {
                let present = self.is_present(left, None, false, obj, flags)?;
                present.as_bool().map(|b| AstNode::boolean(!b))
            }
            Predicate::IsRequired => Some(AstNode::boolean(left.and_then(AstNode::as_bool).unwrap_or(false))),
            Predicate::MustBeDirect | Predicate::MustBeIndirect => {
                if ast.left().is_none() {
                    return Some(AstNode::boolean(true));
                }
                let arg = left?;
                let direct = predicate == Predicate::MustBeDirect;
                if arg.kind == NodeType::ConstBoolean {
                    let applies = arg.as_bool() == Some(true);
                    return Some(AstNode::boolean(applies && obj.is_indirect() != direct));
                }
                let indirect = self.indirection(arg, obj, flags)?;
                Some(AstNode::boolean(indirect != direct))
            }
            Predicate::NoCycle => Some(AstNode::boolean(no_cycle(obj, self.ctx.row_key()))),
            Predicate::Not => left?.as_bool().map(|b| AstNode::boolean(!b)),
            Predicate::NotStandard14Font => Some(AstNode::boolean(
                has_name(obj, "Type", "Font")
                    && has_name(obj, "Subtype", "Type1")
                    && !obj
                        .dict_get("BaseFont")
                        .and_then(PdfObject::name)
                        .is_some_and(|f| STANDARD_14_FONTS.contains(&f)),
            )),
            Predicate::NumberOfPages => self.ctx.page_count.map(|n| AstNode::integer(n as i64)),
            Predicate::PageContainsStructContentItems => {
                let index = obj.number().and_then(PdfNumber::as_integer);
                Some(AstNode::boolean(index.is_some_and(|i| i >= 0)))
            }
            Predicate::PageProperty => self.page_property(ast, obj, flags),
            Predicate::RectHeight | Predicate::RectWidth => {
                let rect = self.lookup(left?, obj, flags)?;
                let [llx, lly, urx, ury] = rectangle(rect)?;
                let size = if predicate == Predicate::RectHeight {
                    (ury - lly).abs().round()
                } else {
                    (urx - llx).abs()
                };
                Some(AstNode::number(size))
            }
            Predicate::RequiredValue => required_value(obj, left, right?),
            Predicate::StreamLength => {
                let stream = self.lookup(left?, obj, flags)?;
                let len = stream.stream_dict()?.dict_get("Length")?.number()?.as_integer()?;
                (len >= 0).then(|| AstNode::integer(len))
            }
            Predicate::StringLength => {
                let s = self.lookup(left?, obj, flags)?.string()?;
                Some(AstNode::integer(s.chars().count() as i64))
            }
        }
    }

    /// Shared by the version predicates: one argument gives a boolean, two
    /// arguments give the payload while the gate is open.
    fn version_gate(
        &self,
        left: Option<&AstNode>,
        right: Option<&AstNode>,
        two_args: bool,
        flags: &mut Flags,
        open: impl Fn(PdfVersion, PdfVersion) -> bool,
    ) -> Option<AstNode> {
        let arl = version_arg(left, flags)?;
        let holds = open(self.ctx.version, arl);
        if two_args {
            if holds { right.map(AstNode::shallow) } else { None }
        } else {
            Some(AstNode::boolean(holds))
        }
    }

    fn key_value(&self, ast: &AstNode, obj: &O, flags: &mut Flags) -> Option<AstNode> {
        let path = key_path(&ast.node);
        let last = path.last().copied().unwrap_or("");
        let self_ref = path.len() == 1 && last == self.ctx.row_key();

        let found = if self_ref {
            if matches!(
                obj.object_type(),
                ObjectType::Dictionary | ObjectType::Stream | ObjectType::Array
            ) {
                debug!(key = %ast.node, "self-reference to a complex object");
                flags.incomplete();
            }
            Some(obj)
        } else {
            match self.ctx.container {
                Some(container) => self.resolve_path(container, &path, flags),
                None => {
                    debug!(key = %ast.node, "no container to resolve key against");
                    flags.incomplete();
                    return Some(AstNode::key(path.join("::")));
                }
            }
        };

        match found {
            Some(val) => basic_object_to_ast(val),
            None if path.len() == 1 && self.ctx.use_default_values => self.default_value_of(last),
            None => None,
        }
    }

    /// The parsed DefaultValue of the row named `key`.
    fn default_value_of(&self, key: &str) -> Option<AstNode> {
        let row = self
            .ctx
            .rows
            .iter()
            .find(|r| r.key() == key && !r.get(Column::DefaultValue).is_empty())?;
        match parse_row_field(row.get(Column::DefaultValue)) {
            Ok(ast) => Some(ast),
            Err(e) => {
                warn!(key, error = %e, "DefaultValue does not parse");
                None
            }
        }
    }

    /// Walks an Arlington path such as `trailer::Catalog::Pages` or
    /// `Resources::*` starting from `start`.
    fn resolve_path<'o>(&'o self, start: &'o O, path: &[&str], flags: &mut Flags) -> Option<&'o O> {
        let (mut current, rest): (&O, &[&str]) = match path {
            ["trailer", "Catalog", rest @ ..] => match self.ctx.catalog() {
                Some(catalog) => (catalog, rest),
                None => {
                    flags.incomplete();
                    return None;
                }
            },
            ["trailer", rest @ ..] => match self.ctx.trailer {
                Some(trailer) => (trailer, rest),
                None => {
                    flags.incomplete();
                    return None;
                }
            },
            _ => (start, path),
        };

        for segment in rest {
            let segment = segment.trim_start_matches('@');
            if segment == "parent" {
                debug!("parent:: paths are not supported");
                flags.incomplete();
                return None;
            }
            let holder = match current.object_type() {
                ObjectType::Stream => current.stream_dict()?,
                _ => current,
            };
            current = match holder.object_type() {
                ObjectType::Array => {
                    let index = if segment == "*" { 0 } else { array_index(segment)? };
                    holder.array_get(index)?
                }
                ObjectType::Dictionary => {
                    if segment == "*" {
                        let first = holder.dict_keys().first().copied()?;
                        holder.dict_get(first)?
                    } else {
                        holder.dict_get(segment)?
                    }
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Resolves a key argument (`Rect`, `1`, `Parent::Kids`) to an object.
    /// The row's own key is the object being checked.
    fn lookup<'o>(&'o self, key: &AstNode, obj: &'o O, flags: &mut Flags) -> Option<&'o O> {
        let path = key_path(&key.node);
        if path.len() == 1 && path[0] == self.ctx.row_key() {
            return Some(obj);
        }
        match self.ctx.container {
            Some(container) => self.resolve_path(container, &path, flags),
            None => {
                flags.incomplete();
                None
            }
        }
    }

    fn is_present(
        &self,
        left: Option<&AstNode>,
        right: Option<&AstNode>,
        two_args: bool,
        obj: &O,
        flags: &mut Flags,
    ) -> Option<AstNode> {
        let present = match left {
            Some(key) if matches!(key.kind, NodeType::Key | NodeType::ConstInt) => {
                self.lookup(key, obj, flags).is_some()
            }
            Some(cond) => cond.as_bool().unwrap_or(false),
            None => false,
        };
        if !two_args {
            return Some(AstNode::boolean(present));
        }
        if present {
            Some(AstNode::boolean(right.and_then(AstNode::as_bool).unwrap_or(false)))
        } else {
            None
        }
    }

    /// `Some(true)` when the object named by `arg` is an indirect reference.
    fn indirection(&self, arg: &AstNode, obj: &O, flags: &mut Flags) -> Option<bool> {
        match arg.kind {
            NodeType::Key | NodeType::ConstInt => self.lookup(arg, obj, flags).map(PdfObject::is_indirect),
            _ => {
                warn!(arg = %arg, "unexpected argument to indirection predicate");
                flags.incomplete();
                None
            }
        }
    }

    fn array_sort_ascending(&self, key: &AstNode, step: &AstNode, obj: &O, flags: &mut Flags) -> Option<bool> {
        let step = step.as_i64().filter(|s| *s > 0)? as usize;
        let Some(arr) = self.lookup(key, obj, flags) else {
            return Some(false);
        };
        let len = arr.array_len()?;
        if len == 0 {
            return Some(true);
        }
        let mut last = match arr.array_get(0).and_then(PdfObject::number) {
            Some(n) => n.as_f64(),
            None => return Some(false),
        };
        for i in (step..len).step_by(step) {
            let Some(n) = arr.array_get(i).and_then(PdfObject::number) else {
                return Some(false);
            };
            if last > n.as_f64() {
                return Some(false);
            }
            last = n.as_f64();
        }
        Some(true)
    }

    fn always_unencrypted(&self, obj: &O, flags: &mut Flags) -> bool {
        if obj.object_type() != ObjectType::String {
            return false;
        }
        match self.ctx.trailer {
            Some(trailer) if !trailer.dict_has("Encrypt") => true,
            Some(_) => {
                flags.incomplete();
                false
            }
            None => {
                flags.incomplete();
                true
            }
        }
    }

    /// The dictionary named by an InKeyMap/InNameTree path argument.
    fn map_object<'o>(&'o self, path: &AstNode, obj: &'o O, flags: &mut Flags) -> Option<&'o O> {
        let parts = key_path(&path.node);
        if parts.first() == Some(&"parent") {
            flags.incomplete();
            return None;
        }
        let found = self.lookup(path, obj, flags)?;
        (found.object_type() == ObjectType::Dictionary).then_some(found)
    }

    fn is_associated_file(&self, obj: &O) -> bool {
        if obj.object_type() != ObjectType::Dictionary {
            return false;
        }
        let Some(files) = self
            .ctx
            .catalog()
            .and_then(|c| c.dict_get("Names"))
            .and_then(|n| n.dict_get("EmbeddedFiles"))
        else {
            return false;
        };
        find_in_name_tree(files, &obj.hash_id(), 0)
    }

    fn is_encrypted_wrapper(&self, flags: &mut Flags) -> bool {
        let Some(catalog) = self.ctx.catalog() else {
            flags.incomplete();
            return false;
        };
        let hidden = catalog
            .dict_get("Collection")
            .and_then(|c| c.dict_get("View"))
            .and_then(PdfObject::name)
            == Some("H");
        let has_files = catalog
            .dict_get("Names")
            .and_then(|n| n.dict_get("EmbeddedFiles"))
            .is_some_and(|e| e.object_type() == ObjectType::Dictionary);
        if !hidden || !has_files {
            return false;
        }
        let Some(af) = catalog.dict_get("AF") else {
            return false;
        };
        (0..af.array_len().unwrap_or(0)).any(|i| {
            af.array_get(i)
                .and_then(|f| f.dict_get("AFRelationship"))
                .and_then(PdfObject::name)
                == Some("EncryptedPayload")
        })
    }

    fn is_last_in_array(&self, key: &AstNode, obj: &O) -> bool {
        if key.node != "parent" {
            warn!(key = %key.node, "fn:IsLastInNumberFormatArray only supports 'parent'");
            return false;
        }
        let Some(arr) = self.ctx.container else {
            return false;
        };
        let len = arr.array_len().unwrap_or(0);
        if len == 0 || obj.object_type() != ObjectType::Dictionary {
            return false;
        }
        arr.array_get(len - 1)
            .is_some_and(|last| last.hash_id() == obj.hash_id())
    }

    /// `fn:PageProperty(@P,Key)`: a key of the page dictionary that `@P`
    /// refers to. Uses the unreduced arguments since a page is not a basic
    /// object.
    fn page_property(&self, ast: &AstNode, obj: &O, flags: &mut Flags) -> Option<AstNode> {
        let (page_ref, page_key) = (ast.left()?, ast.right()?);
        let page_path = key_path(&page_ref.node);
        let page = match self.ctx.container {
            Some(container) => self.resolve_path(container, &page_path, flags),
            None if page_path.len() == 1 && page_path[0] == self.ctx.row_key() => Some(obj),
            None => {
                flags.incomplete();
                None
            }
        }?;
        if page.object_type() != ObjectType::Dictionary {
            return None;
        }
        let value = self.resolve_path(page, &key_path(&page_key.node), flags)?;
        basic_object_to_ast(value)
    }
}

/// Moves the reduced arguments under their reduced parent, keeping the tree
/// free of right-only nodes.
fn attach(out: &mut AstNode, left: Option<AstNode>, right: Option<AstNode>) {
    if !out.node.is_empty() && out.left().is_none() {
        let (first, second) = match (left, right) {
            (None, Some(r)) => (Some(r), None),
            pair => pair,
        };
        out.arg = [first.map(Box::new), second.map(Box::new)];
    }
}

/// Splits an Arlington path on `::` and drops the `@` of the final segment.
fn key_path(text: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = text.split("::").collect();
    if let Some(last) = parts.last_mut() {
        *last = last.strip_prefix('@').unwrap_or(last);
    }
    parts
}

/// `3` and `3*` both address element 3.
fn array_index(segment: &str) -> Option<usize> {
    segment.trim_end_matches('*').parse().ok()
}

fn version_arg(arg: Option<&AstNode>, flags: &mut Flags) -> Option<PdfVersion> {
    let arg = arg?;
    match arg.node.parse::<PdfVersion>() {
        Ok(v) if arg.kind == NodeType::ConstNum => Some(v),
        _ => {
            warn!(arg = %arg, "version predicate needs a PDF version");
            flags.incomplete();
            None
        }
    }
}

fn bit_arg(arg: &AstNode) -> Option<u32> {
    match arg.as_i64() {
        Some(bit @ 1..=32) => Some(bit as u32),
        _ => {
            warn!(arg = %arg, "bit position must be an integer from 1 to 32");
            None
        }
    }
}

/// Tests the bits of `mask` in an integer object: all set, or all clear.
/// Anything but an integer is `false`.
fn bits<O: PdfObject>(obj: &O, mask: u32, set: bool) -> bool {
    let Some(value) = obj.number().and_then(PdfNumber::as_integer) else {
        return false;
    };
    let masked = (value as u32) & mask;
    if set { masked == mask } else { masked == 0 }
}

fn has_name<O: PdfObject>(obj: &O, key: &str, value: &str) -> bool {
    obj.object_type() == ObjectType::Dictionary && obj.dict_get(key).and_then(PdfObject::name) == Some(value)
}

fn has_colorants<O: PdfObject>(arr: &O, process: bool) -> bool {
    (0..arr.array_len().unwrap_or(0))
        .filter_map(|i| arr.array_get(i).and_then(PdfObject::name))
        .any(|name| {
            let is_process = PROCESS_COLORANTS.contains(&name);
            if process { is_process } else { !is_process && !name.is_empty() }
        })
}

/// Looks for `key` among the keys of a name tree leaf's `Names` array.
fn in_flat_name_tree<O: PdfObject>(tree: &O, key: &str, flags: &mut Flags) -> bool {
    let Some(names) = tree.dict_get("Names") else {
        flags.incomplete();
        return false;
    };
    (0..names.array_len().unwrap_or(0))
        .step_by(2)
        .any(|i| names.array_get(i).and_then(PdfObject::string) == Some(key))
}

/// Depth-first search for an object (by identity) among the values of a
/// name tree.
fn find_in_name_tree<O: PdfObject>(node: &O, hash: &str, depth: usize) -> bool {
    if depth > 32 {
        return false;
    }
    if let Some(names) = node.dict_get("Names") {
        let found = (1..names.array_len().unwrap_or(0)).step_by(2).any(|i| {
            names
                .array_get(i)
                .is_some_and(|v| v.object_type() == ObjectType::Dictionary && v.hash_id() == hash)
        });
        if found {
            return true;
        }
    }
    let Some(kids) = node.dict_get("Kids") else {
        return false;
    };
    (0..kids.array_len().unwrap_or(0)).any(|i| {
        kids.array_get(i)
            .is_some_and(|kid| kid.object_type() == ObjectType::Dictionary && find_in_name_tree(kid, hash, depth + 1))
    })
}

/// Follows `key` from dictionary to dictionary. `false` as soon as an
/// object is met twice.
fn no_cycle<O: PdfObject>(obj: &O, key: &str) -> bool {
    if obj.object_type() != ObjectType::Dictionary || key.is_empty() {
        return false;
    }
    let mut seen = std::collections::HashSet::new();
    seen.insert(obj.hash_id());
    let mut node = obj.dict_get(key);
    while let Some(current) = node.filter(|n| n.object_type() == ObjectType::Dictionary) {
        if !seen.insert(current.hash_id()) {
            return false;
        }
        node = current.dict_get(key);
    }
    true
}

fn rectangle<O: PdfObject>(rect: &O) -> Option<[f64; 4]> {
    if rect.array_len()? < 4 {
        return None;
    }
    let mut coords = [0.0; 4];
    for (i, c) in coords.iter_mut().enumerate() {
        *c = rect.array_get(i)?.number()?.as_f64();
    }
    Some(coords)
}

/// A basic object equal to `value`, or an array with such an element.
fn contains<O: PdfObject>(obj: &O, value: &AstNode) -> bool {
    let matches = |o: &O| basic_object_to_ast(o).is_some_and(|v| v.kind == value.kind && v.node == value.node);
    match obj.object_type() {
        ObjectType::Array => (0..obj.array_len().unwrap_or(0)).any(|i| obj.array_get(i).is_some_and(matches)),
        ObjectType::Number | ObjectType::Boolean | ObjectType::String | ObjectType::Name => matches(obj),
        _ => false,
    }
}

/// `fn:RequiredValue(condition,value)`: `false` when the condition does not
/// hold, `value` when the object has it, `None` when it does not.
fn required_value<O: PdfObject>(obj: &O, condition: Option<&AstNode>, value: &AstNode) -> Option<AstNode> {
    match condition.map(AstNode::as_bool) {
        None => return Some(value.shallow()),
        Some(Some(false)) => return Some(AstNode::boolean(false)),
        Some(Some(true)) => {}
        Some(None) => {
            warn!("fn:RequiredValue condition is not a boolean");
            return None;
        }
    }
    let equal = match (obj.object_type(), value.kind) {
        (ObjectType::Name, NodeType::Key) => obj.name() == Some(value.node.as_str()),
        (ObjectType::Number, NodeType::ConstInt | NodeType::ConstNum) => {
            match (obj.number(), value.as_f64()) {
                (Some(n), Some(v)) => (n.as_f64() - v).abs() <= NUMBER_TOLERANCE,
                _ => false,
            }
        }
        (ObjectType::Boolean, NodeType::ConstBoolean) => obj.boolean() == value.as_bool(),
        (ObjectType::String, NodeType::ConstString) => obj.string() == Some(value.node.as_str()),
        (actual, expected) => {
            warn!(%actual, %expected, "fn:RequiredValue type mismatch");
            false
        }
    };
    equal.then(|| value.shallow())
}

/// Basic objects become constants: names are keys, numbers keep their
/// integer/real form. Arrays, dictionaries, streams and null have no
/// constant form.
pub fn basic_object_to_ast<O: PdfObject>(obj: &O) -> Option<AstNode> {
    match obj.object_type() {
        ObjectType::Name => obj.name().map(AstNode::key),
        ObjectType::Number => obj.number().map(|n| match n {
            PdfNumber::Integer(i) => AstNode::integer(i),
            PdfNumber::Real(r) => AstNode::number(r),
        }),
        ObjectType::Boolean => obj.boolean().map(AstNode::boolean),
        ObjectType::String => obj.string().map(AstNode::string),
        _ => None,
    }
}

/// Numbers compare numerically. `==` and `!=` compare the text of anything
/// else, so a name matches a quoted string of the same characters.
fn compare(op: MathComp, left: &AstNode, right: &AstNode) -> Option<bool> {
    let numbers = left.as_f64().zip(right.as_f64());
    match (op, numbers) {
        (MathComp::Equal, None) => return Some(left.node == right.node),
        (MathComp::NotEqual, None) => return Some(left.node != right.node),
        _ => {}
    }
    let (l, r) = numbers?;
    Some(match op {
        MathComp::Equal => (l - r).abs() <= NUMBER_TOLERANCE,
        MathComp::NotEqual => (l - r).abs() > NUMBER_TOLERANCE,
        MathComp::GreaterEqual => l >= r,
        MathComp::LessEqual => l <= r,
        MathComp::GreaterThan => l > r,
        MathComp::LessThan => l < r,
    })
}

/// Integer result when both operands are integers, otherwise a real.
/// Decimal arithmetic keeps `0.1 + 0.2` exact; f64 is the fallback.
fn arithmetic(op: MathOp, left: &AstNode, right: &AstNode) -> Option<AstNode> {
    let (l, r) = (left.as_f64()?, right.as_f64()?);
    let integer = left.kind == NodeType::ConstInt && right.kind == NodeType::ConstInt;

    if op == MathOp::Modulo {
        let divisor = r.trunc() as i64;
        return (l.trunc() as i64).checked_rem(divisor).map(AstNode::integer);
    }

    if let Ok(ld) = left.node.parse::<Decimal>()
        && let Ok(rd) = right.node.parse::<Decimal>()
    {
        let result = match op {
            MathOp::Add => ld.checked_add(rd),
            MathOp::Subtract => ld.checked_sub(rd),
            MathOp::Multiply => ld.checked_mul(rd),
            MathOp::Modulo => None,
        };
        if let Some(rd) = result {
            if integer && let Some(i) = rd.to_i64() {
                return Some(AstNode::integer(i));
            } else if !integer && let Some(f) = rd.to_f64() {
                return Some(AstNode::number(f));
            }
        }
    }

    let value = match op {
        MathOp::Add => l + r,
        MathOp::Subtract => l - r,
        MathOp::Multiply => l * r,
        MathOp::Modulo => return None,
    };
    Some(if integer { AstNode::integer(value as i64) } else { AstNode::number(value) })
}

/// A side that reduced to nothing (a closed version gate) drops out and the
/// other side decides. A real on either side of `||` is a version picked by
/// a SinceVersion cell such as `fn:Eval(fn:Extension(X,1.6) || 2.0)`.
fn logical(op: LogicalOp, left: Option<&AstNode>, right: Option<&AstNode>) -> Option<AstNode> {
    match (left, right) {
        (None, None) => Some(AstNode::boolean(true)),
        (Some(l), None) => Some(l.shallow()),
        (None, Some(r)) if r.kind == NodeType::ConstBoolean => Some(r.shallow()),
        (None, Some(r)) => Some(AstNode::leaf(NodeType::ConstNum, r.node.clone())),
        (Some(l), Some(r)) if l.kind == NodeType::ConstNum || r.kind == NodeType::ConstNum => {
            let pick = if l.kind == NodeType::ConstNum { l } else { r };
            Some(AstNode::leaf(NodeType::ConstNum, pick.node.clone()))
        }
        (Some(l), Some(r)) => {
            let (a, b) = (l.as_bool()?, r.as_bool()?);
            Some(AstNode::boolean(match op {
                LogicalOp::And => a && b,
                LogicalOp::Or => a || b,
            }))
        }
    }
}
