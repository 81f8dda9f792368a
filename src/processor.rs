//! Per-column drivers for grammar rows.
//!
//! Each column of an Arlington row has a syntax check, used when validating
//! the grammar itself, and most have a reducer that answers the column's
//! question ("is this key required here?") for one object in one document.
//! Reducers parse the cell, hand predicates to the [`Evaluator`] and fold the
//! result into a plain answer.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::{
    ast::{AstNode, NodeType, Predicate},
    evaluator::{EvalContext, Evaluator, NUMBER_TOLERANCE},
    grammar::{
        Column, Pattern, TsvRow, VERSION_PATTERN, is_type, pattern, remove_type_link_predicates, split_field,
        strip_brackets,
    },
    object::{ObjectType, PdfObject},
    parser::{parse_row_field, parse_value_list},
    version::PdfVersion,
};

static KEY: Pattern = LazyLock::new(|| Regex::new(r"^(?:[0-9]+\*|[a-zA-Z0-9\-\._:\*]+|[0-9]+|\*)$"));

static VERSIONED_TYPE: Pattern = LazyLock::new(|| {
    Regex::new(&format!(
        r"^fn:(SinceVersion|Deprecated|BeforeVersion|IsPDFVersion)\({},([a-z\-]+)\)$",
        VERSION_PATTERN
    ))
});

static EXTENSION_TYPE: Pattern = LazyLock::new(|| Regex::new(r"^fn:Extension\(([a-zA-Z0-9_]+),([a-z\-]+)\)$"));

static LINK_SINCE_EXTENSION: Pattern = LazyLock::new(|| {
    Regex::new(&format!(
        r"^fn:(?:SinceVersion|IsPDFVersion)\({},fn:Extension\(([A-Za-z0-9_\-]+),([A-Za-z0-9_\-]+)\)\)",
        VERSION_PATTERN
    ))
});

static LINK_VERSIONED: Pattern = LazyLock::new(|| {
    Regex::new(&format!(
        r"^fn:(?:SinceVersion|BeforeVersion|IsPDFVersion|Deprecated)\({},([A-Za-z0-9_\-]+)\)",
        VERSION_PATTERN
    ))
});

static LINK_EXTENSION: Pattern = LazyLock::new(|| Regex::new(r"^fn:Extension\(([A-Za-z0-9_\-]+),([A-Za-z0-9_\-]+)\)"));

/// How the IndirectReference column constrains an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceType {
    MustBeDirect,
    MustBeIndirect,
    DontCare,
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceType::MustBeDirect => write!(f, "must be direct"),
            ReferenceType::MustBeIndirect => write!(f, "must be indirect"),
            ReferenceType::DontCare => write!(f, "direct or indirect"),
        }
    }
}

/// Columns of one row that failed their syntax check.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowReport {
    pub key: String,
    pub failures: Vec<Column>,
}

impl RowReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for RowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "{}: ok", self.key);
        }
        let columns: Vec<&str> = self.failures.iter().map(Column::as_str).collect();
        write!(f, "{}: invalid {}", self.key, columns.join(", "))
    }
}

type Check<'a> = fn(&PredicateProcessor<'a>, usize) -> bool;

/// Validates and reduces the cells of a grammar file's rows.
#[derive(Debug, Clone)]
pub struct PredicateProcessor<'a> {
    rows: &'a [TsvRow],
    explicit_values_only: bool,
}

impl<'a> PredicateProcessor<'a> {
    pub fn new(rows: &'a [TsvRow]) -> Self {
        PredicateProcessor {
            rows,
            explicit_values_only: false,
        }
    }

    /// Ignore the trailing `*` wildcard of PossibleValues lists, so only
    /// the values spelled out in the grammar are accepted.
    pub fn with_explicit_values_only(mut self, enabled: bool) -> Self {
        self.explicit_values_only = enabled;
        self
    }

    pub fn rows(&self) -> &'a [TsvRow] {
        self.rows
    }

    fn cell(&self, key_idx: usize, column: Column) -> Option<&'a str> {
        self.rows.get(key_idx).map(|r| r.get(column))
    }

    /// Runs every column check on one row. Failures are logged and
    /// collected; checking carries on with the next column.
    pub fn validate_row_syntax(&self, key_idx: usize) -> RowReport {
        let checks: [(Column, Check<'a>); 11] = [
            (Column::Key, Self::validate_key_syntax),
            (Column::Type, Self::validate_type_syntax),
            (Column::SinceVersion, Self::validate_since_version_syntax),
            (Column::DeprecatedIn, Self::validate_deprecated_in_syntax),
            (Column::Required, Self::validate_required_syntax),
            (Column::IndirectReference, Self::validate_indirect_ref_syntax),
            (Column::Inheritable, Self::validate_inheritable_syntax),
            (Column::DefaultValue, Self::validate_default_value_syntax),
            (Column::PossibleValues, Self::validate_possible_values_syntax),
            (Column::SpecialCase, Self::validate_special_case_syntax),
            (Column::Link, Self::validate_links_syntax),
        ];

        let key = self.cell(key_idx, Column::Key).unwrap_or("").to_string();
        let mut report = RowReport {
            key: key.clone(),
            failures: Vec::new(),
        };
        for (column, check) in checks {
            if !check(self, key_idx) {
                warn!(
                    key = %key,
                    column = %column,
                    cell = self.cell(key_idx, column).unwrap_or(""),
                    "invalid grammar cell"
                );
                report.failures.push(column);
            }
        }
        report
    }

    pub fn validate_key_syntax(&self, key_idx: usize) -> bool {
        let Some(key) = self.cell(key_idx, Column::Key) else {
            return false;
        };
        !key.contains("fn:") && pattern(&KEY).is_some_and(|re| re.is_match(key))
    }

    pub fn validate_type_syntax(&self, key_idx: usize) -> bool {
        let Some(field) = self.cell(key_idx, Column::Type) else {
            return false;
        };
        if field.is_empty() {
            return false;
        }
        split_field(field, ';').into_iter().all(|t| {
            if !t.contains("fn:") {
                return is_type(t);
            }
            if let Some(caps) = pattern(&VERSIONED_TYPE).and_then(|re| re.captures(t)) {
                let gate_from_1_0 = matches!(&caps[1], "SinceVersion" | "BeforeVersion") && &caps[2] == "1.0";
                return !gate_from_1_0 && PdfVersion::is_valid(&caps[2]) && is_type(&caps[3]);
            }
            pattern(&EXTENSION_TYPE)
                .and_then(|re| re.captures(t))
                .is_some_and(|caps| is_type(&caps[2]))
        })
    }

    /// The bare type of one Type alternative (`fn:SinceVersion(1.5,name)`
    /// gives `name`), or `""` if it is not a valid alternative.
    pub fn reduce_type_element(element: &str) -> &str {
        if !element.contains("fn:") {
            return if is_type(element) { element } else { "" };
        }
        if let Some(caps) = pattern(&VERSIONED_TYPE).and_then(|re| re.captures(element))
            && let Some(m) = caps.get(3)
            && is_type(m.as_str())
        {
            return m.as_str();
        }
        if let Some(caps) = pattern(&EXTENSION_TYPE).and_then(|re| re.captures(element))
            && let Some(m) = caps.get(2)
            && is_type(m.as_str())
        {
            return m.as_str();
        }
        ""
    }

    pub fn validate_since_version_syntax(&self, key_idx: usize) -> bool {
        match self.cell(key_idx, Column::SinceVersion) {
            Some(field) if field.len() == 3 => PdfVersion::is_valid(field),
            Some(field) if field.contains("fn:") => parses(field),
            _ => false,
        }
    }

    /// Whether the row applies to the document's PDF version: a plain
    /// version is compared, a predicate is reduced to a version or boolean.
    pub fn is_valid_for_pdf_version<O: PdfObject>(&self, ctx: &EvalContext<'_, O>, obj: &O, key_idx: usize) -> bool {
        let Some(field) = self.cell(key_idx, Column::SinceVersion) else {
            return false;
        };
        if field.len() == 3 {
            return field.parse::<PdfVersion>().is_ok_and(|since| since <= ctx.version);
        }
        let Some(ast) = parse_logged(field) else {
            return false;
        };
        let reduction = self.evaluator(ctx, key_idx, 0, false).evaluate(&ast, obj);
        match reduction.value {
            Some(v) if v.kind == NodeType::ConstNum => v.node.parse::<PdfVersion>().is_ok_and(|since| ctx.version >= since),
            Some(v) => v.as_bool().unwrap_or(false),
            None => false,
        }
    }

    pub fn validate_deprecated_in_syntax(&self, key_idx: usize) -> bool {
        match self.cell(key_idx, Column::DeprecatedIn) {
            Some("") => true,
            Some(field) => PdfVersion::is_valid(field),
            None => false,
        }
    }

    /// `true` when `version` is at or after the row's DeprecatedIn version.
    pub fn is_deprecated(&self, version: PdfVersion, key_idx: usize) -> bool {
        self.cell(key_idx, Column::DeprecatedIn)
            .and_then(|field| field.parse::<PdfVersion>().ok())
            .is_some_and(|deprecated_in| version >= deprecated_in)
    }

    pub fn validate_required_syntax(&self, key_idx: usize) -> bool {
        let (Some(field), Some(key)) = (self.cell(key_idx, Column::Required), self.cell(key_idx, Column::Key)) else {
            return false;
        };
        match field {
            "TRUE" => key != "*",
            "FALSE" => true,
            _ => field.starts_with("fn:IsRequired(") && field.ends_with(')') && parses(field),
        }
    }

    pub fn is_required<O: PdfObject>(&self, ctx: &EvalContext<'_, O>, obj: &O, key_idx: usize, type_idx: usize) -> bool {
        if !self.is_valid_for_pdf_version(ctx, obj, key_idx) {
            return false;
        }
        match self.cell(key_idx, Column::Required) {
            Some("TRUE") => true,
            Some("FALSE") | None => false,
            Some(field) => parse_logged(field)
                .and_then(|ast| {
                    self.evaluator(ctx, key_idx, type_idx, false)
                        .evaluate(&ast, obj)
                        .as_bool()
                })
                .unwrap_or(false),
        }
    }

    pub fn validate_indirect_ref_syntax(&self, key_idx: usize) -> bool {
        let Some(field) = self.cell(key_idx, Column::IndirectReference) else {
            return false;
        };
        if matches!(field, "TRUE" | "FALSE" | "fn:MustBeDirect()") {
            return true;
        }
        if field.contains(';') {
            return split_field(field, ';')
                .into_iter()
                .all(|ir| ir == "[TRUE]" || ir == "[FALSE]");
        }
        parse_row_field(field).is_ok_and(|ast| {
            matches!(
                ast.predicate(),
                Some(Predicate::MustBeDirect | Predicate::MustBeIndirect)
            )
        })
    }

    pub fn reduce_indirect_ref_row<O: PdfObject>(
        &self,
        ctx: &EvalContext<'_, O>,
        obj: &O,
        key_idx: usize,
        type_idx: usize,
    ) -> ReferenceType {
        let field = match self.cell(key_idx, Column::IndirectReference) {
            Some(field) => field,
            None => return ReferenceType::DontCare,
        };
        match field {
            "TRUE" => return ReferenceType::MustBeIndirect,
            "FALSE" | "" => return ReferenceType::DontCare,
            "fn:MustBeDirect()" => return ReferenceType::MustBeDirect,
            _ => {}
        }

        let alternatives = split_field(field, ';');
        let Some(element) = alternatives.get(type_idx).map(|e| strip_brackets(e)) else {
            return ReferenceType::DontCare;
        };
        match element {
            "TRUE" => return ReferenceType::MustBeIndirect,
            "FALSE" => return ReferenceType::DontCare,
            _ => {}
        }

        let Some(ast) = parse_value_list(element).ok().and_then(|v| v.into_iter().next()) else {
            warn!(cell = field, "IndirectReference does not parse");
            return ReferenceType::DontCare;
        };
        let direction = match ast.predicate() {
            Some(Predicate::MustBeDirect) => ReferenceType::MustBeDirect,
            Some(Predicate::MustBeIndirect) => ReferenceType::MustBeIndirect,
            _ => return ReferenceType::DontCare,
        };
        if ast.left().is_none() {
            return direction;
        }
        let reduction = self.evaluator(ctx, key_idx, type_idx, false).evaluate(&ast, obj);
        match reduction.as_bool() {
            Some(true) => direction,
            _ => ReferenceType::DontCare,
        }
    }

    pub fn validate_inheritable_syntax(&self, key_idx: usize) -> bool {
        matches!(self.cell(key_idx, Column::Inheritable), Some("TRUE" | "FALSE"))
    }

    pub fn is_inheritable(&self, key_idx: usize) -> bool {
        self.cell(key_idx, Column::Inheritable) == Some("TRUE")
    }

    /// Parses every alternative of a DefaultValue cell. PDF array literals
    /// such as `[0 0 1 1]` have no AST and give an empty list.
    fn default_values(&self, key_idx: usize) -> Option<Vec<Vec<AstNode>>> {
        let field = self.cell(key_idx, Column::DefaultValue)?;
        if field.is_empty() {
            return Some(Vec::new());
        }
        let multiple = field.contains(';');
        let mut parsed = Vec::new();
        for dv in split_field(field, ';') {
            let dv = if multiple { strip_brackets(dv) } else { dv };
            if dv.starts_with('[') {
                parsed.push(Vec::new());
                continue;
            }
            match parse_value_list(dv) {
                Ok(values) => parsed.push(values),
                Err(e) => {
                    debug!(cell = field, error = %e, "DefaultValue does not parse");
                    return None;
                }
            }
        }
        Some(parsed)
    }

    pub fn validate_default_value_syntax(&self, key_idx: usize) -> bool {
        self.default_values(key_idx).is_some()
    }

    /// The (unreduced) default value of the `type_idx` alternative.
    pub fn get_default_value(&self, key_idx: usize, type_idx: usize) -> Option<AstNode> {
        self.default_values(key_idx)?
            .into_iter()
            .nth(type_idx)
            .and_then(|values| values.into_iter().next())
    }

    pub fn validate_possible_values_syntax(&self, key_idx: usize) -> bool {
        let (Some(field), Some(types)) = (self.cell(key_idx, Column::PossibleValues), self.cell(key_idx, Column::Type))
        else {
            return false;
        };
        if field.is_empty() {
            return true;
        }
        let pv_list = split_field(field, ';');
        for pv in &pv_list {
            if !(pv.starts_with('[') && pv.ends_with(']')) {
                return false;
            }
            if pv.contains("fn:") && parse_value_list(strip_brackets(pv)).is_err() {
                return false;
            }
        }

        let types = remove_type_link_predicates(types);
        let type_list = split_field(&types, ';');
        if type_list.len() != pv_list.len() {
            return false;
        }
        type_list.iter().zip(&pv_list).all(|(typ, pv)| match *typ {
            "name" | "integer" | "number" | "bitmask" | "array" => true,
            t if t.contains("string") => true,
            "boolean" | "date" | "dictionary" | "matrix" | "null" | "rectangle" | "stream" => {
                pv.is_empty() || *pv == "[]"
            }
            _ => false,
        })
    }

    /// Checks an object against a `,` separated list of explicit values.
    ///
    /// Names match exactly or through `*`, strings match their quoted form,
    /// numbers match within a small tolerance, and the Decode arrays
    /// `[0 1]` and `[1 0]` are recognised. A null object always matches.
    pub fn is_valid_value<O: PdfObject>(&self, obj: &O, pvalues: &str) -> bool {
        let values: Vec<&str> = pvalues.split(',').collect();
        match obj.object_type() {
            ObjectType::Null => true,
            ObjectType::Name => {
                let name = obj.name().unwrap_or("");
                values.iter().any(|v| *v == name || *v == "*")
            }
            ObjectType::String => {
                let quoted = format!("'{}'", obj.string().unwrap_or(""));
                values.contains(&quoted.as_str())
            }
            ObjectType::Number => {
                let Some(n) = obj.number().map(|n| n.as_f64()) else {
                    return false;
                };
                values
                    .iter()
                    .filter_map(|v| v.trim().parse::<f64>().ok())
                    .any(|v| (n - v).abs() <= NUMBER_TOLERANCE)
            }
            ObjectType::Array => {
                if obj.array_len() != Some(2) {
                    return false;
                }
                let pair = (
                    obj.array_get(0).and_then(PdfObject::number).map(|n| n.as_f64()),
                    obj.array_get(1).and_then(PdfObject::number).map(|n| n.as_f64()),
                );
                values.iter().any(|v| match (*v, pair) {
                    ("[0 1]", (Some(a), Some(b))) => a == 0.0 && b == 1.0,
                    ("[1 0]", (Some(a), Some(b))) => a == 1.0 && b == 0.0,
                    _ => false,
                })
            }
            other => {
                debug!(object = %other, "no possible values for this object type");
                false
            }
        }
    }

    pub fn reduce_possible_values_row<O: PdfObject>(
        &self,
        ctx: &EvalContext<'_, O>,
        obj: &O,
        key_idx: usize,
        type_idx: usize,
    ) -> bool {
        let Some(field) = self.cell(key_idx, Column::PossibleValues) else {
            return true;
        };
        if field.is_empty() || field == "[]" {
            return true;
        }
        let field = if self.explicit_values_only {
            field.replacen(",*]", "]", 1)
        } else {
            field.to_string()
        };

        let pv_list = split_field(&field, ';');
        let Some(pv) = pv_list.get(type_idx).copied() else {
            warn!(cell = %field, type_idx, "no PossibleValues alternative for type");
            return false;
        };
        if pv == "[]" {
            return true;
        }
        let inner = strip_brackets(pv);
        if !pv.contains("fn:") {
            return self.is_valid_value(obj, inner);
        }
        let values = match parse_value_list(inner) {
            Ok(values) if !values.is_empty() => values,
            Ok(_) => return self.is_valid_value(obj, inner),
            Err(e) => {
                warn!(cell = %field, error = %e, "PossibleValues does not parse");
                return false;
            }
        };

        let evaluator = self.evaluator(ctx, key_idx, type_idx, false);
        for value in &values {
            match value.kind {
                NodeType::ConstBoolean | NodeType::ConstString | NodeType::ConstInt | NodeType::ConstNum | NodeType::Key => {
                    if self.is_valid_value(obj, &constant_text(value)) {
                        return true;
                    }
                }
                NodeType::Predicate(_) => {
                    let Some(out) = evaluator.evaluate(value, obj).value else {
                        continue;
                    };
                    let mut valid = out.node == "true";
                    if out.kind != NodeType::ConstBoolean && obj.object_type() != ObjectType::Boolean {
                        valid = self.is_valid_value(obj, &constant_text(&out));
                    }
                    match out.kind {
                        NodeType::ConstBoolean => return valid,
                        _ if valid => return true,
                        _ => {}
                    }
                }
                _ => {
                    warn!(value = %value, "unexpected PossibleValues entry");
                    return false;
                }
            }
        }
        false
    }

    pub fn validate_special_case_syntax(&self, key_idx: usize) -> bool {
        let Some(field) = self.cell(key_idx, Column::SpecialCase) else {
            return false;
        };
        if field.is_empty() {
            return true;
        }
        split_field(field, ';').into_iter().all(|sc| {
            let inner = strip_brackets(sc);
            inner.is_empty() || parse_value_list(inner).is_ok()
        })
    }

    /// Reduces the SpecialCase alternative for `type_idx`. A predicate that
    /// reduces to nothing does not apply, which is accepted.
    pub fn reduce_special_case_row<O: PdfObject>(
        &self,
        ctx: &EvalContext<'_, O>,
        obj: &O,
        key_idx: usize,
        type_idx: usize,
    ) -> bool {
        let Some(field) = self.cell(key_idx, Column::SpecialCase) else {
            return true;
        };
        if field.is_empty() {
            return true;
        }
        let sc_list = split_field(field, ';');
        if sc_list.len() > 1 && type_idx > 0 && type_idx < sc_list.len() {
            if sc_list[type_idx] == "[]" {
                return true;
            }
        } else if sc_list[0] == "[]" {
            return true;
        }

        let Some(sc) = sc_list.get(type_idx) else {
            return true;
        };
        if !sc.contains("fn:") {
            return true;
        }
        let first = match parse_value_list(strip_brackets(sc)) {
            Ok(values) => values.into_iter().next(),
            Err(e) => {
                warn!(cell = field, error = %e, "SpecialCase does not parse");
                return false;
            }
        };
        let Some(first) = first else {
            return true;
        };
        if first.predicate().is_none() {
            warn!(value = %first, "SpecialCase is not a predicate");
            return first.as_bool().unwrap_or(true);
        }
        self.evaluator(ctx, key_idx, type_idx, true)
            .evaluate(&first, obj)
            .as_bool()
            .unwrap_or(true)
    }

    pub fn validate_links_syntax(&self, key_idx: usize) -> bool {
        let Some(field) = self.cell(key_idx, Column::Link) else {
            return false;
        };
        if field.is_empty() {
            return true;
        }
        split_field(field, ';')
            .into_iter()
            .all(|alternative| {
                alternative == "[]" || link_names(strip_brackets(alternative)).is_some_and(|links| !links.is_empty())
            })
    }

    fn evaluator<'c, O: PdfObject>(
        &self,
        ctx: &EvalContext<'c, O>,
        key_idx: usize,
        type_idx: usize,
        use_default_values: bool,
    ) -> Evaluator<'c, O>
    where
        'a: 'c,
    {
        Evaluator::new(
            ctx.clone()
                .with_rows(self.rows, key_idx)
                .with_type_index(type_idx)
                .with_default_values(use_default_values),
        )
    }
}

/// The link names of one Link alternative, or `None` if a part of it is
/// malformed.
fn link_names(alternative: &str) -> Option<Vec<&str>> {
    let mut links = Vec::new();
    let mut rest = alternative;
    while !rest.is_empty() {
        if rest.starts_with("fn:") {
            let (name, end) = [
                (&LINK_SINCE_EXTENSION, 3),
                (&LINK_VERSIONED, 2),
                (&LINK_EXTENSION, 2),
            ]
            .into_iter()
            .find_map(|(re, group)| {
                let caps = pattern(re)?.captures(rest)?;
                Some((caps.get(group)?.as_str(), caps.get(0)?.end()))
            })?;
            links.push(name);
            rest = &rest[end..];
            rest = rest.strip_prefix(',').unwrap_or(rest);
        } else {
            let (link, tail) = rest.split_once(',').unwrap_or((rest, ""));
            if link.is_empty() {
                return None;
            }
            links.push(link);
            rest = tail;
        }
    }
    Some(links)
}

/// How a constant is written in a PossibleValues list.
fn constant_text(node: &AstNode) -> String {
    match node.kind {
        NodeType::ConstString => format!("'{}'", node.node),
        _ => node.node.clone(),
    }
}

fn parses(text: &str) -> bool {
    parse_row_field(text).is_ok()
}

fn parse_logged(text: &str) -> Option<AstNode> {
    match parse_row_field(text) {
        Ok(ast) => Some(ast),
        Err(e) => {
            warn!(cell = text, error = %e, "grammar cell does not parse");
            None
        }
    }
}
