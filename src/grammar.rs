//! Arlington TSV grammar rows.
//!
//! Each grammar file describes one PDF object. Every row describes one key
//! (or array index) of that object in twelve tab-separated columns. Columns
//! that vary by type hold one `;`-separated alternative per entry of the
//! `Type` column, and alternatives may be bracketed value lists.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// The twelve columns of an Arlington TSV row, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Key,
    Type,
    SinceVersion,
    DeprecatedIn,
    Required,
    IndirectReference,
    Inheritable,
    DefaultValue,
    PossibleValues,
    SpecialCase,
    Link,
    Note,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::Key,
        Column::Type,
        Column::SinceVersion,
        Column::DeprecatedIn,
        Column::Required,
        Column::IndirectReference,
        Column::Inheritable,
        Column::DefaultValue,
        Column::PossibleValues,
        Column::SpecialCase,
        Column::Link,
        Column::Note,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Key => "Key",
            Column::Type => "Type",
            Column::SinceVersion => "SinceVersion",
            Column::DeprecatedIn => "DeprecatedIn",
            Column::Required => "Required",
            Column::IndirectReference => "IndirectReference",
            Column::Inheritable => "Inheritable",
            Column::DefaultValue => "DefaultValue",
            Column::PossibleValues => "PossibleValues",
            Column::SpecialCase => "SpecialCase",
            Column::Link => "Link",
            Column::Note => "Note",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every predefined Arlington type, alphabetical.
pub const ALL_TYPES: [&str; 18] = [
    "array",
    "bitmask",
    "boolean",
    "date",
    "dictionary",
    "integer",
    "matrix",
    "name",
    "name-tree",
    "null",
    "number",
    "number-tree",
    "rectangle",
    "stream",
    "string",
    "string-ascii",
    "string-byte",
    "string-text",
];

/// Types that must carry a Link.
pub const COMPLEX_TYPES: [&str; 5] = ["array", "dictionary", "name-tree", "number-tree", "stream"];

/// Types that must not carry a Link.
pub const NON_COMPLEX_TYPES: [&str; 13] = [
    "bitmask",
    "boolean",
    "date",
    "integer",
    "matrix",
    "name",
    "null",
    "number",
    "rectangle",
    "string",
    "string-ascii",
    "string-byte",
    "string-text",
];

pub fn is_type(word: &str) -> bool {
    ALL_TYPES.contains(&word)
}

pub fn is_complex_type(word: &str) -> bool {
    COMPLEX_TYPES.contains(&word)
}

/// One row of a grammar file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TsvRow {
    cells: [String; 12],
}

impl TsvRow {
    /// A row with the given key and type and every other cell empty.
    pub fn new(key: impl Into<String>, types: impl Into<String>) -> Self {
        let mut row = TsvRow::default();
        row.cells[Column::Key.index()] = key.into();
        row.cells[Column::Type.index()] = types.into();
        row
    }

    /// Builder: replaces one cell.
    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.cells[column.index()] = value.into();
        self
    }

    pub fn from_cells(cells: &[&str]) -> Result<Self, GrammarError> {
        if cells.len() != 12 {
            return Err(GrammarError::ColumnCount {
                line: 0,
                found: cells.len(),
            });
        }
        let mut row = TsvRow::default();
        for (slot, cell) in row.cells.iter_mut().zip(cells) {
            *slot = cell.to_string();
        }
        Ok(row)
    }

    pub fn get(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }

    pub fn key(&self) -> &str {
        self.get(Column::Key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// The file had no header row
    Empty,
    /// A row (1-based line number) that does not have twelve cells
    ColumnCount { line: usize, found: usize },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::Empty => write!(f, "Grammar file is empty"),
            GrammarError::ColumnCount { line, found } => {
                write!(f, "Line {}: expected 12 tab-separated cells, found {}", line, found)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// A loaded grammar file: its name and data rows (the header is dropped).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TsvGrammar {
    pub name: String,
    pub rows: Vec<TsvRow>,
}

impl TsvGrammar {
    pub fn new(name: impl Into<String>, rows: Vec<TsvRow>) -> Self {
        TsvGrammar {
            name: name.into(),
            rows,
        }
    }

    pub fn from_tsv(name: impl Into<String>, text: &str) -> Result<Self, GrammarError> {
        let mut lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .enumerate()
            .filter(|(_, l)| !l.is_empty());

        let (_, header) = lines.next().ok_or(GrammarError::Empty)?;
        let header_cells = header.split('\t').count();
        if header_cells != 12 {
            return Err(GrammarError::ColumnCount {
                line: 1,
                found: header_cells,
            });
        }

        let mut rows = Vec::new();
        for (idx, line) in lines {
            let cells: Vec<&str> = line.split('\t').collect();
            let row = TsvRow::from_cells(&cells).map_err(|_| GrammarError::ColumnCount {
                line: idx + 1,
                found: cells.len(),
            })?;
            rows.push(row);
        }
        Ok(TsvGrammar::new(name, rows))
    }

    /// Index of the row whose key is `key`.
    pub fn find(&self, key: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.key() == key)
    }
}

/// Splits a cell on `separator`, ignoring separators nested inside the
/// brackets of a `fn:` call.
pub fn split_field(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Strips one pair of surrounding `[` `]`, if present.
pub fn strip_brackets(text: &str) -> &str {
    text.strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(text)
}

pub(crate) const VERSION_PATTERN: &str = r"(1\.[0-7]|2\.0)";

pub(crate) type Pattern = LazyLock<Result<Regex, regex::Error>>;

pub(crate) fn pattern(re: &Pattern) -> Option<&Regex> {
    re.as_ref().ok()
}

static SINCE_VERSION_EXTENSION: Pattern = LazyLock::new(|| {
    Regex::new(&format!(
        r"fn:SinceVersion\({},fn:Extension\(([A-Za-z0-9_\-]+),([A-Za-z0-9_\-]+)\)\)",
        VERSION_PATTERN
    ))
});
static IS_PDF_VERSION_EXTENSION: Pattern = LazyLock::new(|| {
    Regex::new(&format!(
        r"fn:IsPDFVersion\({},fn:Extension\(([A-Za-z0-9_\-]+),([A-Za-z0-9_\-]+)\)\)",
        VERSION_PATTERN
    ))
});
static VERSIONED: Pattern = LazyLock::new(|| {
    Regex::new(&format!(
        r"fn:(?:SinceVersion|BeforeVersion|IsPDFVersion|Deprecated)\({},([A-Za-z0-9_\-]+)\)",
        VERSION_PATTERN
    ))
});
static EXTENSION: Pattern = LazyLock::new(|| Regex::new(r"fn:Extension\(([A-Za-z0-9_\-]+),([A-Za-z0-9_\-]+)\)"));

/// Removes the version and extension predicates wrapped around the type
/// names or link names of a `Type` or `Link` cell, keeping the names and
/// their separators.
///
/// `fn:SinceVersion(1.5,fn:Extension(ADBE,name))` becomes `name`.
pub fn remove_type_link_predicates(text: &str) -> String {
    let mut out = text.to_string();
    for (re, group) in [
        (&SINCE_VERSION_EXTENSION, "$3"),
        (&IS_PDF_VERSION_EXTENSION, "$3"),
        (&VERSIONED, "$2"),
        (&EXTENSION, "$2"),
    ] {
        if let Some(re) = pattern(re) {
            out = re.replace_all(&out, group).into_owned();
        }
    }
    out
}
