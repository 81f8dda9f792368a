use std::fmt;

/// The eight basic PDF object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Null,
    Boolean,
    Number,
    String,
    Name,
    Array,
    Dictionary,
    Stream,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Null => "null",
            ObjectType::Boolean => "boolean",
            ObjectType::Number => "number",
            ObjectType::String => "string",
            ObjectType::Name => "name",
            ObjectType::Array => "array",
            ObjectType::Dictionary => "dictionary",
            ObjectType::Stream => "stream",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A PDF number keeps track of whether it was written as an integer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PdfNumber {
    Integer(i64),
    Real(f64),
}

impl PdfNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            PdfNumber::Integer(n) => n as f64,
            PdfNumber::Real(n) => n,
        }
    }

    pub fn as_integer(self) -> Option<i64> {
        match self {
            PdfNumber::Integer(n) => Some(n),
            PdfNumber::Real(_) => None,
        }
    }
}

/// Read-only view of an object in a PDF document.
///
/// This is the whole surface the predicate engine needs from a PDF library.
/// Accessors that do not apply to the object's kind return `None` (or an
/// empty list). Implementations resolve indirect references transparently:
/// `is_indirect` reports whether the object was reached through one.
pub trait PdfObject {
    fn object_type(&self) -> ObjectType;

    fn boolean(&self) -> Option<bool>;

    fn number(&self) -> Option<PdfNumber>;

    /// Text of a string object.
    fn string(&self) -> Option<&str>;

    /// Name without the leading `/`.
    fn name(&self) -> Option<&str>;

    fn array_len(&self) -> Option<usize>;

    fn array_get(&self, index: usize) -> Option<&Self>;

    /// Dictionary entry. Streams answer through their dictionary.
    fn dict_get(&self, key: &str) -> Option<&Self>;

    /// Dictionary keys in document order.
    fn dict_keys(&self) -> Vec<&str>;

    fn stream_dict(&self) -> Option<&Self>;

    fn is_indirect(&self) -> bool;

    /// Identity that is equal for two views of the same object.
    fn hash_id(&self) -> String;

    /// `Some(true)` for a string written in hex form, `None` if unknown.
    fn is_hex_string(&self) -> Option<bool>;

    fn dict_has(&self, key: &str) -> bool {
        self.dict_get(key).is_some()
    }

    fn is_integer(&self) -> bool {
        matches!(self.number(), Some(PdfNumber::Integer(_)))
    }
}

/// An in-memory PDF object graph.
///
/// Dictionaries keep their keys in insertion order so that wildcard lookups
/// are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Number(PdfNumber),
    String { value: String, hex: bool },
    Name(String),
    Array(Vec<Object>),
    Dictionary(Vec<(String, Object)>),
    Stream(Box<Object>),
    /// An object reached through `id 0 R`
    Indirect { id: u32, object: Box<Object> },
}

impl Object {
    pub fn integer(n: i64) -> Self {
        Object::Number(PdfNumber::Integer(n))
    }

    pub fn real(n: f64) -> Self {
        Object::Number(PdfNumber::Real(n))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Object::String {
            value: value.into(),
            hex: false,
        }
    }

    pub fn hex_string(value: impl Into<String>) -> Self {
        Object::String {
            value: value.into(),
            hex: true,
        }
    }

    pub fn name(value: impl Into<String>) -> Self {
        Object::Name(value.into())
    }

    pub fn array(items: impl IntoIterator<Item = Object>) -> Self {
        Object::Array(items.into_iter().collect())
    }

    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Object)>) -> Self {
        Object::Dictionary(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A stream whose dictionary is `dict` (wrapped into a dictionary if it
    /// is not one already).
    pub fn stream(dict: Object) -> Self {
        match dict {
            Object::Dictionary(_) => Object::Stream(Box::new(dict)),
            _ => Object::Stream(Box::new(Object::Dictionary(Vec::new()))),
        }
    }

    pub fn indirect(id: u32, object: Object) -> Self {
        Object::Indirect {
            id,
            object: Box::new(object),
        }
    }

    /// The direct object behind any number of indirect wrappers.
    pub fn resolved(&self) -> &Object {
        match self {
            Object::Indirect { object, .. } => object.resolved(),
            other => other,
        }
    }
}

impl PdfObject for Object {
    fn object_type(&self) -> ObjectType {
        match self.resolved() {
            Object::Null | Object::Indirect { .. } => ObjectType::Null,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::Number(_) => ObjectType::Number,
            Object::String { .. } => ObjectType::String,
            Object::Name(_) => ObjectType::Name,
            Object::Array(_) => ObjectType::Array,
            Object::Dictionary(_) => ObjectType::Dictionary,
            Object::Stream(_) => ObjectType::Stream,
        }
    }

    fn boolean(&self) -> Option<bool> {
        match self.resolved() {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn number(&self) -> Option<PdfNumber> {
        match self.resolved() {
            Object::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn string(&self) -> Option<&str> {
        match self.resolved() {
            Object::String { value, .. } => Some(value),
            _ => None,
        }
    }

    fn name(&self) -> Option<&str> {
        match self.resolved() {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    fn array_len(&self) -> Option<usize> {
        match self.resolved() {
            Object::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    fn array_get(&self, index: usize) -> Option<&Self> {
        match self.resolved() {
            Object::Array(items) => items.get(index),
            _ => None,
        }
    }

    fn dict_get(&self, key: &str) -> Option<&Self> {
        match self.resolved() {
            Object::Dictionary(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Object::Stream(dict) => dict.dict_get(key),
            _ => None,
        }
    }

    fn dict_keys(&self) -> Vec<&str> {
        match self.resolved() {
            Object::Dictionary(entries) => entries.iter().map(|(k, _)| k.as_str()).collect(),
            Object::Stream(dict) => dict.dict_keys(),
            _ => Vec::new(),
        }
    }

    fn stream_dict(&self) -> Option<&Self> {
        match self.resolved() {
            Object::Stream(dict) => Some(dict),
            _ => None,
        }
    }

    fn is_indirect(&self) -> bool {
        matches!(self, Object::Indirect { .. })
    }

    fn hash_id(&self) -> String {
        match self {
            Object::Indirect { id, .. } => format!("{} 0 R", id),
            direct => format!("{:p}", direct),
        }
    }

    fn is_hex_string(&self) -> Option<bool> {
        match self.resolved() {
            Object::String { hex, .. } => Some(*hex),
            _ => None,
        }
    }
}
