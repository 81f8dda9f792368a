use std::fmt;

/// The closed vocabulary of Arlington predicate functions.
///
/// The lexer maps a `fn:Name(` head onto one of these variants as soon as it
/// is recognised, so the evaluator never compares function names as strings.
/// A name outside this set is a grammar-authoring error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    AlwaysUnencrypted,
    ArrayLength,
    ArraySortAscending,
    BeforeVersion,
    BitClear,
    BitSet,
    BitsClear,
    BitsSet,
    Contains,
    DefaultValue,
    Deprecated,
    Eval,
    Extension,
    FileSize,
    FontHasLatinChars,
    HasProcessColorants,
    HasSpotColorants,
    Ignore,
    ImageIsStructContentItem,
    ImplementationDependent,
    InKeyMap,
    InMap,
    InNameTree,
    IsAssociatedFile,
    IsEncryptedWrapper,
    IsFieldName,
    IsHexString,
    IsLastInNumberFormatArray,
    IsMeaningful,
    IsPDFTagged,
    IsPDFVersion,
    IsPresent,
    IsRequired,
    KeyNameIsColorant,
    MustBeDirect,
    MustBeIndirect,
    NoCycle,
    Not,
    NotInMap,
    NotPresent,
    NotStandard14Font,
    NumberOfPages,
    PageContainsStructContentItems,
    PageProperty,
    RectHeight,
    RectWidth,
    RequiredValue,
    SinceVersion,
    StreamLength,
    StringLength,
}

/// Name and accepted argument counts (min, max) of every predicate.
const VOCABULARY: &[(Predicate, &str, usize, usize)] = &[
    (Predicate::AlwaysUnencrypted, "AlwaysUnencrypted", 0, 0),
    (Predicate::ArrayLength, "ArrayLength", 1, 1),
    (Predicate::ArraySortAscending, "ArraySortAscending", 2, 2),
    (Predicate::BeforeVersion, "BeforeVersion", 1, 2),
    (Predicate::BitClear, "BitClear", 1, 1),
    (Predicate::BitSet, "BitSet", 1, 1),
    (Predicate::BitsClear, "BitsClear", 2, 2),
    (Predicate::BitsSet, "BitsSet", 2, 2),
    (Predicate::Contains, "Contains", 2, 2),
    (Predicate::DefaultValue, "DefaultValue", 2, 2),
    (Predicate::Deprecated, "Deprecated", 1, 2),
    (Predicate::Eval, "Eval", 1, 1),
    (Predicate::Extension, "Extension", 1, 2),
    (Predicate::FileSize, "FileSize", 0, 0),
    (Predicate::FontHasLatinChars, "FontHasLatinChars", 0, 0),
    (Predicate::HasProcessColorants, "HasProcessColorants", 1, 1),
    (Predicate::HasSpotColorants, "HasSpotColorants", 1, 1),
    (Predicate::Ignore, "Ignore", 0, 1),
    (Predicate::ImageIsStructContentItem, "ImageIsStructContentItem", 0, 0),
    (Predicate::ImplementationDependent, "ImplementationDependent", 0, 0),
    (Predicate::InKeyMap, "InKeyMap", 1, 1),
    (Predicate::InMap, "InMap", 1, 1),
    (Predicate::InNameTree, "InNameTree", 1, 1),
    (Predicate::IsAssociatedFile, "IsAssociatedFile", 0, 0),
    (Predicate::IsEncryptedWrapper, "IsEncryptedWrapper", 0, 0),
    (Predicate::IsFieldName, "IsFieldName", 0, 1),
    (Predicate::IsHexString, "IsHexString", 0, 0),
    (Predicate::IsLastInNumberFormatArray, "IsLastInNumberFormatArray", 1, 1),
    (Predicate::IsMeaningful, "IsMeaningful", 0, 1),
    (Predicate::IsPDFTagged, "IsPDFTagged", 0, 0),
    (Predicate::IsPDFVersion, "IsPDFVersion", 1, 2),
    (Predicate::IsPresent, "IsPresent", 1, 2),
    (Predicate::IsRequired, "IsRequired", 1, 1),
    (Predicate::KeyNameIsColorant, "KeyNameIsColorant", 0, 0),
    (Predicate::MustBeDirect, "MustBeDirect", 0, 1),
    (Predicate::MustBeIndirect, "MustBeIndirect", 0, 1),
    (Predicate::NoCycle, "NoCycle", 0, 0),
    (Predicate::Not, "Not", 1, 1),
    (Predicate::NotInMap, "NotInMap", 1, 1),
    (Predicate::NotPresent, "NotPresent", 1, 1),
    (Predicate::NotStandard14Font, "NotStandard14Font", 0, 0),
    (Predicate::NumberOfPages, "NumberOfPages", 0, 0),
    (Predicate::PageContainsStructContentItems, "PageContainsStructContentItems", 0, 0),
    (Predicate::PageProperty, "PageProperty", 2, 2),
    (Predicate::RectHeight, "RectHeight", 1, 1),
    (Predicate::RectWidth, "RectWidth", 1, 1),
    (Predicate::RequiredValue, "RequiredValue", 2, 2),
    (Predicate::SinceVersion, "SinceVersion", 1, 2),
    (Predicate::StreamLength, "StreamLength", 1, 1),
    (Predicate::StringLength, "StringLength", 1, 1),
];

impl Predicate {
    /// Looks up a bare function name such as `SinceVersion`.
    pub fn from_name(name: &str) -> Option<Predicate> {
        VOCABULARY
            .iter()
            .find(|(_, n, _, _)| *n == name)
            .map(|(p, _, _, _)| *p)
    }

    /// Looks up a full predicate head such as `fn:SinceVersion(`.
    pub fn from_head(head: &str) -> Option<Predicate> {
        head.strip_prefix("fn:")
            .and_then(|rest| rest.strip_suffix('('))
            .and_then(Predicate::from_name)
    }

    fn entry(&self) -> &'static (Predicate, &'static str, usize, usize) {
        // Every variant has exactly one row in VOCABULARY.
        VOCABULARY
            .iter()
            .find(|(p, _, _, _)| p == self)
            .unwrap_or(&VOCABULARY[0])
    }

    /// The bare function name, e.g. `ArrayLength`.
    pub fn name(&self) -> &'static str {
        self.entry().1
    }

    /// The head as written in grammar cells, e.g. `fn:ArrayLength(`.
    pub fn head(&self) -> String {
        format!("fn:{}(", self.name())
    }

    /// Whether a call with `count` arguments is well formed.
    pub fn accepts(&self, count: usize) -> bool {
        let (_, _, min, max) = *self.entry();
        (min..=max).contains(&count)
    }

    pub fn all() -> impl Iterator<Item = Predicate> {
        VOCABULARY.iter().map(|(p, _, _, _)| *p)
    }

    /// Predicates whose result is only a plausible answer. Reducing one of
    /// these always marks the reduction as not fully processed.
    pub fn is_best_effort(&self) -> bool {
        matches!(
            self,
            Predicate::DefaultValue
                | Predicate::Ignore
                | Predicate::ImageIsStructContentItem
                | Predicate::ImplementationDependent
                | Predicate::InMap
                | Predicate::IsAssociatedFile
                | Predicate::IsEncryptedWrapper
                | Predicate::IsLastInNumberFormatArray
                | Predicate::IsMeaningful
                | Predicate::IsPresent
                | Predicate::KeyNameIsColorant
                | Predicate::NoCycle
                | Predicate::NotInMap
                | Predicate::NotPresent
                | Predicate::NumberOfPages
                | Predicate::PageContainsStructContentItems
                | Predicate::PageProperty
        )
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn:{}(", self.name())
    }
}
