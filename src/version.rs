use std::fmt;
use std::str::FromStr;

/// A PDF version packed as `major * 10 + minor`, so `1.7` is `17` and `2.0`
/// is `20`. Only the nine published versions can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PdfVersion(u8);

impl PdfVersion {
    /// Every PDF version, oldest first.
    pub const ALL: [PdfVersion; 9] = [
        PdfVersion(10),
        PdfVersion(11),
        PdfVersion(12),
        PdfVersion(13),
        PdfVersion(14),
        PdfVersion(15),
        PdfVersion(16),
        PdfVersion(17),
        PdfVersion(20),
    ];

    pub const LATEST: PdfVersion = PdfVersion(20);

    pub fn packed(self) -> u8 {
        self.0
    }

    pub fn major(self) -> u8 {
        self.0 / 10
    }

    pub fn minor(self) -> u8 {
        self.0 % 10
    }

    /// `true` for exactly the three-character spellings `1.0`..`1.7` and `2.0`.
    pub fn is_valid(text: &str) -> bool {
        text.parse::<PdfVersion>().is_ok()
    }
}

/// Text that is not one of the PDF versions.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionError(pub String);

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid PDF version '{}' (expected 1.0 to 1.7 or 2.0)", self.0)
    }
}

impl std::error::Error for VersionError {}

impl FromStr for PdfVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 || bytes[1] != b'.' {
            return Err(VersionError(s.to_string()));
        }
        let (major, minor) = (bytes[0], bytes[2]);
        match (major, minor) {
            (b'1', b'0'..=b'7') | (b'2', b'0') => {
                Ok(PdfVersion((major - b'0') * 10 + (minor - b'0')))
            }
            _ => Err(VersionError(s.to_string())),
        }
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}
