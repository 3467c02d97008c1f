use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of the closed-trade rows of a report (BLAKE3, hex).
///
/// Two reports with the same trades in the same order share a fingerprint,
/// whatever their headers, footers or ledger rows contain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportFingerprint(pub String);

impl ReportFingerprint {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First 12 characters, for display.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(12) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for ReportFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
