//! Status bar severity levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a status bar message.
///
/// On the wire this is a `u32`. `Info` and `Error` keep the values older
/// hosts used; `Warning` was appended.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    /// Informational message.
    Info = 0,
    /// Error message.
    Error = 1,
    /// Warning message.
    Warning = 2,
}

impl StatusLevel {
    /// Decodes a wire level. Unknown values yield `None`.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Info),
            1 => Some(Self::Error),
            2 => Some(Self::Warning),
            _ => None,
        }
    }

    /// The wire value.
    pub fn as_raw(self) -> u32 {
        self as u32
    }

    /// Lowercase name used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_are_stable() {
        assert_eq!(StatusLevel::Info.as_raw(), 0);
        assert_eq!(StatusLevel::Error.as_raw(), 1);
        assert_eq!(StatusLevel::Warning.as_raw(), 2);
    }

    #[test]
    fn test_unknown_level_rejected() {
        assert_eq!(StatusLevel::from_raw(1), Some(StatusLevel::Error));
        assert_eq!(StatusLevel::from_raw(3), None);
        assert_eq!(StatusLevel::from_raw(u32::MAX), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&StatusLevel::Warning).expect("serialize");
        assert_eq!(json, "\"warning\"");
    }
}
