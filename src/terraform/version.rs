//! Planner version parsing and feature gates.

use std::fmt;
use std::str::FromStr;

use crate::error::{AutomvError, Result, TerraformError};

/// A `major.minor.patch` planner version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerraformVersion {
    /// Major version.
    pub major: u64,
    /// Minor version.
    pub minor: u64,
    /// Patch version.
    pub patch: u64,
}

/// First version that understands `moved` blocks.
pub const MOVED_BLOCKS_VERSION: TerraformVersion = TerraformVersion::new(1, 1, 0);

impl TerraformVersion {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns true if this version understands `moved` blocks.
    #[must_use]
    pub fn supports_moved_blocks(&self) -> bool {
        *self >= MOVED_BLOCKS_VERSION
    }

    /// Fails unless this version understands `moved` blocks.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError::UnsupportedVersion`] for versions before 1.1.
    pub fn require_moved_blocks(&self) -> Result<()> {
        if self.supports_moved_blocks() {
            Ok(())
        } else {
            Err(TerraformError::UnsupportedVersion {
                found: self.to_string(),
                required: MOVED_BLOCKS_VERSION.to_string(),
                feature: String::from("moved blocks"),
            }
            .into())
        }
    }
}

impl FromStr for TerraformVersion {
    type Err = AutomvError;

    /// Parses `1.6.0`, `v1.6.0`, `1.6` or `1.7.0-beta1`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || -> AutomvError {
            TerraformError::InvalidVersion { raw: s.to_string() }.into()
        };

        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let core = trimmed.split(['-', '+']).next().unwrap_or_default();

        let mut numbers = [0u64; 3];
        let mut count = 0;
        for (i, part) in core.split('.').enumerate() {
            if i >= numbers.len() {
                return Err(invalid());
            }
            numbers[i] = part.parse().map_err(|_| invalid())?;
            count += 1;
        }
        if count < 2 {
            return Err(invalid());
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl fmt::Display for TerraformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!("1.6.0".parse::<TerraformVersion>().unwrap(), TerraformVersion::new(1, 6, 0));
        assert_eq!("v1.0.11".parse::<TerraformVersion>().unwrap(), TerraformVersion::new(1, 0, 11));
        assert_eq!("1.7".parse::<TerraformVersion>().unwrap(), TerraformVersion::new(1, 7, 0));
        assert_eq!(
            "1.8.0-beta1".parse::<TerraformVersion>().unwrap(),
            TerraformVersion::new(1, 8, 0)
        );
    }

    #[test]
    fn test_parse_invalid_versions() {
        for raw in ["", "1", "one.two", "1.2.3.4", "1..2"] {
            assert!(raw.parse::<TerraformVersion>().is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn test_moved_blocks_gate() {
        assert!(!TerraformVersion::new(0, 15, 5).supports_moved_blocks());
        assert!(!TerraformVersion::new(1, 0, 11).supports_moved_blocks());
        assert!(TerraformVersion::new(1, 1, 0).supports_moved_blocks());
        assert!(TerraformVersion::new(2, 0, 0).supports_moved_blocks());

        let err = TerraformVersion::new(1, 0, 0).require_moved_blocks().unwrap_err();
        assert!(err.to_string().contains("requires 1.1.0"));
    }
}
