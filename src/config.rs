use crate::error::{QrError, Result};
use crate::mask::Mask;
use crate::version::{EcLevel, Version};

/// Parameters for turning segments into a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Minimum error correction level (default: Medium)
    pub ecl: EcLevel,
    /// Smallest version to consider (default: 1)
    pub min_version: Version,
    /// Largest version to consider (default: 40)
    pub max_version: Version,
    /// Forced mask, or `None` to pick the lowest-penalty one
    pub mask: Option<Mask>,
    /// Raise the error correction level when it costs no extra version (default: true)
    pub boost_ecl: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ecl: EcLevel::Medium,
            min_version: Version::MIN,
            max_version: Version::MAX,
            mask: None,
            boost_ecl: true,
        }
    }
}

impl EncodeOptions {
    /// Options with the given minimum level and defaults elsewhere.
    pub fn with_ecl(ecl: EcLevel) -> Self {
        Self {
            ecl,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_version > self.max_version {
            return Err(QrError::invalid(format!(
                "min version {} exceeds max version {}",
                self.min_version.value(),
                self.max_version.value()
            )));
        }
        Ok(())
    }
}
