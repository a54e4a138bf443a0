//! Lexical scanning of JavaScript and TypeScript source for log calls.
//!
//! - [`balance`]: delimiter-balanced matching of a single call expression
//! - [`marker`]: the reserved disable marker and its wrap/unwrap helpers
//! - [`occurrence`]: the per-file pass that locates and classifies calls

pub mod balance;
pub mod marker;
pub mod occurrence;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

pub use marker::DISABLE_MARKER;
pub use occurrence::{scan, Occurrence, ScanResult, SkipReason, SkippedOccurrence, State};

/// The call to look for, as a dotted identifier path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Target(String);

impl Target {
    /// Validate and wrap a dotted identifier such as `console.debug`.
    pub fn new(name: &str) -> crate::Result<Self> {
        let valid = !name.is_empty()
            && name.split('.').all(|part| {
                let mut chars = part.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            });
        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(SweepError::InvalidTarget(name.to_string()))
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub(crate) fn callee(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Default for Target {
    fn default() -> Self {
        Self("console.log".to_string())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Target {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Target {
    type Error = SweepError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.0
    }
}
