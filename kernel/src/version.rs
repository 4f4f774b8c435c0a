// Schema Versions
//
// Dotted numeric versions as recorded in the `schema_version` table.
// Ordering is component-wise numeric; missing trailing components
// count as zero, so "0.30" == "0.30.0" and "0.9" < "0.30".

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Schema version of the default store this build expects.
pub const SCHEMA_VERSION: &str = "0.30";

/// Schema version of the visibility store this build expects.
pub const VISIBILITY_SCHEMA_VERSION: &str = "0.6";

#[derive(Debug, Clone)]
pub struct SchemaVersion {
    raw: String,
    components: Vec<u64>,
}

impl SchemaVersion {
    pub fn parse(input: &str) -> Result<Self, SchemaError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('v').unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(SchemaError::InvalidVersion(input.into()));
        }

        let components = digits
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| SchemaError::InvalidVersion(input.into()))?;

        Ok(Self {
            raw: trimmed.into(),
            components,
        })
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SchemaVersion {}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
