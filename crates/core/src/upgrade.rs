//! Versioned content-parameter upgrades, run by host tooling when content moves to a newer
//! library version.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpgradeError {
    #[error("invalid content version: {0:?}")]
    InvalidVersion(String),

    #[error("cannot downgrade params from {from} to {to}")]
    Downgrade {
        from: ContentVersion,
        to: ContentVersion,
    },

    #[error("no upgrade path to {to}; newest known version is {latest}")]
    UnknownTarget {
        to: ContentVersion,
        latest: ContentVersion,
    },
}

//
// ─── VERSION ───────────────────────────────────────────────────────────────────
//

/// `major.minor` version of the content library, e.g. `1.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentVersion {
    pub major: u32,
    pub minor: u32,
}

impl ContentVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ContentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ContentVersion {
    type Err = UpgradeError;

    /// Accepts `"1"` (minor 0) and `"1.1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || UpgradeError::InvalidVersion(s.to_string());
        let trimmed = s.trim();
        let (major, minor) = match trimmed.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (trimmed, "0"),
        };
        let major = major.parse().map_err(|_| invalid())?;
        let minor = minor.parse().map_err(|_| invalid())?;
        Ok(Self::new(major, minor))
    }
}

//
// ─── STEPS ─────────────────────────────────────────────────────────────────────
//

/// 1.0 → 1.1: `behaviour` gains `scoreReported`.
///
/// A bare (pre-object) `behaviour` value was the disable-on-check flag and is wrapped into an
/// object. A falsy `behaviour` (`null`, `false`, `0`, `""`) is left alone, like a missing one.
/// An array counts as structured, but a named key on an array does not survive JSON, so it is
/// left alone too. Running the step twice gives the same result as running it once.
#[must_use]
pub fn migrate_v1_to_v1_1(mut params: Value) -> Value {
    let Some(behaviour) = params.get_mut("behaviour") else {
        return params;
    };
    if !is_truthy(behaviour) {
        return params;
    }

    match behaviour {
        Value::Object(settings) => {
            settings.insert("scoreReported".to_string(), json!(1));
        }
        Value::Array(_) => {}
        legacy => {
            let mut settings = Map::new();
            settings.insert("disableOnCheck".to_string(), legacy.take());
            settings.insert("scoreReported".to_string(), json!(1));
            *legacy = Value::Object(settings);
        }
    }
    params
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Copy)]
struct UpgradeStep {
    from: ContentVersion,
    to: ContentVersion,
    apply: fn(Value) -> Value,
}

/// Ordered upgrade steps for the completion confirmation library.
#[derive(Debug, Clone)]
pub struct Upgrades {
    base: ContentVersion,
    steps: Vec<UpgradeStep>,
}

impl Upgrades {
    #[must_use]
    pub fn completion_confirmation() -> Self {
        Self {
            base: ContentVersion::new(1, 0),
            steps: vec![UpgradeStep {
                from: ContentVersion::new(1, 0),
                to: ContentVersion::new(1, 1),
                apply: migrate_v1_to_v1_1,
            }],
        }
    }

    #[must_use]
    pub fn latest(&self) -> ContentVersion {
        self.steps.last().map_or(self.base, |step| step.to)
    }

    /// Run every step between `from` and `to`, in order.
    ///
    /// # Errors
    ///
    /// Returns `UpgradeError::Downgrade` if `to` is older than `from`, and
    /// `UpgradeError::UnknownTarget` if `to` is newer than any known version.
    pub fn upgrade(
        &self,
        mut params: Value,
        from: ContentVersion,
        to: ContentVersion,
    ) -> Result<Value, UpgradeError> {
        if to < from {
            return Err(UpgradeError::Downgrade { from, to });
        }
        let latest = self.latest();
        if to > latest {
            return Err(UpgradeError::UnknownTarget { to, latest });
        }

        for step in self.steps.iter().filter(|s| s.from >= from && s.to <= to) {
            info!(from = %step.from, to = %step.to, "params.upgrade");
            params = (step.apply)(params);
        }
        Ok(params)
    }
}
