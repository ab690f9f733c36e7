use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables both parties must agree on before a session starts. None of these
/// travel on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of buckets a mismatching range is split into.
    pub buckets: usize,
    /// Ranges with fewer records than this are sent as explicit id lists.
    pub skip_threshold: usize,
    /// The session driver gives up after this many reconcile calls.
    pub max_exchanges: usize,
}

impl Config {
    pub const DEFAULT_BUCKETS: usize = 16;
    pub const DEFAULT_MAX_EXCHANGES: usize = 64;

    /// A config with `buckets` buckets and the matching skip threshold of
    /// twice that.
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            buckets,
            skip_threshold: 2 * buckets,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.buckets < 2 {
            return Err(Error::InvalidConfig("need at least two buckets"));
        }
        if self.skip_threshold < self.buckets {
            return Err(Error::InvalidConfig(
                "skip threshold must not be below the bucket count",
            ));
        }
        if self.max_exchanges == 0 {
            return Err(Error::InvalidConfig("max_exchanges must be positive"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buckets: Self::DEFAULT_BUCKETS,
            skip_threshold: 2 * Self::DEFAULT_BUCKETS,
            max_exchanges: Self::DEFAULT_MAX_EXCHANGES,
        }
    }
}
