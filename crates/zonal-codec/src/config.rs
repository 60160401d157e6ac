//! Decoder resource limits.
//!
//! Limits bound what a single decode may allocate. Defaults accommodate every
//! zone in the tz database with a wide margin. Override via environment
//! variables or explicit construction.

/// Default cap on the transitions of one list. The largest tz zones have a
/// few hundred.
pub const DEFAULT_MAX_TRANSITIONS: u32 = 65_536;

/// Upper bound on the capacity reserved from an untrusted count.
pub(crate) const MAX_PREALLOCATION: usize = 1024;

/// Resource limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest transition count accepted in one list.
    pub max_transitions: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_transitions: DEFAULT_MAX_TRANSITIONS,
        }
    }
}

impl DecodeLimits {
    /// Load limits from environment variables.
    ///
    /// Variables:
    /// - `ZONAL_MAX_TRANSITIONS` (default: 65536)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_transitions: parse_u32(
                "ZONAL_MAX_TRANSITIONS",
                std::env::var("ZONAL_MAX_TRANSITIONS").ok().as_deref(),
                DEFAULT_MAX_TRANSITIONS,
            )?,
        })
    }

    pub fn with_max_transitions(mut self, max_transitions: u32) -> Self {
        self.max_transitions = max_transitions;
        self
    }
}

fn parse_u32(var: &str, raw: Option<&str>, default: u32) -> Result<u32, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), value.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}
