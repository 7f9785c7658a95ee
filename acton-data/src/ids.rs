//! Trace identifiers carried by request scopes
//!
//! A [`TraceId`] ties together every log line emitted while one logical
//! request runs, across repository calls and middleware. Ids are TypeIDs with
//! the `trace` prefix over a UUIDv7, so they sort by creation time.
//!
//! ```rust
//! use acton_data::ids::TraceId;
//!
//! let incoming: TraceId = "trace_01h455vb4pex5vsknk084sn02q".parse().unwrap();
//! assert_eq!(incoming.to_string(), "trace_01h455vb4pex5vsknk084sn02q");
//! ```

use mti::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Trace identifier, `trace_<base32 uuidv7>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraceId(MagicTypeId);

impl TraceId {
    /// TypeID prefix of every trace id
    pub const PREFIX: &'static str = "trace";

    /// Generate a fresh id
    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    /// Full id text, prefix included
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraceId {
    type Err = TraceIdError;

    /// Accept an id propagated from an upstream caller
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = MagicTypeId::from_str(s)?;
        let prefix = parsed.prefix().as_str();
        if prefix != Self::PREFIX {
            return Err(TraceIdError::WrongPrefix(prefix.to_string()));
        }
        Ok(Self(parsed))
    }
}

/// Rejected trace id text
#[derive(Debug, thiserror::Error)]
pub enum TraceIdError {
    /// Not a TypeID at all
    #[error("malformed trace id: {0}")]
    Malformed(#[from] MagicTypeIdError),

    /// A TypeID for something other than a trace
    #[error("expected a `trace_` id, got prefix {0:?}")]
    WrongPrefix(String),
}
