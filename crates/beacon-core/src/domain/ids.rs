//! Dispatch identifiers.
//!
//! Every handled change event gets a ULID, carried on its tracing span so
//! the log lines of one dispatch can be grouped. Ids are never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of one handled change event, displayed as `dispatch-<ulid>`.
///
/// ULIDs sort by creation time, so ids order the same way dispatches started.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchId(Ulid);

impl DispatchId {
    const PREFIX: &'static str = "dispatch-";

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for DispatchId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}
