// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON error body shared by generated servers and clients.

use crate::error::TwirkError;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Serialisable snapshot of a [`TwirkError`]: code, message and metadata.
///
/// The wrapped cause of an internal error is never part of the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
    /// Wire spelling of the error code. Kept as a string so that a body
    /// from a newer peer with an unknown code still decodes.
    pub code: String,
    /// Human-readable message.
    pub msg: String,
    /// Metadata; omitted when empty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl ErrorBody {
    /// Encode as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<&TwirkError> for ErrorBody {
    fn from(err: &TwirkError) -> Self {
        Self {
            code: err.code().as_str().to_owned(),
            msg: err.msg().to_owned(),
            meta: err.meta_map().clone(),
        }
    }
}

/// Rebuilds the error through [`TwirkError::new`], so an unrecognised code
/// from a peer becomes an internal error.
impl From<ErrorBody> for TwirkError {
    fn from(body: ErrorBody) -> Self {
        let err = TwirkError::new(&body.code, body.msg);
        if body.meta.is_empty() {
            return err;
        }
        err.with_meta_map(Arc::new(body.meta))
    }
}

impl Serialize for TwirkError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ErrorBody::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TwirkError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ErrorBody::deserialize(deserializer).map(Into::into)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
