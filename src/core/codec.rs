//! JSON encoding and decoding of artifact documents

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Turns typed documents into JSON bytes and back
#[derive(Debug, Clone, Copy)]
pub struct DocumentCodec {
    pretty: bool,
}

impl Default for DocumentCodec {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl DocumentCodec {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn to_json<T: Serialize>(&self, value: &T) -> serde_json::Result<Vec<u8>> {
        if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        }
    }

    pub fn from_json<T: DeserializeOwned>(&self, bytes: &[u8]) -> serde_json::Result<T> {
        serde_json::from_slice(bytes)
    }

    /// Decode a flat string-to-string JSON object
    pub fn from_json_to_map(&self, bytes: &[u8]) -> serde_json::Result<BTreeMap<String, String>> {
        serde_json::from_slice(bytes)
    }
}
