//! Transaction results as printed by the node CLI with `--output json`

use serde::{Deserialize, Deserializer};

use crate::error::ChainError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attribute {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxLog {
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Broadcast or query result for a single transaction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxResponse {
    #[serde(default, deserialize_with = "number_or_string")]
    pub height: u64,
    #[serde(default)]
    pub txhash: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default)]
    pub logs: Vec<TxLog>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Confirmed transaction summary handed back to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResult {
    pub hash: String,
    pub height: u64,
}

impl TxResponse {
    pub fn parse(stdout: &[u8]) -> Result<Self, ChainError> {
        serde_json::from_slice(stdout).map_err(|e| {
            ChainError::Decode(format!(
                "tx response: {} ({})",
                e,
                String::from_utf8_lossy(stdout).trim()
            ))
        })
    }

    /// Reject non-zero result codes
    pub fn check(self) -> Result<Self, ChainError> {
        if self.code != 0 {
            return Err(ChainError::TxRejected {
                code: self.code,
                raw_log: self.raw_log,
            });
        }
        Ok(self)
    }

    /// First value of `key` on an event of type `event`
    ///
    /// Newer nodes put events at the top level; older ones nest them in
    /// per-message logs. Both are searched.
    pub fn attribute(&self, event: &str, key: &str) -> Option<&str> {
        self.events
            .iter()
            .chain(self.logs.iter().flat_map(|log| log.events.iter()))
            .filter(|e| e.kind == event)
            .flat_map(|e| e.attributes.iter())
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    pub fn require_attribute(&self, event: &str, key: &str) -> Result<&str, ChainError> {
        self.attribute(event, key)
            .ok_or_else(|| ChainError::MissingAttribute {
                event: event.to_string(),
                key: key.to_string(),
            })
    }

    pub fn result(&self) -> TxResult {
        TxResult {
            hash: self.txhash.clone(),
            height: self.height,
        }
    }
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) if s.is_empty() => Ok(0),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
