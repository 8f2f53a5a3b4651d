//! Per-call context: provenance metadata attached to a single request.
//!
//! A context is a list of entries, each a small JSON object of tags. It is
//! sent as the `context` member of the request envelope only when it has at
//! least one entry, and the client never keeps it after the call.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One metadata entry: a set of key/value tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextEntry(BTreeMap<String, Value>);

impl ContextEntry {
    /// An entry with no tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a tag.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// A provenance tag recording that `method` was called now, optionally as
    /// part of job `job_id`.
    pub fn method_call(method: impl Into<String>, job_id: Option<&str>) -> Self {
        let entry = Self::new()
            .with("method", method.into())
            .with("time", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        match job_id {
            Some(id) => entry.with("job_id", id),
            None => entry,
        }
    }

    /// Looks up a tag.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Metadata attached to one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RpcContext(Vec<ContextEntry>);

impl RpcContext {
    /// An empty context. Sending it is the same as sending no context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose first entry carries a freshly generated `run_id`.
    pub fn new_run() -> Self {
        Self::new().with_entry(ContextEntry::new().with("run_id", Uuid::new_v4().to_string()))
    }

    /// Appends an entry.
    pub fn with_entry(mut self, entry: ContextEntry) -> Self {
        self.0.push(entry);
        self
    }

    /// Appends an entry in place.
    pub fn push(&mut self, entry: ContextEntry) {
        self.0.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.0
    }
}
