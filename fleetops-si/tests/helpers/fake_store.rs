//! In-memory RemoteStore that records every call

use async_trait::async_trait;
use fleetops_si::models::CandidateRecord;
use fleetops_si::services::{Reference, RemoteStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One `create` call as seen by the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCall {
    pub table: String,
    pub record: serde_json::Value,
    pub on_conflict: Option<String>,
}

#[derive(Default)]
pub struct FakeStore {
    calls: Mutex<Vec<StoreCall>>,
    references: HashMap<String, Vec<Reference>>,
    /// Record key → rejection message (`None` = rejected without a message)
    rejections: HashMap<String, Option<String>>,
    delays: HashMap<String, Duration>,
    references_unavailable: bool,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(self, id: &str, name: &str) -> Self {
        self.with_reference("branches", id, name)
    }

    pub fn with_shift(self, id: &str, name: &str) -> Self {
        self.with_reference("shifts", id, name)
    }

    fn with_reference(mut self, table: &str, id: &str, name: &str) -> Self {
        self.references
            .entry(table.to_string())
            .or_default()
            .push(Reference {
                id: id.to_string(),
                name: name.to_string(),
            });
        self
    }

    /// Reject the record whose `name` (shifts) or `driver_id` (assignments) is `key`
    pub fn reject(mut self, key: &str, message: Option<&str>) -> Self {
        self.rejections
            .insert(key.to_string(), message.map(str::to_string));
        self
    }

    /// Delay the response for the record identified by `key`
    pub fn delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    /// Fail every `list_references` call
    pub fn references_unavailable(mut self) -> Self {
        self.references_unavailable = true;
        self
    }

    /// Trigger `token` once `calls` create calls have been received
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record_key(record: &serde_json::Value) -> String {
        record
            .get("name")
            .or_else(|| record.get("driver_id"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn create(
        &self,
        table: &str,
        record: &CandidateRecord,
        on_conflict: Option<&str>,
    ) -> Result<serde_json::Value, StoreError> {
        let record = serde_json::to_value(record).unwrap();
        let key = Self::record_key(&record);

        let call_count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(StoreCall {
                table: table.to_string(),
                record: record.clone(),
                on_conflict: on_conflict.map(str::to_string),
            });
            calls.len()
        };

        if let Some((after, token)) = &self.cancel_after {
            if call_count >= *after {
                token.cancel();
            }
        }

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        match self.rejections.get(&key) {
            Some(message) => Err(StoreError::Rejected {
                status: 409,
                message: message.clone(),
            }),
            None => {
                let mut created = record;
                created["id"] = serde_json::json!(format!("new-{}", call_count));
                Ok(created)
            }
        }
    }

    async fn list_references(&self, table: &str) -> Result<Vec<Reference>, StoreError> {
        if self.references_unavailable {
            return Err(StoreError::Network("connection refused".to_string()));
        }
        Ok(self.references.get(table).cloned().unwrap_or_default())
    }
}
