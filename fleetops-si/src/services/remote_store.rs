//! Remote data store seam
//!
//! The importer only needs two things from the backend: create one record in
//! a table, and list `(id, name)` pairs used to resolve references. Tests
//! substitute an in-memory implementation.

use async_trait::async_trait;
use fleetops_common::Locale;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::models::CandidateRecord;

/// Remote store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Request never produced a response (DNS, TLS, timeout, refused)
    #[error("Network error: {0}")]
    Network(String),

    /// Store answered with a non-success status
    #[error("Store rejected request ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        /// Human-readable reason from the response, when there was one
        message: Option<String>,
    },

    /// Success response that could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl StoreError {
    /// Text recorded against a failed row
    ///
    /// The store's own message when it gave one, otherwise the locale's
    /// generic "unknown error".
    pub fn operator_message(&self, locale: Locale) -> String {
        match self {
            StoreError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            StoreError::Network(message) if !message.trim().is_empty() => message.clone(),
            _ => locale.unknown_error().to_string(),
        }
    }
}

/// `(id, name)` pair from a reference table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reference {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
}

/// Backend the importer writes to
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create one record; returns the created entity
    ///
    /// `on_conflict` names the columns to merge on (upsert mode).
    async fn create(
        &self,
        table: &str,
        record: &CandidateRecord,
        on_conflict: Option<&str>,
    ) -> Result<serde_json::Value, StoreError>;

    /// List every `(id, name)` in a reference table
    async fn list_references(&self, table: &str) -> Result<Vec<Reference>, StoreError>;
}

/// Ids are numeric in some tables and UUID strings in others
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_message_prefers_store_text() {
        let err = StoreError::Rejected {
            status: 409,
            message: Some("duplicate".to_string()),
        };
        assert_eq!(err.operator_message(Locale::Es), "duplicate");
    }

    #[test]
    fn test_operator_message_fallback() {
        let err = StoreError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(err.operator_message(Locale::Es), "Error desconocido");
        assert_eq!(
            StoreError::Decode("eof".into()).operator_message(Locale::En),
            "Unknown error"
        );
    }

    #[test]
    fn test_reference_id_number_or_string() {
        let refs: Vec<Reference> =
            serde_json::from_str(r#"[{"id": 7, "name": "Santiago"}, {"id": "b2", "name": "Temuco"}]"#)
                .unwrap();
        assert_eq!(refs[0].id, "7");
        assert_eq!(refs[1].id, "b2");
    }
}
