//! Wire types for the HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use prov_engine::VerificationReport;
use prov_types::{ContentRef, Digest, Record, RecordId, Salt, FIELD_COUNT};

/// HTTP endpoint paths.
pub mod endpoints {
    pub const HEALTH: &str = "/v1/health";
    pub const RECORDS: &str = "/v1/records";
    pub const VERIFY: &str = "/v1/verify";
}

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Body of a successful commit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitResponse {
    pub record_id: RecordId,
    pub root: Digest,
    pub content_ref: ContentRef,
    pub salts: [Salt; FIELD_COUNT],
}

impl From<Record> for CommitResponse {
    fn from(record: Record) -> Self {
        Self {
            record_id: record.record_id,
            root: record.root,
            content_ref: record.content_ref,
            salts: record.salts,
        }
    }
}

/// Body of a completed verification, authentic or not.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: VerificationReport,
}

impl From<VerificationReport> for VerifyResponse {
    fn from(report: VerificationReport) -> Self {
        Self {
            message: report.verdict.message().to_string(),
            report,
        }
    }
}

/// Body of every error response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Set when a root is anchored that can no longer be reproduced.
    pub fatal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
}

/// Read a record id from `key`, accepting a JSON number or a decimal string.
pub fn record_id_from_json(body: &Value, key: &str) -> Option<RecordId> {
    match body.get(key)? {
        Value::Number(n) => n.as_u64().map(RecordId),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::HEALTH, "/v1/health");
        assert_eq!(endpoints::RECORDS, "/v1/records");
        assert_eq!(endpoints::VERIFY, "/v1/verify");
    }

    #[test]
    fn record_id_accepts_number_and_string() {
        assert_eq!(record_id_from_json(&json!({"id": 7}), "id"), Some(RecordId(7)));
        assert_eq!(record_id_from_json(&json!({"id": "007"}), "id"), Some(RecordId(7)));
        assert_eq!(record_id_from_json(&json!({"id": "-7"}), "id"), None);
        assert_eq!(record_id_from_json(&json!({"id": 1.5}), "id"), None);
        assert_eq!(record_id_from_json(&json!({}), "id"), None);
    }
}
