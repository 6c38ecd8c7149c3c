//! Append-only audit trail for document events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// State-changing operations that leave an audit entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Upload,
    Process,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Upload => "UPLOAD",
            AuditAction::Process => "PROCESS",
            AuditAction::Delete => "DELETE",
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPLOAD" => Ok(AuditAction::Upload),
            "PROCESS" => Ok(AuditAction::Process),
            "DELETE" => Ok(AuditAction::Delete),
            other => Err(format!("unknown audit action '{}'", other)),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit log entry. Entries are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub action: AuditAction,
    /// Always a JSON object; `{}` when the operation has nothing to record
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Create a new entry stamped with the current time.
    ///
    /// Any non-object metadata (including `None`) is replaced by an empty object.
    pub fn new(
        document_id: Uuid,
        user_id: Uuid,
        action: AuditAction,
        metadata: Option<Value>,
    ) -> Self {
        let metadata = match metadata {
            Some(Value::Object(map)) => Value::Object(map),
            _ => Value::Object(Map::new()),
        };

        Self {
            id: Uuid::new_v4(),
            document_id,
            user_id,
            action,
            metadata,
            created_at: Utc::now(),
        }
    }
}
