//! SQLite-backed document and audit stores

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use docedit_core::{AuditStore, DocumentStore, PageRequest, StoreError};
use shared_types::{AuditLogEntry, Document, VersionPointer};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Connecting to database: {}", database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            file_path TEXT NOT NULL,
            checksum TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            status TEXT NOT NULL DEFAULT 'READY',
            page_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents(owner_id, created_at)
        "#,
    )
    .execute(pool)
    .await?;

    // No foreign key: the trail outlives the document it describes
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_logs (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            action TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_audit_logs_document ON audit_logs(document_id)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Migrations complete");
    Ok(())
}

/// Fixed-width RFC 3339 so stored timestamps sort as text
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn parse_uuid(value: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(value).map_err(|e| StoreError::Backend(format!("Invalid id '{}': {}", value, e)))
}

#[derive(Debug, FromRow)]
struct DbDocument {
    id: String,
    owner_id: String,
    file_path: String,
    checksum: String,
    version: i64,
    status: String,
    page_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DbDocument> for Document {
    type Error = StoreError;

    fn try_from(row: DbDocument) -> Result<Self, Self::Error> {
        Ok(Document {
            id: parse_uuid(&row.id)?,
            owner_id: parse_uuid(&row.owner_id)?,
            file_path: row.file_path,
            checksum: row.checksum,
            version: row.version as u32,
            status: row.status.parse().map_err(StoreError::Backend)?,
            page_count: row.page_count as u32,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const DOCUMENT_COLUMNS: &str =
    "id, owner_id, file_path, checksum, version, status, page_count, created_at, updated_at";

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create(&self, document: &Document) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, owner_id, file_path, checksum, version, status, page_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(document.id.to_string())
        .bind(document.owner_id.to_string())
        .bind(&document.file_path)
        .bind(&document.checksum)
        .bind(document.version as i64)
        .bind(document.status.to_string())
        .bind(document.page_count as i64)
        .bind(timestamp(document.created_at))
        .bind(timestamp(document.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => StoreError::Duplicate(document.id),
            _ => backend(e),
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        let row: Option<DbDocument> = sqlx::query_as(&format!(
            "SELECT {} FROM documents WHERE id = ?",
            DOCUMENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Document::try_from).transpose()
    }

    async fn update(&self, document: &Document) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET owner_id = ?, file_path = ?, checksum = ?, version = ?, status = ?, page_count = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(document.owner_id.to_string())
        .bind(&document.file_path)
        .bind(&document.checksum)
        .bind(document.version as i64)
        .bind(document.status.to_string())
        .bind(document.page_count as i64)
        .bind(timestamp(Utc::now()))
        .bind(document.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(document.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn increment_version(
        &self,
        id: Uuid,
        expected_version: u32,
        pointer: VersionPointer,
    ) -> Result<Document, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET version = version + 1, file_path = ?, checksum = ?, page_count = ?, updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&pointer.file_path)
        .bind(&pointer.checksum)
        .bind(pointer.page_count as i64)
        .bind(timestamp(Utc::now()))
        .bind(id.to_string())
        .bind(expected_version as i64)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        let current = self.find_by_id(id).await?.ok_or(StoreError::NotFound(id))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                actual: current.version,
            });
        }
        Ok(current)
    }

    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Document>, u64), StoreError> {
        let rows: Vec<DbDocument> = sqlx::query_as(&format!(
            "SELECT {} FROM documents WHERE owner_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            DOCUMENT_COLUMNS
        ))
        .bind(owner_id.to_string())
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE owner_id = ?")
            .bind(owner_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        let documents = rows
            .into_iter()
            .map(Document::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((documents, total as u64))
    }
}

#[derive(Debug, FromRow)]
struct DbAuditEntry {
    id: String,
    document_id: String,
    user_id: String,
    action: String,
    metadata: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<DbAuditEntry> for AuditLogEntry {
    type Error = StoreError;

    fn try_from(row: DbAuditEntry) -> Result<Self, Self::Error> {
        Ok(AuditLogEntry {
            id: parse_uuid(&row.id)?,
            document_id: parse_uuid(&row.document_id)?,
            user_id: parse_uuid(&row.user_id)?,
            action: row.action.parse().map_err(StoreError::Backend)?,
            metadata: serde_json::from_str(&row.metadata)
                .map_err(|e| StoreError::Backend(format!("Invalid audit metadata: {}", e)))?,
            created_at: row.created_at,
        })
    }
}

pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, document_id, user_id, action, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.document_id.to_string())
        .bind(entry.user_id.to_string())
        .bind(entry.action.as_str())
        .bind(entry.metadata.to_string())
        .bind(timestamp(entry.created_at))
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn find_by_document(
        &self,
        document_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, u64), StoreError> {
        let rows: Vec<DbAuditEntry> = sqlx::query_as(
            r#"
            SELECT id, document_id, user_id, action, metadata, created_at
            FROM audit_logs
            WHERE document_id = ?
            ORDER BY created_at ASC, rowid ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(document_id.to_string())
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE document_id = ?")
            .bind(document_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        let entries = rows
            .into_iter()
            .map(AuditLogEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((entries, total as u64))
    }
}
