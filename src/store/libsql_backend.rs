//! libSQL backend: async `RegistrationStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::leads::model::{Assessment, LeadStatus, Registration, Relation};
use crate::store::migrations;
use crate::store::traits::RegistrationStore;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        backend.init_schema().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    async fn init_schema(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(&self.conn).await
    }

    /// Load a registration by its (normalized) email. `Ok(None)` when no row matches.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Registration>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE email = ?1"),
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::from_libsql("find_by_email", e))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_registration(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::from_libsql("find_by_email", e)),
        }
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<String>` to libsql Value.
fn opt_text(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

const REGISTRATION_COLUMNS: &str =
    "id, name, email, whatsapp, relation, concerns, status, created_at, assessment, report_id";

fn row_to_registration(row: &libsql::Row) -> Result<Registration, DatabaseError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DatabaseError::Serialization(format!("bad registration id {id_str}: {e}")))?;
    let name: String = row
        .get(1)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
    let relation: String = row
        .get(4)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
    let concerns_json: String = row.get(5).unwrap_or_else(|_| "[]".to_string());
    let status: String = row
        .get(6)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
    let created_str: String = row
        .get(7)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
    let assessment_json: Option<String> = row.get(8).ok();

    let concerns: Vec<String> = serde_json::from_str(&concerns_json)
        .map_err(|e| DatabaseError::Serialization(format!("concerns: {e}")))?;
    let assessment: Option<Assessment> = assessment_json
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| DatabaseError::Serialization(format!("assessment: {e}")))?;

    Ok(Registration {
        id,
        name,
        email: row.get(2).ok(),
        whatsapp: row.get(3).ok(),
        relation: Relation::from_db(&relation),
        concerns,
        status: LeadStatus::from_db(&status),
        created_at: parse_datetime(&created_str),
        assessment,
        report_id: row.get(9).ok(),
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl RegistrationStore for LibSqlBackend {
    async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT 1 FROM registrations WHERE email = ?1 LIMIT 1",
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::from_libsql("email_exists", e))?;

        match rows.next().await {
            Ok(row) => Ok(row.is_some()),
            Err(e) => Err(DatabaseError::from_libsql("email_exists", e)),
        }
    }

    async fn insert_registration(&self, registration: &Registration) -> Result<(), DatabaseError> {
        let concerns = serde_json::to_string(&registration.concerns)
            .map_err(|e| DatabaseError::Serialization(format!("concerns: {e}")))?;
        let assessment = registration
            .assessment
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DatabaseError::Serialization(format!("assessment: {e}")))?;

        self.conn
            .execute(
                "INSERT INTO registrations (id, name, email, whatsapp, relation, concerns,
                    status, created_at, assessment, report_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    registration.id.to_string(),
                    registration.name.clone(),
                    opt_text(registration.email.clone()),
                    opt_text(registration.whatsapp.clone()),
                    registration.relation.as_str(),
                    concerns,
                    registration.status.as_str(),
                    registration.created_at.to_rfc3339(),
                    opt_text(assessment),
                    opt_text(registration.report_id.clone()),
                ],
            )
            .await
            .map_err(|e| DatabaseError::from_libsql("insert_registration", e))?;

        debug!(id = %registration.id, "Registration inserted into DB");
        Ok(())
    }

    async fn list_registrations(&self) -> Result<Vec<Registration>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {REGISTRATION_COLUMNS} FROM registrations ORDER BY created_at DESC"
                ),
                (),
            )
            .await
            .map_err(|e| DatabaseError::from_libsql("list_registrations", e))?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::from_libsql("list_registrations", e))?
        {
            out.push(row_to_registration(&row)?);
        }
        Ok(out)
    }

    async fn count_registrations(&self) -> Result<usize, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM registrations", ())
            .await
            .map_err(|e| DatabaseError::from_libsql("count_registrations", e))?;
        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::from_libsql("count_registrations", e))?
        {
            Some(row) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
                Ok(count as usize)
            }
            None => Ok(0),
        }
    }
}
