//! Postgres-backed document store.
//!
//! All collections share one JSONB table:
//!
//! ```sql
//! documents(collection TEXT, id UUID, body JSONB, PRIMARY KEY (collection, id))
//! ```
//!
//! Uniqueness constraints are partial expression indexes on
//! `(body -> '<field>')` scoped to one collection.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (check / not-null violation) | `23514` / `23502` | `Constraint` |
//! | Database (other) | Any other | `Backend` |
//! | Everything else (pool, io, tls) | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{instrument, Span};
use uuid::Uuid;

use fruitsupply_core::DocumentId;

use super::r#trait::{DocumentStore, Filter, JsonMap, RawDocument, StoreError, StoreResult};

/// Advisory lock key held while running schema DDL ("fsdocs" in ASCII).
const DDL_LOCK_KEY: i64 = 0x6673_646f_6373;
const DDL_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock($1)";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id UUID NOT NULL,
    body JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (collection, id)
)
"#;

/// Postgres-backed document store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`; every operation is a
/// single statement, so per-document atomicity comes from Postgres itself.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Connect and make sure the `documents` table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.run_ddl("ensure_schema", SCHEMA).await
    }

    /// Run one `IF NOT EXISTS` DDL statement under a transaction-scoped
    /// advisory lock. Two processes issuing the same `CREATE ... IF NOT EXISTS`
    /// at once can otherwise hit 23505 on the system catalogs.
    async fn run_ddl(&self, operation: &str, sql: &str) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        sqlx::query(DDL_LOCK_SQL)
            .bind(DDL_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        sqlx::query(sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        tx.commit().await.map_err(|e| map_sqlx_error(operation, e))
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self), err)]
    async fn ensure_unique(&self, collection: &str, field: &str) -> StoreResult<()> {
        // Index DDL cannot take bind parameters; only plain identifiers get here.
        check_identifier(collection)?;
        check_identifier(field)?;

        self.run_ddl("ensure_unique", &unique_index_sql(collection, field))
            .await
    }

    #[instrument(skip(self, body), fields(id), err)]
    async fn insert_one(&self, collection: &str, body: JsonMap) -> StoreResult<DocumentId> {
        let id = DocumentId::new();
        Span::current().record("id", tracing::field::display(id));

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id.as_uuid())
            .bind(Json(JsonValue::Object(body)))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_one", e))?;

        Ok(id)
    }

    #[instrument(skip(self), err)]
    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<RawDocument>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id, body FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY id LIMIT 1");

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_one", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: Uuid = row
            .try_get("id")
            .map_err(|e| StoreError::Serialization(format!("failed to read document id: {e}")))?;
        let Json(body): Json<JsonMap> = row
            .try_get("body")
            .map_err(|e| StoreError::Serialization(format!("failed to read document body: {e}")))?;

        Ok(Some(RawDocument {
            id: DocumentId::from_uuid(id),
            body,
        }))
    }

    #[instrument(skip(self, fields), err)]
    async fn set_fields(&self, collection: &str, filter: &Filter, fields: JsonMap) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE documents SET body = body || ");
        qb.push_bind(Json(JsonValue::Object(fields)));
        push_first_match(&mut qb, collection, filter);

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_fields", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, body), err)]
    async fn replace_one(&self, collection: &str, filter: &Filter, body: JsonMap) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE documents SET body = ");
        qb.push_bind(Json(JsonValue::Object(body)));
        push_first_match(&mut qb, collection, filter);

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("replace_one", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM documents");
        push_first_match(&mut qb, collection, filter);

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_one", e))?;
        Ok(result.rows_affected())
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::Id(id) => {
            qb.push(" AND id = ");
            qb.push_bind(*id.as_uuid());
        }
        Filter::Eq { field, value } => {
            qb.push(" AND body -> ");
            qb.push_bind(field.clone());
            qb.push(" = ");
            qb.push_bind(Json(value.clone()));
        }
    }
}

/// ` WHERE` clause restricting a write to the first matching document.
fn push_first_match(qb: &mut QueryBuilder<'_, Postgres>, collection: &str, filter: &Filter) {
    qb.push(" WHERE collection = ");
    qb.push_bind(collection.to_string());
    qb.push(" AND id = (SELECT id FROM documents WHERE collection = ");
    qb.push_bind(collection.to_string());
    push_filter(qb, filter);
    qb.push(" ORDER BY id LIMIT 1)");
}

/// Caller must have passed both names through `check_identifier`.
fn unique_index_sql(collection: &str, field: &str) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS documents_{collection}_{field}_key \
         ON documents ((body -> '{field}')) WHERE collection = '{collection}'"
    )
}

fn check_identifier(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::Backend(format!("unsupported collection/field name: {name:?}")))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{} ({})", db_err.message(), operation);
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Constraint(format!("duplicate key: {msg}")),
                Some("23514") | Some("23502") => StoreError::Constraint(msg),
                _ => StoreError::Backend(format!("database error: {msg}")),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}
