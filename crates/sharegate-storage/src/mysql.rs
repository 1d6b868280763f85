use async_trait::async_trait;
use jiff::Timestamp;
use sharegate_core::error::StorageError;
use sharegate_core::repository::{ReadRepository, Repository, Result};
use sharegate_core::{LinkId, OwnerId, ShareLink, ShareToken, SubjectId};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::trace;

const SELECT_LINK: &str = r#"
    SELECT id, token, owner_id, subject_ids, created_at, expires_at, access_count, is_active
    FROM share_links
"#;

/// MySQL implementation of the repository contract.
///
/// Timestamps are stored as unix nanoseconds so that `expires_at - created_at`
/// survives a round trip exactly. Schema: `ddl/mysql/share_links.sql`.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `share_links` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(include_str!("../ddl/mysql/share_links.sql"))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn to_nanos(ts: Timestamp) -> Result<i64> {
    i64::try_from(ts.as_nanosecond()).map_err(|_| {
        StorageError::InvalidData(format!("timestamp '{ts}' does not fit in 64-bit nanoseconds"))
    })
}

fn from_nanos(column: &str, value: i64) -> Result<Timestamp> {
    Timestamp::from_nanosecond(i128::from(value)).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{value}': {e}"))
    })
}

fn invalid(column: &str, err: impl std::fmt::Display) -> StorageError {
    StorageError::InvalidData(format!("invalid {column}: {err}"))
}

fn row_to_link(row: &MySqlRow) -> Result<ShareLink> {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let token: String = row.try_get("token").map_err(map_sqlx_error)?;
    let owner_id: String = row.try_get("owner_id").map_err(map_sqlx_error)?;
    let subject_ids: String = row.try_get("subject_ids").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let expires_at: i64 = row.try_get("expires_at").map_err(map_sqlx_error)?;
    let access_count: u64 = row.try_get("access_count").map_err(map_sqlx_error)?;
    let is_active: bool = row.try_get("is_active").map_err(map_sqlx_error)?;

    Ok(ShareLink {
        id: LinkId::parse(id).map_err(|e| invalid("id", e))?,
        token: ShareToken::new_unchecked(token),
        owner_id: OwnerId::new(owner_id).map_err(|e| invalid("owner_id", e))?,
        subject_ids: serde_json::from_str::<Vec<SubjectId>>(&subject_ids)
            .map_err(|e| invalid("subject_ids", e))?,
        created_at: from_nanos("created_at", created_at)?,
        expires_at: from_nanos("expires_at", expires_at)?,
        access_count,
        is_active,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get(&self, id: &LinkId) -> Result<Option<ShareLink>> {
        let row = sqlx::query(&format!("{SELECT_LINK} WHERE id = ? LIMIT 1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_link).transpose()
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<ShareLink>> {
        let rows = sqlx::query(&format!(
            "{SELECT_LINK} WHERE owner_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_link).collect()
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, link: &ShareLink) -> Result<()> {
        let subject_ids = serde_json::to_string(&link.subject_ids)
            .map_err(|e| StorageError::InvalidData(format!("subject_ids: {e}")))?;

        let result = sqlx::query(
            r#"
            INSERT INTO share_links
                (id, token, owner_id, subject_ids, created_at, expires_at, access_count, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(link.id.as_str())
        .bind(link.token.as_str())
        .bind(link.owner_id.as_str())
        .bind(subject_ids)
        .bind(to_nanos(link.created_at)?)
        .bind(to_nanos(link.expires_at)?)
        .bind(link.access_count)
        .bind(link.is_active)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(link.id.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn record_access(&self, id: &LinkId, now: Timestamp) -> Result<Option<ShareLink>> {
        let now = to_nanos(now)?;
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // The row lock taken by the UPDATE is held until commit, so the SELECT
        // below reads exactly the count this call produced.
        let result = sqlx::query(
            r#"
            UPDATE share_links
            SET access_count = access_count + 1
            WHERE id = ?
              AND is_active = 1
              AND expires_at > ?
            "#,
        )
        .bind(id.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            trace!(id = %id, "no resolvable row to count access against");
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(None);
        }

        let row = sqlx::query(&format!("{SELECT_LINK} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        let link = row_to_link(&row)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(Some(link))
    }

    async fn deactivate(&self, id: &LinkId) -> Result<bool> {
        let result = sqlx::query("UPDATE share_links SET is_active = 0 WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // MySQL reports changed rows, not matched rows: an already revoked
        // link affects nothing but still exists.
        let exists = sqlx::query("SELECT 1 FROM share_links WHERE id = ? LIMIT 1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .is_some();

        Ok(exists)
    }

    async fn delete(&self, id: &LinkId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM share_links WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired_before(&self, cutoff: Timestamp) -> Result<u64> {
        let result = sqlx::query("DELETE FROM share_links WHERE expires_at < ?")
            .bind(to_nanos(cutoff)?)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
