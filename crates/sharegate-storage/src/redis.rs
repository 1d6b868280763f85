use async_trait::async_trait;
use jiff::Timestamp;
use redis::{AsyncCommands, Script};
use serde::{Deserialize, Serialize};
use sharegate_core::error::StorageError;
use sharegate_core::repository::{sort_most_recent_first, ReadRepository, Repository, Result};
use sharegate_core::{LinkId, OwnerId, ShareLink, ShareToken, SubjectId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

const DEFAULT_KEY_PREFIX: &str = "sg:";

// KEYS: link hash, owner index, expiry index
// ARGV: record json, expires_at_ms, access_count, active, created_at_ms, id, owner, expires_at_ns
const INSERT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('HSET', KEYS[1],
  'record', ARGV[1],
  'expires_at_ms', ARGV[2],
  'expires_at_ns', ARGV[8],
  'access_count', ARGV[3],
  'active', ARGV[4],
  'owner', ARGV[7])
redis.call('ZADD', KEYS[2], ARGV[5], ARGV[6])
redis.call('ZADD', KEYS[3], ARGV[2], ARGV[6])
return 1
"#;

// KEYS: link hash
// ARGV: now_ns, zero padded
//
// Nanosecond values exceed the precision of Lua numbers, so both sides are
// fixed-width decimal strings and compare lexicographically.
const RECORD_ACCESS_SCRIPT: &str = r#"
local state = redis.call('HMGET', KEYS[1], 'active', 'expires_at_ns')
if not state[1] or state[1] ~= '1' then
  return false
end
if ARGV[1] >= state[2] then
  return false
end
local count = redis.call('HINCRBY', KEYS[1], 'access_count', 1)
return {count, redis.call('HGET', KEYS[1], 'record')}
"#;

// KEYS: link hash
const DEACTIVATE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return 0
end
redis.call('HSET', KEYS[1], 'active', '0')
return 1
"#;

// KEYS: link hash, expiry index
// ARGV: id, owner index prefix, expiry bound in ms ('' for none)
const DELETE_SCRIPT: &str = r#"
local state = redis.call('HMGET', KEYS[1], 'owner', 'expires_at_ms')
if not state[1] then
  redis.call('ZREM', KEYS[2], ARGV[1])
  return 0
end
if ARGV[3] ~= '' and tonumber(state[2]) >= tonumber(ARGV[3]) then
  return 0
end
redis.call('DEL', KEYS[1])
redis.call('ZREM', KEYS[2], ARGV[1])
redis.call('ZREM', ARGV[2] .. state[1], ARGV[1])
return 1
"#;

/// The immutable part of a link, stored as JSON in the `record` hash field.
///
/// The mutable counters live in their own hash fields so the Lua scripts can
/// update them without decoding JSON.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    id: LinkId,
    token: ShareToken,
    owner_id: OwnerId,
    subject_ids: Vec<SubjectId>,
    created_at: Timestamp,
    expires_at: Timestamp,
}

impl StoredRecord {
    fn from_link(link: &ShareLink) -> Self {
        Self {
            id: link.id.clone(),
            token: link.token.clone(),
            owner_id: link.owner_id.clone(),
            subject_ids: link.subject_ids.clone(),
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }

    fn into_link(self, access_count: u64, is_active: bool) -> ShareLink {
        ShareLink {
            id: self.id,
            token: self.token,
            owner_id: self.owner_id,
            subject_ids: self.subject_ids,
            created_at: self.created_at,
            expires_at: self.expires_at,
            access_count,
            is_active,
        }
    }
}

#[derive(Debug)]
struct Scripts {
    insert: Script,
    record_access: Script,
    deactivate: Script,
    delete: Script,
}

/// A Redis implementation of the repository contract.
///
/// Each link is a hash; two sorted sets index links by owner (scored by
/// creation time) and by expiry. Every mutation runs as a Lua script, which
/// Redis executes atomically. Expiry is checked at nanosecond precision on
/// access; the expiry index holds milliseconds rounded up, so a purge never
/// removes a link early.
///
/// The scripts touch keys derived from stored data, so this backend targets a
/// single Redis primary rather than a cluster.
#[derive(Debug, Clone)]
pub struct RedisRepository {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
    scripts: Arc<Scripts>,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StorageError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_connection_dropped() {
        StorageError::Unavailable(message)
    } else {
        StorageError::Operation(message)
    }
}

fn floor_ms(ts: Timestamp) -> i64 {
    ts.as_millisecond()
}

fn ceil_ms(ts: Timestamp) -> i64 {
    let ms = ts.as_millisecond();
    match Timestamp::from_millisecond(ms) {
        Ok(truncated) if truncated < ts => ms + 1,
        _ => ms,
    }
}

/// Exclusive upper bound of a 20-digit nanosecond count, early in the year 5138.
const PADDED_NANOS_LIMIT: i128 = 100_000_000_000_000_000_000;

/// Unix nanoseconds as a 20-digit decimal string.
fn padded_nanos(ts: Timestamp) -> Result<String> {
    let nanos = ts.as_nanosecond();
    if nanos < 0 {
        return Err(StorageError::InvalidData(format!(
            "timestamp '{ts}' predates the unix epoch"
        )));
    }
    if nanos >= PADDED_NANOS_LIMIT {
        return Err(StorageError::InvalidData(format!(
            "timestamp '{ts}' does not fit in 20 decimal digits of nanoseconds"
        )));
    }
    Ok(format!("{nanos:020}"))
}

fn decode_record(id: &str, json: &str) -> Result<StoredRecord> {
    serde_json::from_str(json).map_err(|e| {
        StorageError::InvalidData(format!("invalid stored record for link '{id}': {e}"))
    })
}

fn decode_hash(id: &str, fields: HashMap<String, String>) -> Result<Option<ShareLink>> {
    if fields.is_empty() {
        return Ok(None);
    }

    let field = |name: &str| {
        fields.get(name).ok_or_else(|| {
            StorageError::InvalidData(format!("link '{id}' is missing field '{name}'"))
        })
    };

    let record = decode_record(id, field("record")?)?;
    let access_count = field("access_count")?.parse::<u64>().map_err(|e| {
        StorageError::InvalidData(format!("invalid access_count for link '{id}': {e}"))
    })?;
    let is_active = field("active")? == "1";

    Ok(Some(record.into_link(access_count, is_active)))
}

impl RedisRepository {
    /// Creates a new Redis repository.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis repository with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for every key (e.g., "myapp:share:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            scripts: Arc::new(Scripts {
                insert: Script::new(INSERT_SCRIPT),
                record_access: Script::new(RECORD_ACCESS_SCRIPT),
                deactivate: Script::new(DEACTIVATE_SCRIPT),
                delete: Script::new(DELETE_SCRIPT),
            }),
        }
    }

    /// Opens a multiplexed connection to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        Self::connect_with_prefix(redis_url, DEFAULT_KEY_PREFIX).await
    }

    /// Opens a multiplexed connection to `redis_url` and namespaces every key
    /// under `key_prefix`.
    pub async fn connect_with_prefix(
        redis_url: &str,
        key_prefix: impl Into<String>,
    ) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("invalid Redis URL", e))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::with_prefix(conn, key_prefix))
    }

    fn link_key(&self, id: &str) -> String {
        format!("{}link:{}", self.key_prefix, id)
    }

    fn owner_prefix(&self) -> String {
        format!("{}owner:", self.key_prefix)
    }

    fn owner_key(&self, owner: &OwnerId) -> String {
        format!("{}{}", self.owner_prefix(), owner.as_str())
    }

    fn expiry_key(&self) -> String {
        format!("{}expiry", self.key_prefix)
    }

    async fn delete_with_bound(&self, id: &str, max_expires_ms: Option<i64>) -> Result<bool> {
        let mut conn = self.conn.clone();
        let bound = max_expires_ms.map(|ms| ms.to_string()).unwrap_or_default();

        let deleted: i64 = self
            .scripts
            .delete
            .key(self.link_key(id))
            .key(self.expiry_key())
            .arg(id)
            .arg(self.owner_prefix())
            .arg(bound)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to delete link", e))?;

        Ok(deleted == 1)
    }
}

#[async_trait]
impl ReadRepository for RedisRepository {
    async fn get(&self, id: &LinkId) -> Result<Option<ShareLink>> {
        trace!(id = %id, "fetching link from Redis");
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn
            .hgetall(self.link_key(id.as_str()))
            .await
            .map_err(|e| map_redis_error("failed to fetch link", e))?;

        decode_hash(id.as_str(), fields)
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<ShareLink>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn
            .zrevrange(self.owner_key(owner), 0, -1)
            .await
            .map_err(|e| map_redis_error("failed to read owner index", e))?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.hgetall(self.link_key(id));
        }
        let hashes: Vec<HashMap<String, String>> = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to fetch owner links", e))?;

        let mut links = Vec::with_capacity(ids.len());
        for (id, fields) in ids.iter().zip(hashes) {
            match decode_hash(id, fields)? {
                Some(link) => links.push(link),
                None => debug!(id = %id, "owner index points at a deleted link"),
            }
        }
        sort_most_recent_first(&mut links);
        Ok(links)
    }
}

#[async_trait]
impl Repository for RedisRepository {
    async fn insert(&self, link: &ShareLink) -> Result<()> {
        let record = serde_json::to_string(&StoredRecord::from_link(link)).map_err(|e| {
            StorageError::InvalidData(format!("failed to serialize link '{}': {e}", link.id))
        })?;

        let mut conn = self.conn.clone();
        let inserted: i64 = self
            .scripts
            .insert
            .key(self.link_key(link.id.as_str()))
            .key(self.owner_key(&link.owner_id))
            .key(self.expiry_key())
            .arg(record)
            .arg(ceil_ms(link.expires_at))
            .arg(link.access_count)
            .arg(if link.is_active { "1" } else { "0" })
            .arg(floor_ms(link.created_at))
            .arg(link.id.as_str())
            .arg(link.owner_id.as_str())
            .arg(padded_nanos(link.expires_at)?)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to insert link", e))?;

        if inserted == 0 {
            return Err(StorageError::Conflict(link.id.to_string()));
        }
        debug!(id = %link.id, "stored link in Redis");
        Ok(())
    }

    async fn record_access(&self, id: &LinkId, now: Timestamp) -> Result<Option<ShareLink>> {
        let now = padded_nanos(now)?;
        let mut conn = self.conn.clone();
        let counted: Option<(u64, String)> = self
            .scripts
            .record_access
            .key(self.link_key(id.as_str()))
            .arg(now)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to record access", e))?;

        let Some((access_count, record)) = counted else {
            return Ok(None);
        };

        // The script only counts active links, so the snapshot is active.
        let link = decode_record(id.as_str(), &record)?.into_link(access_count, true);
        Ok(Some(link))
    }

    async fn deactivate(&self, id: &LinkId) -> Result<bool> {
        let mut conn = self.conn.clone();
        let existed: i64 = self
            .scripts
            .deactivate
            .key(self.link_key(id.as_str()))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to deactivate link", e))?;

        Ok(existed == 1)
    }

    async fn delete(&self, id: &LinkId) -> Result<bool> {
        self.delete_with_bound(id.as_str(), None).await
    }

    async fn purge_expired_before(&self, cutoff: Timestamp) -> Result<u64> {
        let cutoff_ms = floor_ms(cutoff);
        let mut conn = self.conn.clone();
        let candidates: Vec<String> = conn
            .zrangebyscore(self.expiry_key(), "-inf", format!("({cutoff_ms}"))
            .await
            .map_err(|e| map_redis_error("failed to read expiry index", e))?;

        let mut purged = 0;
        for id in candidates {
            match self.delete_with_bound(&id, Some(cutoff_ms)).await {
                Ok(true) => purged += 1,
                Ok(false) => trace!(id = %id, "skipped purge candidate"),
                Err(e) => {
                    warn!(id = %id, error = %e, "failed to purge expired link");
                    return Err(e);
                }
            }
        }
        Ok(purged)
    }
}
