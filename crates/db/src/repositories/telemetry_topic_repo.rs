//! Repository for the durable telemetry topic tables
//! (`telemetry_messages` and `consumer_offsets`).

use gpuwatch_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::telemetry_message::TelemetryMessageRow;

/// Column list for `telemetry_messages` SELECT queries.
const COLUMNS: &str = "id, topic, message_key, payload, published_at";

/// First key of the advisory lock serialising appends; the second is the
/// topic name's hash.
const APPEND_LOCK_CLASS: i32 = 0x6770_7477;

/// Provides append, read, and offset operations for topic messages.
pub struct TelemetryTopicRepo;

impl TelemetryTopicRepo {
    /// Append a message and return its offset.
    pub async fn append(
        pool: &PgPool,
        topic: &str,
        key: &str,
        payload: &[u8],
    ) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id = Self::append_in(&mut *tx, topic, key, payload).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Append a message inside the caller's transaction.
    ///
    /// Takes a per-topic advisory lock held until the transaction ends, so
    /// appends to one topic become visible in offset order. Readers that
    /// scan for `id > position` would otherwise skip a lower id committed
    /// after a higher one. Must be called inside a transaction.
    pub async fn append_in(
        conn: &mut PgConnection,
        topic: &str,
        key: &str,
        payload: &[u8],
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
            .bind(APPEND_LOCK_CLASS)
            .bind(topic)
            .execute(&mut *conn)
            .await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO telemetry_messages (topic, message_key, payload) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(topic)
        .bind(key)
        .bind(payload)
        .fetch_one(&mut *conn)
        .await?;
        Ok(id)
    }

    /// The first message on `topic` with an offset greater than `after`.
    pub async fn next_after(
        pool: &PgPool,
        topic: &str,
        after: DbId,
    ) -> Result<Option<TelemetryMessageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM telemetry_messages \
             WHERE topic = $1 AND id > $2 \
             ORDER BY id \
             LIMIT 1"
        );
        sqlx::query_as::<_, TelemetryMessageRow>(&query)
            .bind(topic)
            .bind(after)
            .fetch_optional(pool)
            .await
    }

    /// Highest offset currently on `topic`, or 0 when it is empty.
    pub async fn head_offset(pool: &PgPool, topic: &str) -> Result<DbId, sqlx::Error> {
        let (head,): (DbId,) =
            sqlx::query_as("SELECT COALESCE(MAX(id), 0) FROM telemetry_messages WHERE topic = $1")
                .bind(topic)
                .fetch_one(pool)
                .await?;
        Ok(head)
    }

    /// Last offset committed by a consumer group, if any.
    pub async fn committed_offset(
        pool: &PgPool,
        group: &str,
        topic: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT committed_offset FROM consumer_offsets \
             WHERE consumer_group = $1 AND topic = $2",
        )
        .bind(group)
        .bind(topic)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(offset,)| offset))
    }

    /// Record `offset` as the group's last processed message.
    pub async fn commit(
        pool: &PgPool,
        group: &str,
        topic: &str,
        offset: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO consumer_offsets (consumer_group, topic, committed_offset) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (consumer_group, topic) DO UPDATE \
             SET committed_offset = GREATEST(consumer_offsets.committed_offset, EXCLUDED.committed_offset), \
                 updated_at = NOW()",
        )
        .bind(group)
        .bind(topic)
        .bind(offset)
        .execute(pool)
        .await?;
        Ok(())
    }
}
