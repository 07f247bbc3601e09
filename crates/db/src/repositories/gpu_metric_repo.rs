//! Repository for the `gpu_metrics` table (append-only time series).

use gpuwatch_core::telemetry::MetricSample;
use gpuwatch_core::types::Timestamp;
use sqlx::{PgExecutor, PgPool};

use crate::models::metric::{GpuMetric, LatestGpuMetric};

/// Column list for `gpu_metrics` SELECT queries (includes `id` and `created_at`).
const COLUMNS: &str = "\
    id, node_id, gpu_index, temperature_c, power_w, \
    mem_used_mb, mem_total_mb, utilization_pct, clock_mhz, \
    collected_at, created_at";

/// Column list for INSERT statements (excludes auto-generated `id` and `created_at`).
const INSERT_COLUMNS: &str = "\
    node_id, gpu_index, temperature_c, power_w, \
    mem_used_mb, mem_total_mb, utilization_pct, clock_mhz, collected_at";

/// Provides query operations for GPU metrics.
pub struct GpuMetricRepo;

impl GpuMetricRepo {
    /// Append one metric sample.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        sample: &MetricSample,
    ) -> Result<GpuMetric, sqlx::Error> {
        let query = format!(
            "INSERT INTO gpu_metrics ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GpuMetric>(&query)
            .bind(&sample.node_id)
            .bind(sample.gpu_index)
            .bind(sample.temperature_c)
            .bind(sample.power_w)
            .bind(sample.mem_used_mb)
            .bind(sample.mem_total_mb)
            .bind(sample.utilization_pct)
            .bind(sample.clock_mhz)
            .bind(sample.collected_at)
            .fetch_one(executor)
            .await
    }

    /// Most recent samples for a node, newest first.
    pub async fn list_for_node(
        pool: &PgPool,
        node_id: &str,
        limit: i64,
    ) -> Result<Vec<GpuMetric>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM gpu_metrics \
             WHERE node_id = $1 \
             ORDER BY collected_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, GpuMetric>(&query)
            .bind(node_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Latest sample per node + GPU from the `latest_gpu_metrics` view.
    pub async fn get_latest(pool: &PgPool) -> Result<Vec<LatestGpuMetric>, sqlx::Error> {
        let query = "\
            SELECT node_id, gpu_index, temperature_c, power_w, \
                   mem_used_mb, mem_total_mb, utilization_pct, clock_mhz, collected_at \
            FROM latest_gpu_metrics \
            ORDER BY node_id, gpu_index";
        sqlx::query_as::<_, LatestGpuMetric>(query)
            .fetch_all(pool)
            .await
    }

    /// Delete metrics collected before the given cutoff.
    ///
    /// Returns the number of rows deleted.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM gpu_metrics WHERE collected_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
