// Pipeline - Producer / Worker Pool / Collector のファンアウト・ファンイン
// プールの起動から結果収集、終了までのオーケストレーション

use super::{pool::Pool, producer::spawn_producer};
use crate::{
    core::{
        log_event, EventLogger, PipelineSummary, PoolConfig, PoolReport, PoolResult, Task,
        TaskTransform,
    },
    services::{collect_results, CollectedResults},
};
use std::sync::Arc;
use std::time::Instant;

/// パイプライン1回分の実行結果
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub collected: CollectedResults,
    pub report: PoolReport,
    pub summary: PipelineSummary,
}

/// 責任が明確に分離されたパイプライン
pub struct WorkerPoolPipeline<C, T, L> {
    config: C,
    transform: T,
    logger: L,
}

impl<C, T, L> WorkerPoolPipeline<C, T, L>
where
    C: PoolConfig + 'static,
    T: TaskTransform + 'static,
    L: EventLogger + 'static,
{
    /// 新しいパイプラインを作成
    pub fn new(config: C, transform: T, logger: L) -> Self {
        Self {
            config,
            transform,
            logger,
        }
    }

    /// タスク列を処理し、全結果を収集する
    ///
    /// 結果の順序はワーカーのスケジューリング次第で、投入順とは限らない。
    /// 収集期限（`drain_timeout`）を超えた場合はプールをキャンセルして
    /// `DrainTimeout` を返す。
    pub async fn execute(self, tasks: Vec<Task>) -> PoolResult<PipelineOutcome> {
        let start_time = Instant::now();
        let total_tasks = tasks.len();
        let worker_count = self.config.worker_count();
        let drain_timeout = self.config.drain_timeout();

        let pool = Arc::new(Pool::new(self.config, self.transform, self.logger));
        pool.start().await?;

        // Producer起動
        let producer_handle = spawn_producer(Arc::clone(&pool), tasks);

        // Collector: 結果キューが閉じるまで読み出す
        let results = pool.drain()?;
        let collected = match collect_results(results, pool.logger().as_ref(), drain_timeout).await
        {
            Ok(collected) => collected,
            Err(error) => {
                pool.cancel();
                return Err(error);
            }
        };

        // Producer完了を待機
        producer_handle.await??;

        // Worker完了を待機
        let report = pool.join().await?;

        log_event(
            pool.logger().as_ref(),
            "pipeline completed",
            &crate::event_fields! {
                "total_tasks" => total_tasks,
                "succeeded" => collected.succeeded,
                "failed" => collected.failed,
            },
        );

        let total_time_ms = start_time.elapsed().as_millis() as u64;
        let average_time_per_task_ms = if total_tasks > 0 {
            total_time_ms as f64 / total_tasks as f64
        } else {
            0.0
        };

        let summary = PipelineSummary {
            total_tasks,
            succeeded: collected.succeeded,
            failed: collected.failed,
            worker_count,
            total_processing_time_ms: total_time_ms,
            average_time_per_task_ms,
        };

        Ok(PipelineOutcome {
            collected,
            report,
            summary,
        })
    }
}
