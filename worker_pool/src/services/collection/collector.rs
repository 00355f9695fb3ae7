// Collector - 結果収集機能

use crate::core::{log_event, EventLogger, PoolError, PoolResult, TaskResult};
use std::time::Duration;
use tokio::time::Instant;
use tokio_stream::{Stream, StreamExt};

/// 収集済みの結果と集計
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollectedResults {
    pub results: Vec<TaskResult>,
    pub succeeded: usize,
    pub failed: usize,
}

impl CollectedResults {
    fn push(&mut self, result: TaskResult) {
        if result.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Collector: ストリームが閉じるまで結果を読み出す
///
/// 到着順は保証されないため、そのままの順で保持する。`deadline` を
/// 指定した場合は収集全体の期限として扱う。
pub async fn collect_results<S, L>(
    mut results: S,
    logger: &L,
    deadline: Option<Duration>,
) -> PoolResult<CollectedResults>
where
    S: Stream<Item = TaskResult> + Unpin,
    L: EventLogger + ?Sized,
{
    let expires_at = deadline.map(|timeout| (Instant::now() + timeout, timeout));
    let mut collected = CollectedResults::default();

    loop {
        let next = match expires_at {
            Some((at, timeout)) => tokio::time::timeout_at(at, results.next())
                .await
                .map_err(|_| PoolError::DrainTimeout { timeout })?,
            None => results.next().await,
        };
        let Some(result) = next else {
            break;
        };

        log_event(
            logger,
            "result collected",
            &crate::event_fields! {
                "task_id" => result.id(),
                "worker_id" => result.worker_id(),
                "success" => result.is_success(),
            },
        );
        collected.push(result);
    }

    Ok(collected)
}
