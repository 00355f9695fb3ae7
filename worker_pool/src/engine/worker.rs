// Worker - 並列ワーカー機能

use super::barrier::{JoinBarrier, WorkerGuard};
use crate::core::{log_event, EventLogger, Task, TaskTransform, WorkerReport};
use crate::services::process_single_task;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 共有タスクキューの受信側
pub type SharedTaskReceiver = Arc<Mutex<mpsc::Receiver<Task>>>;

/// 単一ワーカー
///
/// タスクキューが閉じて空になるか、キャンセルされるまで処理を続ける。
/// キャンセルはタスク受信と結果送信の両方の待機点で観測する。
pub fn spawn_single_worker<T, L>(
    transform: Arc<T>,
    logger: Arc<L>,
    task_rx: SharedTaskReceiver,
    guard: WorkerGuard<L>,
    cancel: CancellationToken,
) -> JoinHandle<WorkerReport>
where
    T: TaskTransform + ?Sized + 'static,
    L: EventLogger + 'static,
{
    tokio::spawn(async move {
        let worker_id = guard.worker_id();
        let mut report = WorkerReport::new(worker_id);

        loop {
            // 次のタスクを取得
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                task = async { task_rx.lock().await.recv().await } => task,
            };
            let Some(task) = next else {
                break; // キュー終了またはキャンセル
            };

            log_event(
                logger.as_ref(),
                "task received",
                &crate::event_fields! {
                    "worker_id" => worker_id,
                    "task_id" => task.id,
                    "value" => task.value,
                    "timestamp_ms" => chrono::Utc::now().timestamp_millis(),
                },
            );

            let result = process_single_task(transform.as_ref(), task, worker_id).await;
            let task_id = result.id();
            let success = result.is_success();

            // 結果送信（満杯なら待機）
            let delivered = tokio::select! {
                biased;
                _ = cancel.cancelled() => false,
                sent = guard.emit(result) => sent,
            };
            if !delivered {
                break;
            }
            report.record(success);

            log_event(
                logger.as_ref(),
                "result emitted",
                &crate::event_fields! {
                    "worker_id" => worker_id,
                    "task_id" => task_id,
                    "success" => success,
                    "timestamp_ms" => chrono::Utc::now().timestamp_millis(),
                },
            );
        }

        report
    })
}

/// Workers: 固定数のワーカープール
///
/// 全ワーカーをバリアへ登録してから起動するため、早く終わったワーカーが
/// 他のワーカーの登録前に結果キューを閉じることはない。
pub fn spawn_workers<T, L>(
    transform: Arc<T>,
    logger: Arc<L>,
    task_rx: mpsc::Receiver<Task>,
    barrier: &Arc<JoinBarrier<L>>,
    worker_count: usize,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<WorkerReport>>
where
    T: TaskTransform + ?Sized + 'static,
    L: EventLogger + 'static,
{
    let task_rx = Arc::new(Mutex::new(task_rx));
    let guards: Vec<_> = (1..=worker_count)
        .map(|worker_id| barrier.register(worker_id))
        .collect();

    guards
        .into_iter()
        .map(|guard| {
            spawn_single_worker(
                Arc::clone(&transform),
                Arc::clone(&logger),
                Arc::clone(&task_rx),
                guard,
                cancel.clone(),
            )
        })
        .collect()
}
