// Pool - ワーカープール本体
// キューの生成・ワーカー起動・タスク受付・結果の受け渡しを管理

use super::barrier::JoinBarrier;
use super::drain::ResultStream;
use super::lifecycle::PoolLifecycle;
use super::worker::spawn_workers;
use crate::core::{
    log_event, EventLogger, PoolConfig, PoolError, PoolReport, PoolResult, PoolState, Task,
    TaskId, TaskResult, TaskTransform, WorkerReport,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// タスク受付側の状態（送信ハンドルと投入済みID）
#[derive(Default)]
struct TaskIntake {
    sender: Option<mpsc::Sender<Task>>,
    submitted: HashSet<TaskId>,
}

impl TaskIntake {
    /// キャンセル済みなら送信ハンドルを破棄する
    fn close_if_cancelled(&mut self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            self.sender = None;
        }
        cancel.is_cancelled()
    }
}

/// 結果キュー受信側の受け渡し状態
enum ResultSlot {
    NotStarted,
    Ready(mpsc::Receiver<TaskResult>),
    Taken,
}

/// `join` の結果（2回目以降はこれを返す）
enum JoinOutcome {
    Pending,
    Joined(PoolReport),
    Failed { failed: usize },
}

/// 固定数ワーカーによるファンアウト／ファンインのプール
///
/// タスクキューと結果キューを所有し、両方のクローズを決定する。
/// 結果キューを閉じるのは全ワーカー終了を検知した [`JoinBarrier`] だけ。
///
/// Producer と Collector を別タスクで動かせるよう、操作は全て `&self` で行う。
pub struct Pool<C, T, L>
where
    C: PoolConfig,
    T: TaskTransform + 'static,
    L: EventLogger + 'static,
{
    config: C,
    transform: Arc<T>,
    logger: Arc<L>,
    lifecycle: Arc<PoolLifecycle>,
    intake: tokio::sync::Mutex<TaskIntake>,
    results: parking_lot::Mutex<ResultSlot>,
    handles: parking_lot::Mutex<Vec<JoinHandle<WorkerReport>>>,
    joined: tokio::sync::Mutex<JoinOutcome>,
    cancel: CancellationToken,
}

impl<C, T, L> Pool<C, T, L>
where
    C: PoolConfig,
    T: TaskTransform + 'static,
    L: EventLogger + 'static,
{
    /// 新しいプールを作成（キューとワーカーは `start` で用意する）
    pub fn new(config: C, transform: T, logger: L) -> Self {
        Self {
            config,
            transform: Arc::new(transform),
            logger: Arc::new(logger),
            lifecycle: Arc::new(PoolLifecycle::new()),
            intake: tokio::sync::Mutex::new(TaskIntake::default()),
            results: parking_lot::Mutex::new(ResultSlot::NotStarted),
            handles: parking_lot::Mutex::new(Vec::new()),
            joined: tokio::sync::Mutex::new(JoinOutcome::Pending),
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn logger(&self) -> &Arc<L> {
        &self.logger
    }

    /// 現在のライフサイクル状態
    pub fn state(&self) -> PoolState {
        self.lifecycle.current()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// キューを確保し、`worker_count` 個のワーカーを起動する
    ///
    /// # Errors
    ///
    /// - `worker_count` が0なら `Configuration`（状態は `Created` のまま）
    /// - 2回目以降の呼び出しは `AlreadyStarted`
    /// - 起動前にキャンセル済みなら `Cancelled`
    pub async fn start(&self) -> PoolResult<()> {
        let worker_count = self.config.worker_count();
        if worker_count == 0 {
            return Err(PoolError::configuration(
                "worker_countは1以上である必要があります",
            ));
        }
        if self.cancel.is_cancelled() {
            return Err(PoolError::Cancelled);
        }

        let mut intake = self.intake.lock().await;
        self.lifecycle
            .advance(PoolState::Created)
            .map_err(|state| PoolError::AlreadyStarted { state })?;

        let task_capacity = self.queue_capacity("task", self.config.task_queue_capacity());
        let result_capacity = self.queue_capacity("result", self.config.result_queue_capacity());

        // Producer-Workerチャンネルと Worker-Collectorチャンネル
        let (task_tx, task_rx) = mpsc::channel::<Task>(task_capacity);
        let (result_tx, result_rx) = mpsc::channel::<TaskResult>(result_capacity);

        let barrier = JoinBarrier::new(
            result_tx,
            Arc::clone(&self.lifecycle),
            Arc::clone(&self.logger),
        );
        let handles = spawn_workers(
            Arc::clone(&self.transform),
            Arc::clone(&self.logger),
            task_rx,
            &barrier,
            worker_count,
            &self.cancel,
        );

        intake.sender = Some(task_tx);
        intake.close_if_cancelled(&self.cancel);
        *self.results.lock() = ResultSlot::Ready(result_rx);
        *self.handles.lock() = handles;

        log_event(
            self.logger.as_ref(),
            "pool started",
            &crate::event_fields! {
                "worker_count" => worker_count,
                "task_queue_capacity" => task_capacity,
                "result_queue_capacity" => result_capacity,
            },
        );
        Ok(())
    }

    /// tokioのチャンネルは容量0を取れないため、最小の1に切り上げる
    fn queue_capacity(&self, queue: &'static str, requested: usize) -> usize {
        if requested > 0 {
            return requested;
        }
        log_event(
            self.logger.as_ref(),
            "queue capacity promoted",
            &crate::event_fields! {
                "queue" => queue,
                "requested" => requested,
                "capacity" => 1usize,
            },
        );
        1
    }

    /// タスクを1件投入する（キューが満杯なら空くまで待機）
    ///
    /// # Errors
    ///
    /// - `start` 前は `NotStarted`
    /// - `close_tasks` 後は `ClosedQueue`（キューには触れない）
    /// - 同じIDを再投入すると `DuplicateTaskId`
    /// - 待機中にキャンセルされると `Cancelled`
    /// - 結果の読み手が居なくなりワーカーが全て終了していれば `WorkersExited`
    pub async fn submit(&self, task: Task) -> PoolResult<()> {
        let mut intake = self.intake.lock().await;

        if intake.close_if_cancelled(&self.cancel) {
            return Err(PoolError::Cancelled);
        }
        if self.lifecycle.current() == PoolState::Created {
            return Err(PoolError::NotStarted);
        }
        let Some(sender) = intake.sender.clone() else {
            return Err(PoolError::ClosedQueue { task_id: task.id });
        };
        // 送信ハンドルが残ったまま先へ進むのはワーカーが全滅した場合だけ
        if self.lifecycle.current() != PoolState::Started {
            return Err(PoolError::WorkersExited { task_id: task.id });
        }
        if intake.submitted.contains(&task.id) {
            return Err(PoolError::DuplicateTaskId { task_id: task.id });
        }

        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                intake.sender = None;
                return Err(PoolError::Cancelled);
            }
            sent = sender.send(task) => sent,
        };
        sent.map_err(|_| PoolError::WorkersExited { task_id: task.id })?;
        intake.submitted.insert(task.id);
        intake.close_if_cancelled(&self.cancel);

        log_event(
            self.logger.as_ref(),
            "task submitted",
            &crate::event_fields! {
                "task_id" => task.id,
                "value" => task.value,
            },
        );
        Ok(())
    }

    /// タスクキューを閉じる（これ以上タスクは来ない）
    ///
    /// # Errors
    ///
    /// `start` 前は `NotStarted`、2回目以降は `TasksAlreadyClosed`。
    pub async fn close_tasks(&self) -> PoolResult<()> {
        let mut intake = self.intake.lock().await;

        let advanced = self.lifecycle.advance(PoolState::Started);
        // 唯一の送信ハンドルを破棄するとワーカーは残りを処理して終了する
        drop(intake.sender.take());
        advanced.map_err(|state| match state {
            PoolState::Created => PoolError::NotStarted,
            state => PoolError::TasksAlreadyClosed { state },
        })?;

        log_event(
            self.logger.as_ref(),
            "task queue closed",
            &crate::event_fields! {
                "tasks_submitted" => intake.submitted.len(),
            },
        );
        Ok(())
    }

    /// 結果キューを読み出すストリームを取得する
    ///
    /// 最初の呼び出しだけが結果を受け取り、以降は空のストリームを返す。
    ///
    /// # Errors
    ///
    /// `start` 前は `NotStarted`。
    pub fn drain(&self) -> PoolResult<ResultStream> {
        let mut slot = self.results.lock();
        match std::mem::replace(&mut *slot, ResultSlot::Taken) {
            ResultSlot::Ready(receiver) => Ok(ResultStream::new(receiver)),
            ResultSlot::Taken => Ok(ResultStream::exhausted()),
            ResultSlot::NotStarted => {
                *slot = ResultSlot::NotStarted;
                Err(PoolError::NotStarted)
            }
        }
    }

    /// プールをキャンセルする
    ///
    /// タスク受付を閉じ、ワーカーは未処理のタスクを残して終了する。
    /// 結果キューは通常通りバリアが閉じるので `drain` は終端に達する。
    pub fn cancel(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        // 受付中ならタスクキューのクローズへ進める
        let _ = self.lifecycle.advance(PoolState::Started);
        // ロック中の submit / start は解放前に自分で破棄する
        if let Ok(mut intake) = self.intake.try_lock() {
            intake.sender = None;
        }

        log_event(
            self.logger.as_ref(),
            "pool cancelled",
            &crate::event_fields! {
                "state" => self.lifecycle.current().as_str(),
            },
        );
    }

    /// 全ワーカーの終了を待ち、実績を返す
    ///
    /// 結果キューが満杯のままだとワーカーが終われないため、
    /// `drain` で読み出しながら、または読み切ってから呼ぶこと。
    /// 2回目以降は1回目と同じ結果を返す。
    ///
    /// # Errors
    ///
    /// - `close_tasks` / `cancel` 前は `TasksStillOpen`（`start` 前は `NotStarted`）
    /// - ワーカータスクが異常終了した場合は最初の `Task`、以降の呼び出しでは `WorkersFailed`
    pub async fn join(&self) -> PoolResult<PoolReport> {
        let state = self.lifecycle.current();
        if state < PoolState::TasksClosing {
            return Err(match state {
                PoolState::Created => PoolError::NotStarted,
                state => PoolError::TasksStillOpen { state },
            });
        }

        let mut outcome = self.joined.lock().await;
        match &*outcome {
            JoinOutcome::Joined(report) => return Ok(report.clone()),
            JoinOutcome::Failed { failed } => {
                return Err(PoolError::WorkersFailed { failed: *failed })
            }
            JoinOutcome::Pending => {}
        }

        // 途中で失敗しても残りのハンドルは全て待つ
        let handles = std::mem::take(&mut *self.handles.lock());
        let mut workers = Vec::with_capacity(handles.len());
        let mut first_error = None;
        let mut failed = 0;
        for handle in handles {
            match handle.await {
                Ok(report) => workers.push(report),
                Err(error) => {
                    failed += 1;
                    first_error.get_or_insert(error);
                }
            }
        }

        if let Some(error) = first_error {
            *outcome = JoinOutcome::Failed { failed };
            log_event(
                self.logger.as_ref(),
                "worker failed",
                &crate::event_fields! {
                    "failed" => failed,
                    "joined" => workers.len(),
                },
            );
            return Err(PoolError::task(error));
        }

        // 全ワーカーの終了後はバリアが結果キューを閉じている
        let _ = self.lifecycle.advance(PoolState::ResultsClosed);

        let tasks_submitted = {
            let mut intake = self.intake.lock().await;
            intake.close_if_cancelled(&self.cancel);
            intake.submitted.len()
        };
        let report = PoolReport {
            tasks_submitted,
            workers,
        };
        *outcome = JoinOutcome::Joined(report.clone());
        Ok(report)
    }
}
