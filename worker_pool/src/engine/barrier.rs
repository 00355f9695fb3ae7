// Join Barrier - 全ワーカー終了の検知と結果キューのクローズ

use super::lifecycle::PoolLifecycle;
use crate::core::{log_event, EventLogger, PoolState, TaskResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// 結果キューを閉じる唯一の場所
///
/// プール側が一次送信ハンドルを保持し、各ワーカーには [`WorkerGuard`] 経由で
/// クローンを渡す。カウンタが0になった時点で一次ハンドルを破棄し、
/// 結果キューが閉じる。
pub struct JoinBarrier<L: EventLogger> {
    remaining: AtomicUsize,
    primary: Mutex<Option<mpsc::Sender<TaskResult>>>,
    lifecycle: Arc<PoolLifecycle>,
    logger: Arc<L>,
}

impl<L: EventLogger> JoinBarrier<L> {
    pub fn new(
        result_tx: mpsc::Sender<TaskResult>,
        lifecycle: Arc<PoolLifecycle>,
        logger: Arc<L>,
    ) -> Arc<Self> {
        Arc::new(Self {
            remaining: AtomicUsize::new(0),
            primary: Mutex::new(Some(result_tx)),
            lifecycle,
            logger,
        })
    }

    /// ワーカーを登録してガードを発行する
    ///
    /// 全ワーカーの登録はどのワーカーを起動するよりも前に済ませること。
    pub fn register(self: &Arc<Self>, worker_id: usize) -> WorkerGuard<L> {
        self.remaining.fetch_add(1, Ordering::AcqRel);
        WorkerGuard {
            worker_id,
            sender: self.primary.lock().clone(),
            barrier: Arc::clone(self),
        }
    }

    fn arrive(&self, worker_id: usize) {
        let previous = self.remaining.fetch_sub(1, Ordering::AcqRel);
        log_event(
            self.logger.as_ref(),
            "worker stopped",
            &crate::event_fields! {
                "worker_id" => worker_id,
                "remaining" => previous.saturating_sub(1),
            },
        );
        if previous == 1 {
            self.close_results();
        }
    }

    fn close_results(&self) {
        let mut primary = self.primary.lock();
        self.lifecycle.advance_through(PoolState::AllWorkersJoined);
        // 受信側が終端を見る時点で状態は必ず ResultsClosed
        self.lifecycle.advance_through(PoolState::ResultsClosed);
        drop(primary.take());
        drop(primary);

        log_event(self.logger.as_ref(), "result queue closed", &crate::event_fields! {});
    }
}

/// ワーカー1つ分の結果送信ハンドル
///
/// Drop時に自身の送信ハンドルを先に破棄してからバリアへ到着を通知する。
/// パニックによる巻き戻しでも同じ順序で実行される。
pub struct WorkerGuard<L: EventLogger> {
    worker_id: usize,
    sender: Option<mpsc::Sender<TaskResult>>,
    barrier: Arc<JoinBarrier<L>>,
}

impl<L: EventLogger> WorkerGuard<L> {
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// 結果キューへ送信（満杯なら待機）。受信側が居なければfalse
    pub async fn emit(&self, result: TaskResult) -> bool {
        match &self.sender {
            Some(tx) => tx.send(result).await.is_ok(),
            None => false,
        }
    }
}

impl<L: EventLogger> Drop for WorkerGuard<L> {
    fn drop(&mut self) {
        self.sender.take();
        self.barrier.arrive(self.worker_id);
    }
}
