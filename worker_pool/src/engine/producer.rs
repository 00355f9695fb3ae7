// Producer - タスク投入機能

use super::pool::Pool;
use crate::core::{EventLogger, PoolConfig, PoolResult, Task, TaskTransform};
use std::sync::Arc;

/// Producer: タスクを順に投入し、最後にタスクキューを閉じる
///
/// 投入に失敗しても必ずキューを閉じてから最初のエラーを返す。
/// 閉じないとワーカーが終了せず、Collector が終端を観測できない。
pub fn spawn_producer<C, T, L>(
    pool: Arc<Pool<C, T, L>>,
    tasks: Vec<Task>,
) -> tokio::task::JoinHandle<PoolResult<usize>>
where
    C: PoolConfig + 'static,
    T: TaskTransform + 'static,
    L: EventLogger + 'static,
{
    tokio::spawn(async move {
        let mut submitted = 0;
        for task in tasks {
            if let Err(error) = pool.submit(task).await {
                let _ = pool.close_tasks().await;
                return Err(error);
            }
            submitted += 1;
        }
        // 送信側をドロップしてチャンネル終了シグナル
        pool.close_tasks().await?;
        Ok(submitted)
    })
}
