// Task - 単一タスク処理機能

use crate::core::{Task, TaskResult, TaskTransform, TransformError};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// 単一タスクの処理
///
/// 変換関数のエラーやパニックは `TaskResult::Failed` に変換し、
/// ワーカーを止めない。
pub async fn process_single_task<T>(transform: &T, task: Task, worker_id: usize) -> TaskResult
where
    T: TaskTransform + ?Sized,
{
    let outcome = AssertUnwindSafe(transform.apply(&task))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(value)) => TaskResult::Success {
            id: task.id,
            value,
            worker_id,
        },
        Ok(Err(error)) => TaskResult::Failed {
            id: task.id,
            error: error.to_string(),
            worker_id,
        },
        Err(payload) => TaskResult::Failed {
            id: task.id,
            error: TransformError::Panicked {
                message: panic_message(payload.as_ref()),
            }
            .to_string(),
            worker_id,
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
