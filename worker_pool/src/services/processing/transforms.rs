// 組み込みの変換関数

use crate::core::{Task, TaskTransform, TransformError};
use async_trait::async_trait;
use std::time::Duration;

/// 値を2乗する基準の変換関数
#[derive(Debug, Default, Clone, Copy)]
pub struct Square;

#[async_trait]
impl TaskTransform for Square {
    async fn apply(&self, task: &Task) -> Result<i64, TransformError> {
        task.value
            .checked_mul(task.value)
            .ok_or(TransformError::Overflow { value: task.value })
    }
}

/// クロージャを変換関数として使うアダプタ
#[derive(Debug, Clone)]
pub struct FnTransform<F>(F);

pub fn transform_fn<F>(f: F) -> FnTransform<F>
where
    F: Fn(i64) -> Result<i64, TransformError> + Send + Sync,
{
    FnTransform(f)
}

#[async_trait]
impl<F> TaskTransform for FnTransform<F>
where
    F: Fn(i64) -> Result<i64, TransformError> + Send + Sync,
{
    async fn apply(&self, task: &Task) -> Result<i64, TransformError> {
        (self.0)(task.value)
    }
}

/// 一定時間待ってから内側の変換関数を呼ぶ（処理時間の模擬）
#[derive(Debug, Clone)]
pub struct Delayed<T> {
    inner: T,
    delay: Duration,
}

impl<T> Delayed<T> {
    pub fn new(inner: T, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl<T: TaskTransform> TaskTransform for Delayed<T> {
    async fn apply(&self, task: &Task) -> Result<i64, TransformError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.apply(task).await
    }
}
