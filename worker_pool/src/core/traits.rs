// ワーカープールのトレイト定義
// 設定・変換関数・イベントログの抽象化インターフェース

use super::error::TransformError;
use super::types::Task;
use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// プール設定を抽象化するトレイト
#[automock]
pub trait PoolConfig: Send + Sync {
    /// 起動するワーカー数
    fn worker_count(&self) -> usize;

    /// タスクキューの容量
    fn task_queue_capacity(&self) -> usize;

    /// 結果キューの容量
    fn result_queue_capacity(&self) -> usize;

    /// 結果待機の期限（Noneなら無期限）
    fn drain_timeout(&self) -> Option<Duration>;
}

// PoolConfig for Box<dyn PoolConfig>
impl PoolConfig for Box<dyn PoolConfig> {
    fn worker_count(&self) -> usize {
        self.as_ref().worker_count()
    }

    fn task_queue_capacity(&self) -> usize {
        self.as_ref().task_queue_capacity()
    }

    fn result_queue_capacity(&self) -> usize {
        self.as_ref().result_queue_capacity()
    }

    fn drain_timeout(&self) -> Option<Duration> {
        self.as_ref().drain_timeout()
    }
}

/// タスクの値を結果の値へ変換する純粋関数
#[async_trait]
pub trait TaskTransform: Send + Sync {
    async fn apply(&self, task: &Task) -> Result<i64, TransformError>;
}

#[async_trait]
impl TaskTransform for Box<dyn TaskTransform> {
    async fn apply(&self, task: &Task) -> Result<i64, TransformError> {
        self.as_ref().apply(task).await
    }
}

#[async_trait]
impl<T: TaskTransform + ?Sized> TaskTransform for Arc<T> {
    async fn apply(&self, task: &Task) -> Result<i64, TransformError> {
        self.as_ref().apply(task).await
    }
}

/// イベントに付随する構造化フィールド
pub type EventFields = serde_json::Map<String, serde_json::Value>;

/// 注入されるイベントログ
///
/// 観測用途のみで、プールの正しさには関与しない。
#[automock]
pub trait EventLogger: Send + Sync {
    fn info(&self, message: &str, fields: &EventFields);
}

impl EventLogger for Box<dyn EventLogger> {
    fn info(&self, message: &str, fields: &EventFields) {
        self.as_ref().info(message, fields)
    }
}

impl<L: EventLogger + ?Sized> EventLogger for Arc<L> {
    fn info(&self, message: &str, fields: &EventFields) {
        self.as_ref().info(message, fields)
    }
}

/// イベントを記録する（ロガー自身のパニックは呼び出し側へ伝播させない）
pub fn log_event<L: EventLogger + ?Sized>(logger: &L, message: &str, fields: &EventFields) {
    let _ = std::panic::catch_unwind(AssertUnwindSafe(|| logger.info(message, fields)));
}

/// フィールド値をJSONへ変換（変換できない値はnull）
pub fn field_value<V: Serialize>(value: V) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// [`EventFields`] を組み立てる
///
/// ```
/// let fields = worker_pool::event_fields! { "worker_id" => 1, "task_id" => 7u64 };
/// assert_eq!(fields["task_id"], 7);
/// ```
#[macro_export]
macro_rules! event_fields {
    ($($key:literal => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut fields = $crate::core::traits::EventFields::new();
        $(
            fields.insert(
                ::std::string::String::from($key),
                $crate::core::traits::field_value($value),
            );
        )*
        fields
    }};
}
