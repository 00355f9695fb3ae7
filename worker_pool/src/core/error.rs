// Custom error types for the worker pool
// プール操作とタスク変換のエラー型定義

use super::types::{PoolState, TaskId};
use std::time::Duration;
use thiserror::Error;

/// プール操作のエラー型
///
/// キュー操作の違反は呼び出し元へ同期的に返す。タスク単位の失敗は
/// [`TransformError`] として結果ストリームに流れ、ここには現れない。
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("設定エラー: {message}")]
    Configuration { message: String },

    #[error("タスクキューは既に閉じられています (task_id={task_id})")]
    ClosedQueue { task_id: TaskId },

    #[error("タスクIDが重複しています: {task_id}")]
    DuplicateTaskId { task_id: TaskId },

    #[error("プールが開始されていません")]
    NotStarted,

    #[error("プールは既に開始されています (state={state})")]
    AlreadyStarted { state: PoolState },

    #[error("close_tasksは既に呼ばれています (state={state})")]
    TasksAlreadyClosed { state: PoolState },

    #[error("タスクキューがまだ開いています (state={state})")]
    TasksStillOpen { state: PoolState },

    #[error("結果の待機がタイムアウトしました: {timeout:?}")]
    DrainTimeout { timeout: Duration },

    #[error("プールはキャンセルされました")]
    Cancelled,

    #[error("ワーカーが全て終了しているため投入できません (task_id={task_id})")]
    WorkersExited { task_id: TaskId },

    #[error("{failed}個のワーカーが異常終了しました")]
    WorkersFailed { failed: usize },

    #[error("タスクエラー: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl PoolError {
    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::Task { source }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration { .. } => ErrorSeverity::High,
            Self::ClosedQueue { .. }
            | Self::DuplicateTaskId { .. }
            | Self::NotStarted
            | Self::AlreadyStarted { .. }
            | Self::TasksAlreadyClosed { .. }
            | Self::TasksStillOpen { .. }
            | Self::WorkersExited { .. } => ErrorSeverity::Medium,
            Self::DrainTimeout { .. } | Self::Task { .. } | Self::WorkersFailed { .. } => {
                ErrorSeverity::High
            }
            Self::Cancelled => ErrorSeverity::Low,
        }
    }

    /// リトライで回復可能かどうかを判定
    ///
    /// ライフサイクル違反はプログラミングエラーなので回復不能。
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Configuration { .. }
            | Self::ClosedQueue { .. }
            | Self::NotStarted
            | Self::AlreadyStarted { .. }
            | Self::TasksAlreadyClosed { .. }
            | Self::TasksStillOpen { .. } => false,
            Self::DuplicateTaskId { .. } => true,
            Self::DrainTimeout { .. } => true,
            Self::Cancelled => false,
            Self::Task { .. } | Self::WorkersExited { .. } | Self::WorkersFailed { .. } => false,
        }
    }
}

impl From<tokio::task::JoinError> for PoolError {
    fn from(error: tokio::task::JoinError) -> Self {
        PoolError::Task { source: error }
    }
}

/// タスク変換の失敗（該当タスクの結果にだけ影響する）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("オーバーフロー: value={value}")]
    Overflow { value: i64 },

    #[error("入力値が不正です: value={value} - {reason}")]
    InvalidInput { value: i64, reason: String },

    #[error("変換処理がパニックしました: {message}")]
    Panicked { message: String },
}

impl TransformError {
    pub fn invalid_input(value: i64, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            value,
            reason: reason.into(),
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// プール操作の結果型
pub type PoolResult<T> = std::result::Result<T, PoolError>;
