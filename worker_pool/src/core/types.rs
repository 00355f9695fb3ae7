// ワーカープールで扱うデータ型定義

use serde::{Deserialize, Serialize};
use std::fmt;

/// タスク識別子（1回のパイプライン実行内で一意）
pub type TaskId = u64;

/// 処理対象の作業単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub value: i64,
}

impl Task {
    pub fn new(id: TaskId, value: i64) -> Self {
        Self { id, value }
    }
}

/// 1つのタスクを処理した結果
///
/// 変換の失敗もデータとして結果ストリームに流す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskResult {
    Success {
        id: TaskId,
        value: i64,
        worker_id: usize,
    },
    Failed {
        id: TaskId,
        error: String,
        worker_id: usize,
    },
}

impl TaskResult {
    /// 元タスクのID
    pub fn id(&self) -> TaskId {
        match self {
            Self::Success { id, .. } | Self::Failed { id, .. } => *id,
        }
    }

    /// 結果を生成したワーカーのID
    pub fn worker_id(&self) -> usize {
        match self {
            Self::Success { worker_id, .. } | Self::Failed { worker_id, .. } => *worker_id,
        }
    }

    /// 成功時の出力値
    pub fn value(&self) -> Option<i64> {
        match self {
            Self::Success { value, .. } => Some(*value),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// プールのライフサイクル状態
///
/// 遷移は単調で、必ず1段ずつ進む。
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoolState {
    Created = 0,
    Started = 1,
    TasksClosing = 2,
    AllWorkersJoined = 3,
    ResultsClosed = 4,
    Terminated = 5,
}

impl PoolState {
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Created),
            1 => Some(Self::Started),
            2 => Some(Self::TasksClosing),
            3 => Some(Self::AllWorkersJoined),
            4 => Some(Self::ResultsClosed),
            5 => Some(Self::Terminated),
            _ => None,
        }
    }

    /// 次の状態（Terminatedの次は無し）
    pub const fn next(self) -> Option<Self> {
        Self::from_u8(self as u8 + 1)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::TasksClosing => "tasks_closing",
            Self::AllWorkersJoined => "all_workers_joined",
            Self::ResultsClosed => "results_closed",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ワーカー1つ分の処理実績
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub processed: usize,
    pub failed: usize,
}

impl WorkerReport {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    /// 結果キューへ送り出した1件を記録
    pub fn record(&mut self, success: bool) {
        self.processed += 1;
        if !success {
            self.failed += 1;
        }
    }
}

/// join完了時のプール全体の実績
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReport {
    pub tasks_submitted: usize,
    pub workers: Vec<WorkerReport>,
}

impl PoolReport {
    /// 全ワーカーが処理したタスク数
    pub fn total_processed(&self) -> usize {
        self.workers.iter().map(|w| w.processed).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.workers.iter().map(|w| w.failed).sum()
    }
}

/// パイプライン実行全体のサマリー
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub total_tasks: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub worker_count: usize,
    pub total_processing_time_ms: u64,
    pub average_time_per_task_ms: f64,
}
