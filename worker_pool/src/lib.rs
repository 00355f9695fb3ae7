// worker_pool - 固定数ワーカーによる非同期ファンアウト／ファンイン
//
// Producer がタスクキューへ投入し、ワーカーが結果キューへ書き出し、
// Collector が結果キューの終端まで読み出す。

pub mod cli;
pub mod core;
pub mod engine;
pub mod services;

// 公開API - ライブラリ利用者向けの主要型
pub use crate::core::{
    ErrorSeverity, EventFields, EventLogger, PipelineSummary, PoolConfig, PoolError, PoolReport,
    PoolResult, PoolState, Task, TaskId, TaskResult, TaskTransform, TransformError, WorkerReport,
};
pub use engine::{spawn_producer, PipelineOutcome, Pool, ResultStream, WorkerPoolPipeline};
pub use services::{
    collect_results, transform_fn, CollectedResults, DefaultPoolConfig, Delayed, FnTransform,
    JsonEventLogger, NoOpEventLogger, Square, TracingEventLogger,
};
