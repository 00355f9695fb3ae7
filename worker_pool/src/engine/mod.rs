// エンジン層 - 並列処理とオーケストレーション
// サービス層を組み合わせてワーカープールとパイプラインを提供

mod barrier;
pub mod drain;
mod lifecycle;
mod pipeline;
pub mod pool;
pub mod producer;
mod worker; // Pool内部でのみ使用

// 公開API - 主要エンジンクラス
pub use drain::ResultStream;
pub use lifecycle::PoolLifecycle;
pub use pipeline::{PipelineOutcome, WorkerPoolPipeline};
pub use pool::Pool;
pub use producer::spawn_producer;
