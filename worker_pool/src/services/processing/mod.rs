// タスク処理機能
// 単一タスクへの変換関数の適用と、組み込みの変換関数

pub mod task;
pub mod transforms;

// 公開API
pub use task::process_single_task;
pub use transforms::{transform_fn, Delayed, FnTransform, Square};
