// イベント監視機能
// タスク投入・処理・結果送出の観測用ログ

pub mod implementations;

// 公開API
pub use implementations::{JsonEventLogger, NoOpEventLogger, TracingEventLogger};
