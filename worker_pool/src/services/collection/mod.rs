// 結果収集機能
// 結果ストリームを最後まで読み出して集計する

pub mod collector;

// 公開API
pub use collector::{collect_results, CollectedResults};
