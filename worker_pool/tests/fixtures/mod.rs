// テストユーティリティとモック実装
// 統合テスト共通のロガーとタスク生成ヘルパー

pub mod mocks;
pub mod test_data;

// 公開API
pub use mocks::*;
pub use test_data::*;
