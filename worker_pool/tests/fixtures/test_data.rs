// テストデータ生成

use std::collections::HashMap;
use worker_pool::{Task, TaskId, TaskResult};

/// 値 1..=N のタスク列（IDは値と同じ）
pub fn numbered_tasks(count: u64) -> Vec<Task> {
    (1..=count).map(|id| Task::new(id, id as i64)).collect()
}

/// 値の列からIDを1始まりで振ったタスク列
pub fn tasks_from_values(values: &[i64]) -> Vec<Task> {
    values
        .iter()
        .zip(1u64..)
        .map(|(&value, id)| Task::new(id, value))
        .collect()
}

/// 成功結果をID→値の対応にする（失敗は含めない）
pub fn values_by_id(results: &[TaskResult]) -> HashMap<TaskId, i64> {
    results
        .iter()
        .filter_map(|result| result.value().map(|value| (result.id(), value)))
        .collect()
}
