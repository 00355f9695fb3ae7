// テスト用のロガー実装
// 期待値を事前に書くmockallと違い、実行後にイベント列を検査する

use parking_lot::Mutex;
use worker_pool::{EventFields, EventLogger};

/// 記録されたイベント1件
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub message: String,
    pub fields: EventFields,
}

/// 受け取ったイベントを全て保持するロガー
#[derive(Debug, Default)]
pub struct RecordingEventLogger {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingEventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// 指定メッセージのイベント
    pub fn events_named(&self, message: &str) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.message == message)
            .cloned()
            .collect()
    }

    pub fn count(&self, message: &str) -> usize {
        self.events_named(message).len()
    }

    /// 記録順での最初の出現位置
    pub fn position(&self, message: &str) -> Option<usize> {
        self.events
            .lock()
            .iter()
            .position(|event| event.message == message)
    }
}

impl EventLogger for RecordingEventLogger {
    fn info(&self, message: &str, fields: &EventFields) {
        self.events.lock().push(RecordedEvent {
            message: message.to_string(),
            fields: fields.clone(),
        });
    }
}

/// 特定タスクの特定イベントでパニックするロガー（それ以外は記録する）
#[derive(Debug)]
pub struct PanickingEventLogger {
    message: &'static str,
    task_id: u64,
    recorded: RecordingEventLogger,
}

impl PanickingEventLogger {
    pub fn new(message: &'static str, task_id: u64) -> Self {
        Self {
            message,
            task_id,
            recorded: RecordingEventLogger::new(),
        }
    }

    pub fn count(&self, message: &str) -> usize {
        self.recorded.count(message)
    }
}

impl EventLogger for PanickingEventLogger {
    fn info(&self, message: &str, fields: &EventFields) {
        if message == self.message && fields["task_id"] == self.task_id {
            panic!("logger failure on task {}", self.task_id);
        }
        self.recorded.info(message, fields);
    }
}
