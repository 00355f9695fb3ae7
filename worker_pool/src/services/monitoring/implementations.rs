// イベントログの具象実装

use crate::core::{EventFields, EventLogger};
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};

/// `tracing` へ転送するイベントログ実装
#[derive(Debug, Default, Clone)]
pub struct TracingEventLogger;

impl TracingEventLogger {
    pub fn new() -> Self {
        Self
    }
}

impl EventLogger for TracingEventLogger {
    fn info(&self, message: &str, fields: &EventFields) {
        tracing::info!(target: "worker_pool", fields = %DisplayFields(fields), "{message}");
    }
}

/// `key=value` 形式でフィールドを並べる
struct DisplayFields<'a>(&'a EventFields);

impl fmt::Display for DisplayFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// 1イベント1行のJSONを書き出すイベントログ実装
pub struct JsonEventLogger<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonEventLogger<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonEventLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> EventLogger for JsonEventLogger<W> {
    fn info(&self, message: &str, fields: &EventFields) {
        let mut record = EventFields::new();
        record.insert(
            "time".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        record.insert("level".to_string(), Value::String("INFO".to_string()));
        record.insert("msg".to_string(), Value::String(message.to_string()));
        for (key, value) in fields {
            record.insert(key.clone(), value.clone());
        }

        let mut writer = self.writer.lock();
        // ログ出力の失敗は処理結果に影響させない
        if serde_json::to_writer(&mut *writer, &record).is_ok() {
            let _ = writer.write_all(b"\n");
        }
    }
}

/// 何もしないイベントログ実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpEventLogger;

impl NoOpEventLogger {
    pub fn new() -> Self {
        Self
    }
}

impl EventLogger for NoOpEventLogger {
    fn info(&self, _message: &str, _fields: &EventFields) {
        // 何もしない
    }
}
