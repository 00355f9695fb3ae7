use crate::cli::{Cli, LogFormat};
use crate::core::{EventLogger, PipelineSummary, Task, TaskResult};
use crate::engine::WorkerPoolPipeline;
use crate::services::{
    DefaultPoolConfig, Delayed, JsonEventLogger, NoOpEventLogger, Square, TracingEventLogger,
};
use anyhow::Result;
use std::io::{self, Write};
use std::time::Duration;

impl From<&Cli> for DefaultPoolConfig {
    fn from(cli: &Cli) -> Self {
        DefaultPoolConfig::new(cli.workers)
            .with_task_queue_capacity(cli.task_capacity)
            .with_result_queue_capacity(cli.result_capacity)
            .with_drain_timeout(cli.drain_timeout_secs.map(Duration::from_secs))
    }
}

/// 値 1..=N のタスク列（IDは値と同じ）
pub fn numbered_tasks(count: u64) -> Vec<Task> {
    (1..=count).map(|id| Task::new(id, id as i64)).collect()
}

fn event_logger(format: LogFormat) -> Box<dyn EventLogger> {
    match format {
        LogFormat::Tracing => Box::new(TracingEventLogger::new()),
        LogFormat::Json => Box::new(JsonEventLogger::stdout()),
        LogFormat::Off => Box::new(NoOpEventLogger::new()),
    }
}

/// タスク列を二乗し、結果を標準出力へ書き出す
pub async fn execute_run(cli: &Cli) -> Result<PipelineSummary> {
    let config = DefaultPoolConfig::from(cli);
    let transform = Delayed::new(Square, Duration::from_millis(cli.work_delay_ms));
    let pipeline = WorkerPoolPipeline::new(config, transform, event_logger(cli.log_format));

    let outcome = pipeline.execute(numbered_tasks(cli.tasks)).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_results(&mut out, &outcome.collected.results, cli.json_results)?;
    out.flush()?;

    Ok(outcome.summary)
}

/// 結果を到着順に1行ずつ書き出す
pub fn write_results<W: Write>(out: &mut W, results: &[TaskResult], json: bool) -> Result<()> {
    for result in results {
        if json {
            serde_json::to_writer(&mut *out, result)?;
            writeln!(out)?;
            continue;
        }
        match result {
            TaskResult::Success { id, value, .. } => writeln!(out, "Task {id}: square = {value}")?,
            TaskResult::Failed { id, error, .. } => writeln!(out, "Task {id}: failed ({error})")?,
        }
    }
    Ok(())
}
