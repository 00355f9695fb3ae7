use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "worker_pool")]
#[command(about = "Square a batch of integers on a fixed pool of async workers")]
#[command(version)]
pub struct Cli {
    /// Number of workers pulling from the task queue
    #[arg(short, long, env = "WORKER_POOL_WORKERS", default_value_t = 3)]
    pub workers: usize,

    /// Number of tasks to submit (values 1..=N)
    #[arg(short, long, env = "WORKER_POOL_TASKS", default_value_t = 5)]
    pub tasks: u64,

    /// Bound of the task queue (0 is promoted to 1)
    #[arg(long, env = "WORKER_POOL_TASK_CAPACITY", default_value_t = 10)]
    pub task_capacity: usize,

    /// Bound of the result queue (0 is promoted to 1)
    #[arg(long, env = "WORKER_POOL_RESULT_CAPACITY", default_value_t = 10)]
    pub result_capacity: usize,

    /// Simulated work per task in milliseconds
    #[arg(long, env = "WORKER_POOL_WORK_DELAY_MS", default_value_t = 100)]
    pub work_delay_ms: u64,

    /// Give up collecting results after this many seconds
    #[arg(long, env = "WORKER_POOL_DRAIN_TIMEOUT_SECS")]
    pub drain_timeout_secs: Option<u64>,

    /// Where pool events are logged
    #[arg(short = 'l', long, value_enum, default_value = "tracing")]
    pub log_format: LogFormat,

    /// Print each result as a JSON line instead of plain text
    #[arg(long)]
    pub json_results: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// tracing-subscriber (filtered by RUST_LOG)
    Tracing,
    /// One JSON object per event on stdout
    Json,
    /// Discard pool events
    Off,
}
