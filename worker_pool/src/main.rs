use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use worker_pool::{
    cli::{execute_run, Cli, LogFormat},
    PoolError,
};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_format == LogFormat::Tracing {
        init_tracing();
    }

    match execute_run(&cli).await {
        Ok(summary) => {
            if !cli.json_results {
                eprintln!(
                    "{}件完了（成功: {}, 失敗: {}, ワーカー: {}, {}ms）",
                    summary.total_tasks,
                    summary.succeeded,
                    summary.failed,
                    summary.worker_count,
                    summary.total_processing_time_ms,
                );
            }
            Ok(())
        }
        Err(error) => {
            match error.downcast_ref::<PoolError>() {
                Some(pool_error) => eprintln!(
                    "❌ エラー [{}]: {pool_error}",
                    pool_error.severity().as_str()
                ),
                None => eprintln!("❌ エラー: {error:#}"),
            }
            std::process::exit(1);
        }
    }
}
