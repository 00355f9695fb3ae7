// エンドツーエンド統合テスト
use crate::fixtures::{numbered_tasks, tasks_from_values, values_by_id, RecordingEventLogger};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use worker_pool::{
    collect_results, spawn_producer, transform_fn, DefaultPoolConfig, Delayed, EventLogger,
    NoOpEventLogger, Pool, PoolState, Square, TaskResult, TransformError, WorkerPoolPipeline,
};

#[tokio::test]
async fn test_three_workers_square_five_tasks() {
    let pool = Pool::new(DefaultPoolConfig::new(3), Square, NoOpEventLogger::new());
    pool.start().await.unwrap();

    for task in numbered_tasks(5) {
        pool.submit(task).await.unwrap();
    }
    pool.close_tasks().await.unwrap();

    let results: Vec<TaskResult> = pool.drain().unwrap().collect().await;
    pool.join().await.unwrap();

    // 到着順は問わず、多重集合として比較する
    let expected: HashMap<u64, i64> = [(1, 1), (2, 4), (3, 9), (4, 16), (5, 25)]
        .into_iter()
        .collect();
    assert_eq!(results.len(), 5);
    assert_eq!(values_by_id(&results), expected);
}

#[tokio::test]
async fn test_zero_tasks_drain_terminates() {
    let pool = Pool::new(DefaultPoolConfig::new(3), Square, NoOpEventLogger::new());
    pool.start().await.unwrap();
    pool.close_tasks().await.unwrap();

    let results = tokio::time::timeout(
        Duration::from_secs(5),
        pool.drain().unwrap().collect::<Vec<_>>(),
    )
    .await
    .expect("drain must not hang with no tasks");

    assert!(results.is_empty());
    let report = pool.join().await.unwrap();
    assert_eq!(report.tasks_submitted, 0);
    assert_eq!(pool.state(), PoolState::Terminated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_completeness_and_no_duplication() {
    for worker_count in [1, 2, 4, 8] {
        let pool = Arc::new(Pool::new(
            DefaultPoolConfig::new(worker_count)
                .with_task_queue_capacity(4)
                .with_result_queue_capacity(4),
            Square,
            NoOpEventLogger::new(),
        ));
        pool.start().await.unwrap();

        let results = pool.drain().unwrap();
        let producer = spawn_producer(Arc::clone(&pool), numbered_tasks(200));
        let collected: Vec<_> = results.collect().await;
        assert_eq!(producer.await.unwrap().unwrap(), 200);

        let ids: HashSet<_> = collected.iter().map(TaskResult::id).collect();
        assert_eq!(collected.len(), 200, "workers={worker_count}");
        assert_eq!(ids.len(), 200, "duplicate result with workers={worker_count}");
        assert_eq!(ids, (1..=200).collect::<HashSet<_>>());

        for result in &collected {
            let id = result.id() as i64;
            assert_eq!(result.value(), Some(id * id));
        }

        let report = pool.join().await.unwrap();
        assert_eq!(report.workers.len(), worker_count);
        assert_eq!(report.total_processed(), 200);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_work_spreads_across_workers() {
    let pipeline = WorkerPoolPipeline::new(
        DefaultPoolConfig::new(3),
        Delayed::new(Square, Duration::from_millis(20)),
        NoOpEventLogger::new(),
    );

    let outcome = pipeline.execute(numbered_tasks(12)).await.unwrap();

    let workers: HashSet<_> = outcome
        .collected
        .results
        .iter()
        .map(TaskResult::worker_id)
        .collect();
    assert!(workers.len() > 1);
    assert!(workers.iter().all(|id| (1..=3).contains(id)));
}

#[tokio::test]
async fn test_transform_failure_is_isolated() {
    let halve_even = transform_fn(|value| {
        if value % 2 == 0 {
            Ok(value / 2)
        } else {
            Err(TransformError::invalid_input(value, "奇数"))
        }
    });
    let pipeline =
        WorkerPoolPipeline::new(DefaultPoolConfig::new(2), halve_even, NoOpEventLogger::new());

    let outcome = pipeline
        .execute(tasks_from_values(&[2, 3, 4, 5, 6]))
        .await
        .unwrap();

    assert_eq!(outcome.collected.len(), 5);
    assert_eq!(outcome.summary.succeeded, 3);
    assert_eq!(outcome.summary.failed, 2);

    let failed: HashSet<_> = outcome
        .collected
        .results
        .iter()
        .filter(|result| !result.is_success())
        .map(TaskResult::id)
        .collect();
    assert_eq!(failed, HashSet::from([2, 4]));
    assert_eq!(outcome.report.total_failed(), 2);
}

#[tokio::test]
async fn test_panicking_transform_becomes_failed_result() {
    let explosive = transform_fn(|value| {
        if value == 3 {
            panic!("boom");
        }
        Ok(value)
    });
    let pipeline =
        WorkerPoolPipeline::new(DefaultPoolConfig::new(1), explosive, NoOpEventLogger::new());

    let outcome = pipeline.execute(numbered_tasks(4)).await.unwrap();

    // ワーカーはパニック後も残りのタスクを処理する
    assert_eq!(outcome.collected.len(), 4);
    assert_eq!(outcome.summary.failed, 1);
    assert!(matches!(
        outcome.collected.results.iter().find(|r| r.id() == 3),
        Some(TaskResult::Failed { .. })
    ));
}

#[tokio::test]
async fn test_event_sequence_is_logged() {
    let logger = Arc::new(RecordingEventLogger::new());
    let pipeline = WorkerPoolPipeline::new(
        DefaultPoolConfig::new(2),
        Square,
        Arc::clone(&logger),
    );

    pipeline.execute(numbered_tasks(3)).await.unwrap();

    assert_eq!(logger.count("pool started"), 1);
    assert_eq!(logger.count("task submitted"), 3);
    assert_eq!(logger.count("task received"), 3);
    assert_eq!(logger.count("result emitted"), 3);
    assert_eq!(logger.count("result collected"), 3);
    assert_eq!(logger.count("task queue closed"), 1);
    assert_eq!(logger.count("worker stopped"), 2);
    assert_eq!(logger.count("result queue closed"), 1);
    assert_eq!(logger.count("pipeline completed"), 1);

    // 結果キューのクローズは最後のワーカー終了の後
    let closed_at = logger.position("result queue closed").unwrap();
    let stopped: Vec<_> = logger
        .events()
        .iter()
        .enumerate()
        .filter(|(_, event)| event.message == "worker stopped")
        .map(|(index, _)| index)
        .collect();
    assert!(stopped.iter().all(|&index| index < closed_at));

    let completed = &logger.events_named("pipeline completed")[0];
    assert_eq!(completed.fields["total_tasks"], 3);

    let received = &logger.events_named("task received")[0];
    assert!(received.fields.contains_key("worker_id"));
    assert!(received.fields.contains_key("timestamp_ms"));
}

#[tokio::test]
async fn test_collector_with_shared_logger() {
    let logger: Arc<dyn EventLogger> = Arc::new(NoOpEventLogger::new());
    let pool = Pool::new(DefaultPoolConfig::new(2), Square, NoOpEventLogger::new());
    pool.start().await.unwrap();

    for task in tasks_from_values(&[-3, 0, 7]) {
        pool.submit(task).await.unwrap();
    }
    pool.close_tasks().await.unwrap();

    let collected = collect_results(pool.drain().unwrap(), logger.as_ref(), None)
        .await
        .unwrap();
    let values: HashSet<_> = collected.results.iter().filter_map(TaskResult::value).collect();
    assert_eq!(values, HashSet::from([9, 0, 49]));
    pool.join().await.unwrap();
}
