// 設定管理の具象実装

use crate::core::PoolConfig;
use std::time::Duration;

/// 既定のキュー容量
const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultPoolConfig {
    worker_count: usize,
    task_queue_capacity: usize,
    result_queue_capacity: usize,
    drain_timeout: Option<Duration>,
}

impl DefaultPoolConfig {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            task_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            result_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            drain_timeout: None,
        }
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_task_queue_capacity(mut self, capacity: usize) -> Self {
        self.task_queue_capacity = capacity;
        self
    }

    pub fn with_result_queue_capacity(mut self, capacity: usize) -> Self {
        self.result_queue_capacity = capacity;
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.drain_timeout = timeout;
        self
    }
}

impl Default for DefaultPoolConfig {
    fn default() -> Self {
        Self::new(num_cpus::get().max(1))
    }
}

impl PoolConfig for DefaultPoolConfig {
    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn task_queue_capacity(&self) -> usize {
        self.task_queue_capacity
    }

    fn result_queue_capacity(&self) -> usize {
        self.result_queue_capacity
    }

    fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout
    }
}
