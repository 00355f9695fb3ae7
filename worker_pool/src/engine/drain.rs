// Drain - 結果キューを読み出す遅延ストリーム

use crate::core::{PoolError, PoolResult, TaskResult};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

/// 結果キューが閉じた時点で終わる、有限で再開できないストリーム
///
/// 終端に達した後や、2回目以降の `drain` で得たものは常に空。
#[derive(Debug)]
pub struct ResultStream {
    inner: Option<ReceiverStream<TaskResult>>,
}

impl ResultStream {
    pub(crate) fn new(receiver: tokio::sync::mpsc::Receiver<TaskResult>) -> Self {
        Self {
            inner: Some(ReceiverStream::new(receiver)),
        }
    }

    /// 既に終端に達したストリーム
    pub(crate) fn exhausted() -> Self {
        Self { inner: None }
    }

    /// 終端に達したかどうか
    pub fn is_exhausted(&self) -> bool {
        self.inner.is_none()
    }

    /// 期限付きで次の結果を待つ
    ///
    /// # Errors
    ///
    /// `timeout` 以内に結果もクローズも観測できなければ `DrainTimeout`。
    pub async fn next_within(&mut self, timeout: Duration) -> PoolResult<Option<TaskResult>> {
        tokio::time::timeout(timeout, self.next())
            .await
            .map_err(|_| PoolError::DrainTimeout { timeout })
    }
}

impl Stream for ResultStream {
    type Item = TaskResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };
        let polled = Pin::new(inner).poll_next(cx);
        if let Poll::Ready(None) = polled {
            this.inner = None;
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Some(inner) => inner.size_hint(),
            None => (0, Some(0)),
        }
    }
}
