// Lifecycle - プール状態の単調な遷移管理

use crate::core::PoolState;
use std::sync::atomic::{AtomicU8, Ordering};

/// プールの状態機械
///
/// 遷移は `current -> current.next()` のCASだけで行うため、
/// 状態の逆戻りや飛び越しは起こらない。
#[derive(Debug)]
pub struct PoolLifecycle {
    state: AtomicU8,
}

impl PoolLifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(PoolState::Created as u8),
        }
    }

    /// 現在の状態
    pub fn current(&self) -> PoolState {
        // 格納される値は常にPoolState由来
        PoolState::from_u8(self.state.load(Ordering::Acquire)).unwrap_or(PoolState::Terminated)
    }

    /// `from` から直後の状態へ1段進める
    ///
    /// 現在の状態が `from` でなければ何もせず、その時点の状態を返す。
    pub fn advance(&self, from: PoolState) -> Result<PoolState, PoolState> {
        let Some(to) = from.next() else {
            return Err(from);
        };
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| to)
            .map_err(|actual| PoolState::from_u8(actual).unwrap_or(PoolState::Terminated))
    }

    /// `target` に達するまで1段ずつ進める
    ///
    /// 既に `target` 以降なら何もしない。戻り値は到達後の状態。
    pub fn advance_through(&self, target: PoolState) -> PoolState {
        loop {
            let current = self.current();
            if current >= target {
                return current;
            }
            // 他スレッドとの競合で失敗しても、再読込して続行する
            let _ = self.advance(current);
        }
    }
}

impl Default for PoolLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
