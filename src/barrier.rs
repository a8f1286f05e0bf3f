use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::SolverError;

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    // スイープ完了ごとに1回だけ反転する。false/true がそのままバッファの役割を表す
    generation: bool,
    aborted: bool,
}

/// 世代フラグ付きの再利用可能バリア
///
/// 最後に到着したスレッドがカウンタをリセットし、世代を反転して全員を起こす。
/// 待機側は「到着時に記録した世代から変わったか」で判定するので、
/// 速いスレッドが次のスイープの待機に入っても起床を取りこぼさない。
#[derive(Debug)]
pub struct SweepBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl SweepBarrier {
    pub fn new(parties: usize) -> Self {
        SweepBarrier {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: false,
                aborted: false,
            }),
            released: Condvar::new(),
        }
    }

    pub fn generation(&self) -> bool {
        self.lock().generation
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    /// 全員が到着するまで待ち、反転後の世代を返す
    ///
    /// `abort()` 済み、または待機中に中断された場合は `BarrierAborted`。
    pub fn wait(&self) -> Result<bool, SolverError> {
        let mut state = self.lock();
        if state.aborted {
            return Err(SolverError::BarrierAborted);
        }

        let seen = state.generation;
        state.arrived += 1;

        if state.arrived == self.parties {
            // 最後の到着者: リセットして世代反転（= current/next の入れ替え）
            state.arrived = 0;
            state.generation = !seen;
            self.released.notify_all();
            return Ok(state.generation);
        }

        let state = self
            .released
            .wait_while(state, |s| s.generation == seen && !s.aborted)
            .unwrap_or_else(PoisonError::into_inner);

        if state.generation == seen {
            Err(SolverError::BarrierAborted)
        } else {
            Ok(state.generation)
        }
    }

    /// 待機中・今後の待機をすべてエラーで解放する
    pub fn abort(&self) {
        let mut state = self.lock();
        state.aborted = true;
        self.released.notify_all();
    }

    // ロック中にパニックする経路はないので、ポイズンは無視して中身を使う
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
