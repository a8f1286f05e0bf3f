use std::io;
use std::ops::Range;
use std::thread;
use std::time::{Duration, Instant};

use log::{Level, debug, log};

use crate::barrier::SweepBarrier;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::grid::{Grid, alloc_cells};
use crate::kernel::relax_planes;
use crate::partition::row_range;

/*
  バリア同期版ポアソンソルバー（Neumann境界）

  - 2本のバッファ（スロット0/1）を確保し、current/next の役割はバリアの世代フラグで決まる
  - 各スレッドは i 方向の担当区間だけを next に書き込む（書き込み先が互いに素）
  - current は全スレッドから読み取り専用で共有する
  - スイープ末尾のバリアで最後に到着したスレッドが世代を反転 = バッファの入れ替え
*/

// スロットへの生ポインタ。スレッド間で共有するためのラッパー
#[derive(Clone, Copy)]
struct SlotPtr {
    data: *mut f64,
    len: usize,
}

// SAFETY: 読み書きの排他はバリアの世代ハンドオフで保証する（下記 sweep 参照）
unsafe impl Send for SlotPtr {}
unsafe impl Sync for SlotPtr {}

impl SlotPtr {
    fn new(slot: &mut [f64]) -> Self {
        SlotPtr {
            data: slot.as_mut_ptr(),
            len: slot.len(),
        }
    }

    /// # Safety
    /// 返したスライスが生きている間、同じスロットへの書き込みがないこと
    unsafe fn as_slice<'a>(self) -> &'a [f64] {
        unsafe { std::slice::from_raw_parts(self.data, self.len) }
    }

    /// # Safety
    /// `range` が範囲内で、他スレッドが同じ区間に同時にアクセスしないこと
    unsafe fn as_mut_range<'a>(self, range: Range<usize>) -> &'a mut [f64] {
        debug_assert!(range.start <= range.end && range.end <= self.len);
        unsafe { std::slice::from_raw_parts_mut(self.data.add(range.start), range.len()) }
    }
}

// 世代 false: スロット0を読みスロット1へ書く / true: その逆
#[inline(always)]
fn select_slots(generation: bool, slots: [SlotPtr; 2]) -> (SlotPtr, SlotPtr) {
    if generation {
        (slots[1], slots[0])
    } else {
        (slots[0], slots[1])
    }
}

/// 実行時間の内訳
#[derive(Clone, Debug, Default)]
pub struct SolveStats {
    pub elapsed: Duration,
    /// スレッド番号順
    pub thread_elapsed: Vec<Duration>,
}

/// スレッド+バリアによるソルバー本体
#[derive(Debug)]
pub struct PoissonSolver<'a> {
    config: SolverConfig,
    source: &'a [f64],
}

impl<'a> PoissonSolver<'a> {
    /// 設定とソース長を検証してから構築する。ワーカーはまだ起動しない
    pub fn new(config: SolverConfig, source: &'a [f64]) -> Result<Self, SolverError> {
        config.validate(source.len())?;
        debug!(
            "solver: n={} iterations={} threads={} delta={}",
            config.n, config.iterations, config.threads, config.delta
        );
        Ok(PoissonSolver { config, source })
    }

    pub fn solve(&self) -> Result<Grid, SolverError> {
        self.solve_with_stats().map(|(grid, _)| grid)
    }

    pub fn solve_with_stats(&self) -> Result<(Grid, SolveStats), SolverError> {
        let SolverConfig {
            n,
            iterations,
            threads,
            delta,
            verbose,
        } = self.config;
        let cells = self.config.cells()?;
        let plane = n * n;
        let delta2 = delta * delta;
        let source = self.source;

        let mut slots = [alloc_cells(cells)?, alloc_cells(cells)?];
        let ptrs = [SlotPtr::new(&mut slots[0]), SlotPtr::new(&mut slots[1])];
        let barrier = SweepBarrier::new(threads);

        for t in 0..threads {
            debug!("thread {}: planes {:?}", t, row_range(n, threads, t));
        }

        let start = Instant::now();
        let thread_elapsed = run_sweeps(threads, iterations, &barrier, |thread, generation| {
            let planes = row_range(n, threads, thread);
            let (src, dst) = select_slots(generation, ptrs);
            // SAFETY: この世代では src は全スレッドから読み取りのみ。
            // dst への書き込み区間は row_range によって互いに素。
            // 参照はバリア到着前にすべて破棄され、次の世代の書き込みとは重ならない。
            let current = unsafe { src.as_slice() };
            let next = unsafe { dst.as_mut_range(planes.start * plane..planes.end * plane) };
            relax_planes(current, source, n, delta2, planes, next);
        })?;
        let elapsed = start.elapsed();

        let level = if verbose { Level::Info } else { Level::Debug };
        for (t, d) in thread_elapsed.iter().enumerate() {
            log!(level, "Thread {}: {}", t, d.as_micros());
        }
        log!(level, "Duration: {}", elapsed.as_micros());

        // 最終世代の current が結果。もう一方はここで解放する
        let [a, b] = slots;
        let data = if barrier.generation() { b } else { a };

        Ok((
            Grid { n, data },
            SolveStats {
                elapsed,
                thread_elapsed,
            },
        ))
    }
}

// パニックしたワーカーがバリアを中断し、残りのスレッドを解放する
struct AbortOnPanic<'a>(&'a SweepBarrier);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

/// `threads` 本のワーカーで `iterations` 回のスイープを実行する
///
/// `sweep(thread, generation)` は各スイープの計算部分。各スイープ後にバリアで合流する。
/// 戻り値はスレッドごとの所要時間。スレッドを起動できなければ `ThreadSpawn`、
/// パニックしたワーカーがあれば `WorkerPanicked`。
pub(crate) fn run_sweeps<F>(
    threads: usize,
    iterations: usize,
    barrier: &SweepBarrier,
    sweep: F,
) -> Result<Vec<Duration>, SolverError>
where
    F: Fn(usize, bool) + Sync,
{
    run_sweeps_with(threads, iterations, barrier, sweep, |_| Ok(()))
}

// `before_spawn(worker)` がエラーを返すと、そのワーカーの起動失敗として扱う
fn run_sweeps_with<F, G>(
    threads: usize,
    iterations: usize,
    barrier: &SweepBarrier,
    sweep: F,
    before_spawn: G,
) -> Result<Vec<Duration>, SolverError>
where
    F: Fn(usize, bool) + Sync,
    G: Fn(usize) -> io::Result<()>,
{
    let sweep = &sweep;
    let (spawn_error, outcomes) = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(threads);
        let mut spawn_error = None;

        for worker in 0..threads {
            let spawned = before_spawn(worker).and_then(|()| {
                thread::Builder::new()
                    .name(format!("poisson-{worker}"))
                    .spawn_scoped(scope, move || -> Result<Duration, SolverError> {
                        let _guard = AbortOnPanic(barrier);
                        let started = Instant::now();
                        let mut generation = false;
                        for _ in 0..iterations {
                            sweep(worker, generation);
                            generation = barrier.wait()?;
                        }
                        Ok(started.elapsed())
                    })
            });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    // 起動済みのワーカーはバリアで待っているので、中断して解放する
                    barrier.abort();
                    spawn_error = Some(SolverError::ThreadSpawn {
                        thread: worker,
                        reason: err.to_string(),
                    });
                    break;
                }
            }
        }

        let outcomes: Vec<Result<Duration, SolverError>> = handles
            .into_iter()
            .enumerate()
            .map(|(worker, handle)| match handle.join() {
                Ok(outcome) => outcome,
                Err(_) => Err(SolverError::WorkerPanicked { thread: worker }),
            })
            .collect();
        (spawn_error, outcomes)
    });

    if let Some(err) = spawn_error {
        return Err(err);
    }

    // 中断されたスレッドより、原因のパニックを優先して報告する
    if let Some(thread) = outcomes.iter().find_map(|outcome| match outcome {
        Err(SolverError::WorkerPanicked { thread }) => Some(*thread),
        _ => None,
    }) {
        return Err(SolverError::WorkerPanicked { thread });
    }
    outcomes.into_iter().collect()
}
