use thiserror::Error;

/// ソルバーの構築・実行時に発生するエラー
#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    /// スレッド数が0
    #[error("thread count must be at least 1 (got {0})")]
    InvalidThreadCount(usize),

    /// 各軸に内部の隣接セルが1つ以上必要
    #[error("grid size must be at least 3 (got {0})")]
    GridTooSmall(usize),

    #[error("source length {actual} does not match grid of {expected} cells")]
    SourceLengthMismatch { expected: usize, actual: usize },

    #[error("grid spacing must be finite and positive (got {0})")]
    InvalidDelta(f64),

    /// バッファ確保に失敗（リトライなし）
    #[error("ran out of memory allocating {cells} cells ({bytes} bytes)")]
    Allocation { cells: usize, bytes: usize },

    /// OS がワーカースレッドの起動を拒否した
    #[error("failed to spawn worker thread {thread}: {reason}")]
    ThreadSpawn { thread: usize, reason: String },

    #[error("worker thread {thread} panicked during a sweep")]
    WorkerPanicked { thread: usize },

    /// 他のワーカーの失敗によりバリアが中断された
    #[error("sweep barrier was aborted")]
    BarrierAborted,
}
