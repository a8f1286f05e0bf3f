//! ノイマン境界条件付き3次元ポアソン方程式の反復ソルバー
//!
//! 立方体グリッド上で Jacobi 反復を固定回数行う。ワーカースレッドは i 方向に
//! 領域分割され、スイープごとに世代フラグ付きバリアで合流してバッファを入れ替える。

pub mod barrier;
pub mod config;
pub mod error;
pub mod grid;
pub mod implementations;
pub mod kernel;
pub mod partition;

pub use config::SolverConfig;
pub use error::SolverError;
pub use grid::{Grid, tensor_idx};
pub use implementations::Engine;
pub use implementations::barrier_parallel::{PoissonSolver, SolveStats};
