pub mod barrier_parallel;
pub mod rayon;
pub mod single;

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::grid::Grid;

/// 解法の選択。どれも同じカーネルを使うので結果はビット単位で一致する
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Engine {
    /// ワーカースレッド + 世代バリア
    #[default]
    Barrier,
    Single,
    Rayon,
}

impl Engine {
    pub const ALL: [Engine; 3] = [Engine::Barrier, Engine::Single, Engine::Rayon];

    pub fn name(self) -> &'static str {
        match self {
            Engine::Barrier => "barrier",
            Engine::Single => "single",
            Engine::Rayon => "rayon",
        }
    }

    pub fn solve(self, config: &SolverConfig, source: &[f64]) -> Result<Grid, SolverError> {
        match self {
            Engine::Barrier => barrier_parallel::PoissonSolver::new(config.clone(), source)?.solve(),
            Engine::Single => single::jacobi_sweeps(config, source),
            Engine::Rayon => rayon::rayon_sweeps(config, source),
        }
    }
}
