use std::mem;

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::grid::Grid;
use crate::kernel::relax_planes;

// シングルスレッド版（比較用の基準実装）
pub fn jacobi_sweeps(config: &SolverConfig, source: &[f64]) -> Result<Grid, SolverError> {
    config.validate(source.len())?;
    let n = config.n;
    let delta2 = config.delta * config.delta;

    let mut current = Grid::try_zeros(n)?;
    let mut next = Grid::try_zeros(n)?;

    for _ in 0..config.iterations {
        relax_planes(&current.data, source, n, delta2, 0..n, &mut next.data);
        mem::swap(&mut current.data, &mut next.data);
    }

    Ok(current)
}
