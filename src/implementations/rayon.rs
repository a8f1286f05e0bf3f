use rayon::prelude::*;

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::grid::Grid;
use crate::kernel::relax_planes;

// 書き込み先を i 平面単位で分割し、ロックなしで並列計算する
// スレッド数は rayon のグローバルプールに従う（config.threads は使わない）
pub fn rayon_sweeps(config: &SolverConfig, source: &[f64]) -> Result<Grid, SolverError> {
    config.validate(source.len())?;
    let n = config.n;
    let plane = n * n;
    let delta2 = config.delta * config.delta;

    let mut current = Grid::try_zeros(n)?;
    let mut next = Grid::try_zeros(n)?;

    for _ in 0..config.iterations {
        let src = &current.data;
        next.data
            .par_chunks_mut(plane) // i 平面ごとに分割
            .enumerate()
            .for_each(|(i, dst_plane)| {
                relax_planes(src, source, n, delta2, i..i + 1, dst_plane);
            });

        std::mem::swap(&mut current.data, &mut next.data);
    }

    Ok(current)
}
