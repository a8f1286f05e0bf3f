use std::io::{self, Write};

use crate::error::SolverError;

pub const DEFAULT_N: usize = 5; // 立方体の一辺のセル数
pub const DEFAULT_ITERATIONS: usize = 10; // スイープ回数
pub const DEFAULT_THREADS: usize = 1;
pub const DEFAULT_DELTA: f64 = 1.0; // グリッド間隔

/// (i, j, k) を行優先のフラットなオフセットに変換する
///
/// `0 <= i, j, k < n` のみ有効。範囲外アクセスは呼び出し側のバグ。
#[inline(always)]
pub fn tensor_idx(i: usize, j: usize, k: usize, n: usize) -> usize {
    debug_assert!(i < n && j < n && k < n, "({i}, {j}, {k}) outside {n}^3 grid");
    n * n * i + n * j + k
}

/// n×n×n の立方体上のスカラー場
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub n: usize,
    pub data: Vec<f64>,
}

impl Grid {
    /// 0で初期化したグリッドを確保する。確保できない場合はエラー
    pub fn try_zeros(n: usize) -> Result<Self, SolverError> {
        Ok(Grid {
            n,
            data: alloc_cells(cube(n)?)?,
        })
    }

    /// 立方体の中心 (n³/2) に単位インパルスを置いたソース項
    pub fn impulse(n: usize) -> Result<Self, SolverError> {
        let mut grid = Grid::try_zeros(n)?;
        let centre = grid.data.len() / 2;
        if let Some(cell) = grid.data.get_mut(centre) {
            *cell = 1.0;
        }
        Ok(grid)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[tensor_idx(i, j, k, self.n)]
    }

    /// 中央の i = n/2 平面を取り出す。`slice[x][y] = field[n/2, y, x]`
    pub fn middle_slice(&self) -> Vec<Vec<f64>> {
        let i = self.n / 2;
        (0..self.n)
            .map(|x| (0..self.n).map(|y| self.get(i, y, x)).collect())
            .collect()
    }

    // 中央平面を小数点以下5桁で書き出す
    pub fn write_middle_slice<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in self.middle_slice() {
            for value in row {
                write!(out, "{:.5} ", value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

pub(crate) fn cube(n: usize) -> Result<usize, SolverError> {
    n.checked_mul(n)
        .and_then(|nn| nn.checked_mul(n))
        .ok_or(SolverError::Allocation {
            cells: usize::MAX,
            bytes: usize::MAX,
        })
}

/// `cells` 個の 0.0 を持つバッファ。失敗時は要求サイズを報告する
pub(crate) fn alloc_cells(cells: usize) -> Result<Vec<f64>, SolverError> {
    let bytes = cells.saturating_mul(std::mem::size_of::<f64>());
    let mut data = Vec::new();
    data.try_reserve_exact(cells)
        .map_err(|_| SolverError::Allocation { cells, bytes })?;
    data.resize(cells, 0.0);
    Ok(data)
}
