use std::ops::Range;

use crate::grid::tensor_idx;

/// 1軸分の隣接セルを `v` に1項ずつ加算する
///
/// 面上では存在しない外側セルの代わりに、内側の隣接セルを2倍して使う（Neumann反射）。
#[inline(always)]
fn accumulate_axis(v: &mut f64, pos: usize, last: usize, at: impl Fn(usize) -> f64) {
    if pos == 0 {
        *v += 2.0 * at(1);
    } else if pos == last {
        *v += 2.0 * at(last - 1);
    } else {
        *v += at(pos - 1);
        *v += at(pos + 1);
    }
}

/// セル (i, j, k) の新しい値
///
/// `(6近傍の和 - delta² * source) / 6`。近傍はすべて `current` から読む（Jacobi法）。
/// 和は i-, i+, j-, j+, k-, k+ の順に左から加算する。
/// 辺と頂点では軸ごとに独立して反射則が適用される。
#[inline(always)]
pub fn relax_cell(
    current: &[f64],
    source: &[f64],
    n: usize,
    delta2: f64,
    i: usize,
    j: usize,
    k: usize,
) -> f64 {
    let last = n - 1;
    let mut v = 0.0;
    accumulate_axis(&mut v, i, last, |x| current[tensor_idx(x, j, k, n)]);
    accumulate_axis(&mut v, j, last, |y| current[tensor_idx(i, y, k, n)]);
    accumulate_axis(&mut v, k, last, |z| current[tensor_idx(i, j, z, n)]);
    v -= delta2 * source[tensor_idx(i, j, k, n)];
    v / 6.0
}

/// i 平面の範囲 `planes` を計算し `dst` に書き込む
///
/// `dst` は `planes` に対応する部分スライス（長さ `planes.len() * n * n`）。
pub fn relax_planes(
    current: &[f64],
    source: &[f64],
    n: usize,
    delta2: f64,
    planes: Range<usize>,
    dst: &mut [f64],
) {
    let plane = n * n;
    debug_assert_eq!(dst.len(), planes.len() * plane);

    for (local, i) in planes.enumerate() {
        let dst_plane = &mut dst[local * plane..(local + 1) * plane];
        for j in 0..n {
            let row = &mut dst_plane[j * n..(j + 1) * n];
            for (k, cell) in row.iter_mut().enumerate() {
                *cell = relax_cell(current, source, n, delta2, i, j, k);
            }
        }
    }
}
