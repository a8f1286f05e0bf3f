use std::ops::Range;

/// スレッドあたりの i 平面数 (⌈n / threads⌉)
#[inline]
pub fn block_size(n: usize, threads: usize) -> usize {
    n.div_ceil(threads)
}

/// スレッド `thread` が担当する i 方向の半開区間
///
/// 区間は互いに素で、全スレッド分を合わせると `0..n` を覆う。
/// 行よりスレッドが多い場合、後ろのスレッドは空区間になる（バリアには参加する）。
pub fn row_range(n: usize, threads: usize, thread: usize) -> Range<usize> {
    let block = block_size(n, threads);
    let start = (thread * block).min(n);
    let end = ((thread + 1) * block).min(n);
    start..end
}
