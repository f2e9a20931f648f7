/// Linear-interpolation percentile over an ascending slice.
///
/// With `k = (n - 1) * p / 100`, returns `v[k]` when `k` is integral and otherwise
/// interpolates between `v[floor(k)]` and `v[ceil(k)]`. `p` is clamped to `[0, 100]`.
/// Returns `None` only for an empty slice.
///
/// The slice must already be sorted ascending. It is not sorted here: unsorted input is
/// interpolated by position and gives a meaningless result.
pub fn percentile(sorted: &[u64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
    let k = (sorted.len() - 1) as f64 * (p / 100.0);
    let lo = k.floor();
    let hi = k.ceil();
    if lo == hi {
        return Some(sorted[k as usize] as f64);
    }
    let lower = sorted[lo as usize] as f64;
    let upper = sorted[hi as usize] as f64;
    Some(lower * (hi - k) + upper * (k - lo))
}
