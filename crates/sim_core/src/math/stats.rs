//! Sample statistics.
//!
//! Percentiles use linear interpolation between order statistics (the index
//! is `p * (n - 1)`), which is stated here explicitly because truncation and
//! interpolation disagree at the margin and the difference is observable in
//! tail metrics. Spearman correlation uses average ranks for ties.

/// Sample mean. Zero for an empty slice.
#[inline]
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Unbiased sample standard deviation. Zero for fewer than two points.
pub fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}

/// Standard error of the mean.
#[inline]
pub fn std_error(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    sample_std(xs) / (xs.len() as f64).sqrt()
}

/// Percentile of a sorted sample via linear interpolation between order
/// statistics.
///
/// `p` is clamped to `[0, 1]`. For a sample of size `n` the (possibly
/// fractional) index is `p * (n - 1)`; the result interpolates linearly
/// between the neighbouring order statistics.
///
/// # Panics
///
/// Does not panic; an empty slice returns zero.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let p = p.clamp(0.0, 1.0);
            let pos = p * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let frac = pos - lo as f64;
            if lo + 1 >= n {
                sorted[n - 1]
            } else {
                sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
            }
        }
    }
}

/// Average ranks (1-based) of a sample, with ties sharing their mean rank.
pub fn average_ranks(xs: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| xs[a].partial_cmp(&xs[b]).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && xs[order[j + 1]] == xs[order[i]] {
            j += 1;
        }
        // Tied block [i, j] shares the mean of its 1-based ranks.
        let shared = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = shared;
        }
        i = j + 1;
    }
    ranks
}

/// Pearson correlation of two equal-length samples.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let mx = mean(xs);
    let my = mean(ys);
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for i in 0..n {
        let dx = xs[i] - mx;
        let dy = ys[i] - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    if vx == 0.0 || vy == 0.0 {
        return 0.0;
    }
    cov / (vx.sqrt() * vy.sqrt())
}

/// Spearman rank correlation: Pearson correlation of average ranks.
pub fn spearman(xs: &[f64], ys: &[f64]) -> f64 {
    pearson(&average_ranks(xs), &average_ranks(ys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn mean_and_std() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&xs), 5.0);
        assert_relative_eq!(sample_std(&xs), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(std_error(&xs), sample_std(&xs) / 8.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        // index = 0.05 * 3 = 0.15 -> 10 + 0.15 * 10
        assert_relative_eq!(percentile_sorted(&sorted, 0.05), 11.5, epsilon = 1e-12);
        assert_relative_eq!(percentile_sorted(&sorted, 0.0), 10.0);
        assert_relative_eq!(percentile_sorted(&sorted, 1.0), 40.0);
        assert_relative_eq!(percentile_sorted(&sorted, 0.5), 25.0);
    }

    #[test]
    fn percentile_differs_from_truncation() {
        // With truncation the 5th percentile of 1..=100 would be exactly the
        // 5th order statistic; interpolation lands between the 5th and 6th.
        let sorted: Vec<f64> = (1..=100).map(f64::from).collect();
        let p5 = percentile_sorted(&sorted, 0.05);
        assert_relative_eq!(p5, 5.95, epsilon = 1e-12);
    }

    #[test]
    fn percentile_degenerate_sizes() {
        assert_eq!(percentile_sorted(&[], 0.5), 0.0);
        assert_eq!(percentile_sorted(&[3.0], 0.05), 3.0);
    }

    #[test]
    fn ranks_average_ties() {
        let ranks = average_ranks(&[1.0, 2.0, 2.0, 3.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn spearman_detects_monotone_relation() {
        let xs: Vec<f64> = (0..50).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x * x).collect();
        assert_relative_eq!(spearman(&xs, &ys), 1.0, epsilon = 1e-12);
        let neg: Vec<f64> = xs.iter().map(|x| -x).collect();
        assert_relative_eq!(spearman(&xs, &neg), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn spearman_of_constant_is_zero() {
        let xs = [1.0, 1.0, 1.0, 1.0];
        let ys = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(spearman(&xs, &ys), 0.0);
    }

    proptest! {
        #[test]
        fn percentile_is_monotone_in_p(
            mut xs in proptest::collection::vec(-1e6f64..1e6, 2..200),
            p1 in 0.0f64..1.0,
            p2 in 0.0f64..1.0,
        ) {
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let (lo, hi) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
            prop_assert!(percentile_sorted(&xs, lo) <= percentile_sorted(&xs, hi));
        }

        #[test]
        fn percentile_stays_within_sample_range(
            mut xs in proptest::collection::vec(-1e6f64..1e6, 1..200),
            p in 0.0f64..1.0,
        ) {
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let v = percentile_sorted(&xs, p);
            prop_assert!(v >= xs[0] && v <= xs[xs.len() - 1]);
        }

        #[test]
        fn spearman_is_bounded(
            xs in proptest::collection::vec(-1e3f64..1e3, 3..100),
            ys in proptest::collection::vec(-1e3f64..1e3, 3..100),
        ) {
            let n = xs.len().min(ys.len());
            let rho = spearman(&xs[..n], &ys[..n]);
            prop_assert!((-1.0..=1.0).contains(&rho) || rho == 0.0);
        }
    }
}
