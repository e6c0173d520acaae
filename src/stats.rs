//! Descriptive statistics over samples.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn mean(&self) -> Option<f64>;
    fn median(&self) -> Option<f64>;
    fn variance(&self) -> Option<f64>;
    fn std_dev(&self) -> Option<f64>;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.sum() / self.len() as f64)
        }
    }

    fn median(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let mut sorted = self.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Population variance.
    fn variance(&self) -> Option<f64> {
        let mean = self.mean()?;
        let sum_sq = self.iter().map(|&value| (value - mean).powi(2)).sum::<f64>();
        Some(sum_sq / self.len() as f64)
    }

    fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }
}

/// Rounds to one decimal place.
#[inline]
pub fn round_1dp(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[inline]
pub fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamps `value` to `[min, max]`, the lower bound taking precedence should they cross.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    f64::max(min, f64::min(max, value))
}
