use crate::report::CountRange;

/// Logarithmic map from link counts onto a stroke-width interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LogScale {
    /// Fits the domain to the observed counts. Without counts the domain collapses
    /// to a single point and every input maps to the middle of the range.
    pub fn fit(counts: Option<CountRange>, range: [f32; 2]) -> Self {
        let (min, max) = counts.map_or((1, 1), |counts| (counts.min, counts.max));
        let min = min.max(1) as f64;
        let max = (max.max(1) as f64).max(min);

        Self {
            domain: (min, max),
            range: (range[0], range[1]),
        }
    }

    pub fn normalize(&self, count: u64) -> f32 {
        let (min, max) = self.domain;
        let denominator = max.ln() - min.ln();
        if denominator.abs() < f64::EPSILON {
            return 0.5;
        }

        let value = count.max(1) as f64;
        ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
    }

    pub fn apply(&self, count: u64) -> f32 {
        let (low, high) = self.range;
        low + (high - low) * self.normalize(count)
    }
}
