/// Running mean and second moment of one observable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Statistics {
    pub count: usize,
    pub sum: f64,
    pub sum_sq: f64,
}

impl Statistics {
    pub fn update(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        self.sum_sq += v * v;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// ⟨v²⟩.
    pub fn second_moment(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_sq / self.count as f64
    }

    pub fn variance(&self) -> f64 {
        let m = self.mean();
        (self.second_moment() - m * m).max(0.0)
    }

    /// Naive standard error of the mean, ignoring autocorrelation.
    pub fn std_error(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.variance() / (self.count - 1) as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments() {
        let mut s = Statistics::default();
        for v in [1.0, 2.0, 3.0, 4.0] {
            s.update(v);
        }
        assert_eq!(s.count, 4);
        assert!((s.mean() - 2.5).abs() < 1e-12);
        assert!((s.second_moment() - 7.5).abs() < 1e-12);
        assert!((s.variance() - 1.25).abs() < 1e-12);
        assert!((s.std_error() - (1.25f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_is_zero() {
        let s = Statistics::default();
        assert_eq!(s.mean(), 0.0);
        assert_eq!(s.std_error(), 0.0);
    }
}
