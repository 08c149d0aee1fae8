use rand::Rng;

/// Metropolis acceptance probabilities at one temperature.
///
/// A flip of spin `s` with neighbor sum `h` changes the energy by
/// `ΔE = 2·J·s·h`. With four neighbors `s·h ∈ {−4, −2, 0, 2, 4}`, so only two
/// energy-raising magnitudes exist: entry `k` holds `exp(−2·|J|·2(k+1) / T)`.
/// Built once per temperature and shared read-only by every worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityTable {
    pub temperature: f64,
    pub coupling: f64,
    probs: [f64; 2],
}

impl ProbabilityTable {
    pub fn new(coupling: f64, temperature: f64) -> Self {
        let j = coupling.abs();
        let probs = [
            (-4.0 * j / temperature).exp().min(1.0),
            (-8.0 * j / temperature).exp().min(1.0),
        ];
        Self {
            temperature,
            coupling,
            probs,
        }
    }

    /// Acceptance probability for a spin whose alignment with its
    /// neighborhood is `s·h`.
    #[inline]
    pub fn probability(&self, alignment: i8) -> f64 {
        let delta = self.coupling * alignment as f64;
        if delta <= 0.0 {
            1.0
        } else {
            self.probs[(alignment.unsigned_abs() / 2 - 1) as usize]
        }
    }

    /// Metropolis test: energy-lowering or neutral moves always pass, others
    /// pass with the tabulated probability.
    #[inline]
    pub fn accept(&self, alignment: i8, rng: &mut impl Rng) -> bool {
        let p = self.probability(alignment);
        p >= 1.0 || rng.gen::<f64>() < p
    }

    pub fn entries(&self) -> [f64; 2] {
        self.probs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_ferromagnetic_entries() {
        let table = ProbabilityTable::new(1.0, 2.0);
        let [p4, p8] = table.entries();
        assert!((p4 - (-2.0f64).exp()).abs() < 1e-12);
        assert!((p8 - (-4.0f64).exp()).abs() < 1e-12);

        assert_eq!(table.probability(-4), 1.0);
        assert_eq!(table.probability(0), 1.0);
        assert_eq!(table.probability(2), p4);
        assert_eq!(table.probability(4), p8);
    }

    #[test]
    fn test_antiferromagnetic_raises_on_antialignment() {
        let table = ProbabilityTable::new(-1.0, 1.0);
        assert_eq!(table.probability(4), 1.0);
        assert!((table.probability(-2) - (-4.0f64).exp()).abs() < 1e-12);
        assert!((table.probability(-4) - (-8.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_accept_frequency() {
        let table = ProbabilityTable::new(1.0, 3.0);
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let n = 200_000;
        let hits = (0..n).filter(|_| table.accept(2, &mut rng)).count();
        let freq = hits as f64 / n as f64;
        assert!((freq - table.probability(2)).abs() < 0.01, "freq {freq}");
        assert!((0..100).all(|_| table.accept(-2, &mut rng)));
    }
}
