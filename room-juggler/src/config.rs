use serde::{Deserialize, Serialize};

pub const DEFAULT_N_ITER: usize = 300;
pub const DEFAULT_BETA: f64 = 0.999;
pub const DEFAULT_T_0: f64 = 1.0;
pub const DEFAULT_T_MIN: f64 = 1e-7;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("beta must lie strictly between 0 and 1, got {0}")]
    Beta(f64),
    #[error("temperatures must be finite and positive, got t_0={t_0}, t_min={t_min}")]
    Temperature { t_0: f64, t_min: f64 },
    #[error("n_iter must be at least 1")]
    ZeroIterations,
}

/// Cooling schedule and iteration budget of the annealer.
#[derive(Debug, Clone, PartialEq)]
pub struct JuggleConfig {
    n_iter: usize,
    beta: f64,
    t_0: f64,
    t_min: f64,
    t_history: Vec<f64>,
}

impl JuggleConfig {
    /// Geometric schedule `t_0, t_0*beta, t_0*beta^2, ...`, ending with the
    /// first temperature `<= t_min`.
    pub fn new(n_iter: usize, beta: f64, t_0: f64, t_min: f64) -> Result<Self, ConfigError> {
        if !(beta > 0.0 && beta < 1.0) {
            return Err(ConfigError::Beta(beta));
        }
        if !(t_0.is_finite() && t_min.is_finite() && t_0 > 0.0 && t_min > 0.0) {
            return Err(ConfigError::Temperature { t_0, t_min });
        }
        if n_iter == 0 {
            return Err(ConfigError::ZeroIterations);
        }

        Ok(Self::build(n_iter, beta, t_0, t_min))
    }

    fn build(n_iter: usize, beta: f64, t_0: f64, t_min: f64) -> Self {
        let mut t_history = vec![t_0];
        let mut t = t_0;
        while t > t_min {
            t *= beta;
            t_history.push(t);
        }
        Self {
            n_iter,
            beta,
            t_0,
            t_min,
            t_history,
        }
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn t_0(&self) -> f64 {
        self.t_0
    }

    pub fn t_min(&self) -> f64 {
        self.t_min
    }

    pub fn t_history(&self) -> &[f64] {
        &self.t_history
    }

    /// Move attempts of a full run.
    pub fn n_total_iter(&self) -> u64 {
        self.n_iter as u64 * self.t_history.len() as u64
    }
}

impl Default for JuggleConfig {
    fn default() -> Self {
        Self::build(DEFAULT_N_ITER, DEFAULT_BETA, DEFAULT_T_0, DEFAULT_T_MIN)
    }
}

/// Serializable, partially specified form of [`JuggleConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JuggleOptions {
    pub n_iter: usize,
    pub beta: f64,
    pub t_0: f64,
    pub t_min: f64,
}

impl Default for JuggleOptions {
    fn default() -> Self {
        Self {
            n_iter: DEFAULT_N_ITER,
            beta: DEFAULT_BETA,
            t_0: DEFAULT_T_0,
            t_min: DEFAULT_T_MIN,
        }
    }
}

impl TryFrom<JuggleOptions> for JuggleConfig {
    type Error = ConfigError;

    fn try_from(o: JuggleOptions) -> Result<Self, Self::Error> {
        JuggleConfig::new(o.n_iter, o.beta, o.t_0, o.t_min)
    }
}

impl From<&JuggleConfig> for JuggleOptions {
    fn from(c: &JuggleConfig) -> Self {
        Self {
            n_iter: c.n_iter,
            beta: c.beta,
            t_0: c.t_0,
            t_min: c.t_min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_shape() {
        let c = JuggleConfig::new(10, 0.5, 1.0, 0.1).unwrap();
        assert_eq!(c.t_history(), &[1.0, 0.5, 0.25, 0.125, 0.0625]);
        assert_eq!(c.n_total_iter(), 50);
    }

    #[test]
    fn default_schedule_is_strictly_decreasing() {
        let c = JuggleConfig::default();
        let h = c.t_history();
        assert_eq!(h[0], 1.0);
        assert!(h.windows(2).all(|w| w[1] < w[0]));
        let last = *h.last().unwrap();
        assert!(last <= 1e-7);
        assert!(h[h.len() - 2] > 1e-7);
        assert_eq!(c.n_total_iter(), 300 * h.len() as u64);
        // ln(1e-7) / ln(0.999) ~ 16110
        assert!((16_000..16_200).contains(&h.len()));
    }

    #[test]
    fn start_below_floor_gives_single_step() {
        let c = JuggleConfig::new(5, 0.9, 1e-8, 1e-7).unwrap();
        assert_eq!(c.t_history(), &[1e-8]);
        assert_eq!(c.n_total_iter(), 5);
    }

    #[test]
    fn rejects_bad_beta() {
        for beta in [0.0, -0.5, 1.0, 1.5, f64::NAN] {
            assert!(matches!(
                JuggleConfig::new(1, beta, 1.0, 0.1),
                Err(ConfigError::Beta(_))
            ));
        }
    }

    #[test]
    fn rejects_bad_temperatures_and_iterations() {
        assert!(matches!(
            JuggleConfig::new(1, 0.5, 1.0, 0.0),
            Err(ConfigError::Temperature { .. })
        ));
        assert!(matches!(
            JuggleConfig::new(1, 0.5, f64::INFINITY, 0.1),
            Err(ConfigError::Temperature { .. })
        ));
        assert_eq!(
            JuggleConfig::new(0, 0.5, 1.0, 0.1),
            Err(ConfigError::ZeroIterations)
        );
    }

    #[test]
    fn options_fill_missing_fields() {
        let o: JuggleOptions = serde_json::from_str(r#"{"n_iter": 20, "beta": 0.9}"#).unwrap();
        assert_eq!(o.t_0, DEFAULT_T_0);
        assert_eq!(o.t_min, DEFAULT_T_MIN);
        let c = JuggleConfig::try_from(o).unwrap();
        assert_eq!(c.n_iter(), 20);
        assert_eq!(JuggleOptions::from(&c), o);
    }
}
