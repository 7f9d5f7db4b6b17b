use crate::error::ExamError;

/// observations ~ Normal(mu, likelihood_sigma), prior mu ~ Normal(prior_mu, prior_sigma)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalMeanModel {
    pub prior_mu: f64,
    pub prior_sigma: f64,
    pub likelihood_sigma: f64,
}

impl Default for NormalMeanModel {
    fn default() -> Self {
        NormalMeanModel {
            prior_mu: 0.0,
            prior_sigma: 1.0,
            likelihood_sigma: 1.0,
        }
    }
}

impl NormalMeanModel {
    pub fn new(prior_mu: f64, prior_sigma: f64, likelihood_sigma: f64) -> Self {
        NormalMeanModel {
            prior_mu,
            prior_sigma,
            likelihood_sigma,
        }
    }

    /// rejects non-positive scales and unusable observations
    pub fn check(&self, observed: &[f64]) -> Result<(), ExamError> {
        if !self.prior_mu.is_finite() {
            return Err(ExamError::Sampler(format!(
                "prior mean must be finite, got {}",
                self.prior_mu
            )));
        }
        if !(self.prior_sigma > 0.0 && self.prior_sigma.is_finite()) {
            return Err(ExamError::Sampler(format!(
                "prior sigma must be positive, got {}",
                self.prior_sigma
            )));
        }
        if !(self.likelihood_sigma > 0.0 && self.likelihood_sigma.is_finite()) {
            return Err(ExamError::Sampler(format!(
                "likelihood sigma must be positive, got {}",
                self.likelihood_sigma
            )));
        }
        if observed.is_empty() {
            return Err(ExamError::Sampler("no observed values".to_string()));
        }
        if let Some(i) = observed.iter().position(|x| !x.is_finite()) {
            return Err(ExamError::Sampler(format!(
                "observed value {} at index {} is not finite",
                observed[i], i
            )));
        }
        Ok(())
    }

    /// unnormalised log posterior density of mu
    pub fn log_posterior(&self, mu: f64, observed: &[f64]) -> f64 {
        let z_prior = (mu - self.prior_mu) / self.prior_sigma;
        let inv_var = 1.0 / (self.likelihood_sigma * self.likelihood_sigma);
        let sq: f64 = observed.iter().map(|x| (x - mu) * (x - mu)).sum();
        -0.5 * z_prior * z_prior - 0.5 * inv_var * sq
    }

    /// closed form posterior of mu: (mean, sd)
    pub fn analytic_posterior(&self, observed: &[f64]) -> (f64, f64) {
        let n = observed.len() as f64;
        let prior_precision = 1.0 / (self.prior_sigma * self.prior_sigma);
        let data_precision = n / (self.likelihood_sigma * self.likelihood_sigma);
        let precision = prior_precision + data_precision;
        let sum: f64 = observed.iter().sum();
        let mean = (prior_precision * self.prior_mu
            + sum / (self.likelihood_sigma * self.likelihood_sigma))
            / precision;
        (mean, (1.0 / precision).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_analytic_posterior_standard_model() {
        let model = NormalMeanModel::default();
        // n = 4, sum = 20: mean = 20 / 5, sd = sqrt(1/5)
        let (mean, sd) = model.analytic_posterior(&[5.0, 5.0, 5.0, 5.0]);
        assert_relative_eq!(mean, 4.0, epsilon = 1e-12);
        assert_relative_eq!(sd, (0.2_f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_log_posterior_peaks_at_analytic_mean() {
        let model = NormalMeanModel::default();
        let observed = [0.3, 1.2, 0.8, 2.0];
        let (mean, _) = model.analytic_posterior(&observed);
        let at_mean = model.log_posterior(mean, &observed);
        assert!(at_mean > model.log_posterior(mean + 0.1, &observed));
        assert!(at_mean > model.log_posterior(mean - 0.1, &observed));
    }

    #[test]
    fn test_check_rejects_bad_inputs() {
        let model = NormalMeanModel::default();
        assert!(model.check(&[1.0]).is_ok());
        assert!(matches!(model.check(&[]), Err(ExamError::Sampler(_))));
        assert!(model.check(&[1.0, f64::INFINITY]).is_err());
        assert!(NormalMeanModel::new(0.0, 0.0, 1.0).check(&[1.0]).is_err());
        assert!(NormalMeanModel::new(0.0, 1.0, -1.0).check(&[1.0]).is_err());
    }
}
