//! Random-walk Metropolis sampler for the posterior of the normal mean
//!
//! every chain owns a `StdRng` seeded with `seed + chain`, so the draws do not
//! depend on how rayon schedules the chains. During the tuning phase the
//! proposal scale is adjusted every `tune_interval` steps from the observed
//! acceptance rate; tuning draws are discarded.
use crate::error::ExamError;
use crate::statistics::model::NormalMeanModel;
use crate::statistics::sampler::{
    PosteriorSampler, PosteriorSamples, check_counts, sample_standard_normal,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct MetropolisSampler {
    pub draws: usize,
    pub tune: usize,
    pub chains: usize,
    pub seed: u64,
    pub proposal_sd: f64,
    pub tune_interval: usize,
}

impl Default for MetropolisSampler {
    fn default() -> Self {
        MetropolisSampler {
            draws: 1000,
            tune: 1000,
            chains: 2,
            seed: 42,
            proposal_sd: 0.5,
            tune_interval: 100,
        }
    }
}

/// new proposal scale from the acceptance rate of the last tuning window
pub fn tune_scale(scale: f64, acc_rate: f64) -> f64 {
    if acc_rate < 0.001 {
        scale * 0.1
    } else if acc_rate < 0.05 {
        scale * 0.5
    } else if acc_rate < 0.2 {
        scale * 0.9
    } else if acc_rate > 0.95 {
        scale * 10.0
    } else if acc_rate > 0.75 {
        scale * 2.0
    } else if acc_rate > 0.5 {
        scale * 1.1
    } else {
        scale
    }
}

struct ChainResult {
    draws: Vec<f64>,
    acceptance: f64,
    final_scale: f64,
}

impl MetropolisSampler {
    pub fn new(draws: usize, tune: usize, chains: usize, seed: u64, proposal_sd: f64) -> Self {
        MetropolisSampler {
            draws,
            tune,
            chains,
            seed,
            proposal_sd,
            ..Default::default()
        }
    }

    fn run_chain(&self, chain: usize, model: &NormalMeanModel, observed: &[f64]) -> ChainResult {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(chain as u64));
        // overdispersed start drawn from the prior
        let mut mu = model.prior_mu + model.prior_sigma * sample_standard_normal(&mut rng);
        let mut log_p = model.log_posterior(mu, observed);
        let mut scale = self.proposal_sd;
        let interval = self.tune_interval.max(1);

        let mut window_accepted = 0usize;
        let mut accepted = 0usize;
        let mut draws = Vec::with_capacity(self.draws);

        for step in 0..(self.tune + self.draws) {
            let tuning = step < self.tune;
            if tuning && step > 0 && step % interval == 0 {
                let rate = window_accepted as f64 / interval as f64;
                scale = tune_scale(scale, rate);
                debug!("chain {}: step {} acceptance {:.3}, scale {:.4}", chain, step, rate, scale);
                window_accepted = 0;
            }

            let proposal = mu + scale * sample_standard_normal(&mut rng);
            let log_p_new = model.log_posterior(proposal, observed);
            let u: f64 = 1.0 - rng.random::<f64>();
            if u.ln() < log_p_new - log_p {
                mu = proposal;
                log_p = log_p_new;
                if tuning {
                    window_accepted += 1;
                } else {
                    accepted += 1;
                }
            }
            if !tuning {
                draws.push(mu);
            }
        }
        ChainResult {
            draws,
            acceptance: accepted as f64 / self.draws as f64,
            final_scale: scale,
        }
    }
}

impl PosteriorSampler for MetropolisSampler {
    fn sample(
        &self,
        model: &NormalMeanModel,
        observed: &[f64],
    ) -> Result<PosteriorSamples, ExamError> {
        model.check(observed)?;
        check_counts(self.draws, self.chains)?;
        if !(self.proposal_sd > 0.0 && self.proposal_sd.is_finite()) {
            return Err(ExamError::Sampler(format!(
                "proposal sd must be positive, got {}",
                self.proposal_sd
            )));
        }
        let start = Instant::now();
        let results: Vec<ChainResult> = (0..self.chains)
            .into_par_iter()
            .map(|chain| self.run_chain(chain, model, observed))
            .collect();
        for (chain, result) in results.iter().enumerate() {
            info!(
                "chain {}: {} draws, acceptance {:.3}, proposal scale {:.4}",
                chain,
                result.draws.len(),
                result.acceptance,
                result.final_scale
            );
        }
        info!(
            "Metropolis sampling of {} chains x ({} tune + {} draws) took {} ms",
            self.chains,
            self.tune,
            self.draws,
            start.elapsed().as_millis()
        );
        let (chains, acceptance): (Vec<Vec<f64>>, Vec<f64>) = results
            .into_iter()
            .map(|r| (r.draws, r.acceptance))
            .unzip();
        Ok(PosteriorSamples { chains, acceptance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_ratio(true_mean: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| true_mean + sample_standard_normal(&mut rng))
            .collect()
    }

    #[test]
    fn test_tune_scale_table() {
        assert_eq!(tune_scale(1.0, 0.0), 0.1);
        assert_eq!(tune_scale(1.0, 0.01), 0.5);
        assert_eq!(tune_scale(1.0, 0.1), 0.9);
        assert_eq!(tune_scale(1.0, 0.3), 1.0);
        assert_eq!(tune_scale(1.0, 0.6), 1.1);
        assert_eq!(tune_scale(1.0, 0.8), 2.0);
        assert_eq!(tune_scale(1.0, 0.99), 10.0);
    }

    #[test]
    fn test_posterior_concentrates_near_true_mean() {
        let observed = synthetic_ratio(5.0, 50, 11);
        let model = NormalMeanModel::default();
        let sampler = MetropolisSampler::default();
        let samples = sampler.sample(&model, &observed).unwrap();
        assert_eq!(samples.chains.len(), 2);
        assert_eq!(samples.len(), 2000);

        let (analytic_mean, analytic_sd) = model.analytic_posterior(&observed);
        let mean = samples.mean();
        assert!(
            (mean - analytic_mean).abs() < 0.1,
            "mean {} vs analytic {}",
            mean,
            analytic_mean
        );
        assert!((mean - 5.0).abs() < 0.6, "mean {} far from 5", mean);

        let flat = samples.flat();
        let var = flat.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / flat.len() as f64;
        assert!((var.sqrt() - analytic_sd).abs() < 0.5 * analytic_sd);
        for rate in &samples.acceptance {
            assert!(*rate > 0.05 && *rate < 0.95, "acceptance {}", rate);
        }
    }

    #[test]
    fn test_same_seed_same_draws() {
        let observed = synthetic_ratio(1.0, 10, 3);
        let model = NormalMeanModel::default();
        let sampler = MetropolisSampler::new(200, 200, 3, 99, 0.5);
        let first = sampler.sample(&model, &observed).unwrap();
        let second = sampler.sample(&model, &observed).unwrap();
        assert_eq!(first.chains, second.chains);
        assert_ne!(first.chains[0], first.chains[1]);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let model = NormalMeanModel::default();
        let observed = [1.0, 2.0];
        assert!(MetropolisSampler::new(0, 10, 2, 1, 0.5).sample(&model, &observed).is_err());
        assert!(MetropolisSampler::new(10, 10, 0, 1, 0.5).sample(&model, &observed).is_err());
        assert!(MetropolisSampler::new(10, 10, 2, 1, 0.0).sample(&model, &observed).is_err());
        assert!(matches!(
            MetropolisSampler::default().sample(&model, &[]),
            Err(ExamError::Sampler(_))
        ));
    }
}
