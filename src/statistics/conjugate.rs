use crate::error::ExamError;
use crate::statistics::model::NormalMeanModel;
use crate::statistics::sampler::{
    PosteriorSampler, PosteriorSamples, check_counts, sample_standard_normal,
};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// exact draws from the closed-form normal posterior of the mean
#[derive(Debug, Clone, PartialEq)]
pub struct ConjugateNormalSampler {
    pub draws: usize,
    pub chains: usize,
    pub seed: u64,
}

impl Default for ConjugateNormalSampler {
    fn default() -> Self {
        ConjugateNormalSampler {
            draws: 1000,
            chains: 2,
            seed: 42,
        }
    }
}

impl PosteriorSampler for ConjugateNormalSampler {
    fn sample(
        &self,
        model: &NormalMeanModel,
        observed: &[f64],
    ) -> Result<PosteriorSamples, ExamError> {
        model.check(observed)?;
        check_counts(self.draws, self.chains)?;
        let (mean, sd) = model.analytic_posterior(observed);
        info!("conjugate posterior of mu: mean {:.4}, sd {:.4}", mean, sd);
        let chains: Vec<Vec<f64>> = (0..self.chains)
            .map(|chain| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(chain as u64));
                (0..self.draws)
                    .map(|_| mean + sd * sample_standard_normal(&mut rng))
                    .collect::<Vec<f64>>()
            })
            .collect();
        Ok(PosteriorSamples {
            chains,
            acceptance: vec![1.0; self.chains],
        })
    }
}
