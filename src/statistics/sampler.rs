use crate::error::ExamError;
use crate::statistics::model::NormalMeanModel;
use rand::Rng;
use std::f64::consts::PI;
use strum_macros::{Display, EnumIter, EnumString};

/// posterior draws of mu, one vector per chain
#[derive(Debug, Clone)]
pub struct PosteriorSamples {
    pub chains: Vec<Vec<f64>>,
    /// share of accepted proposals per chain, 1.0 for exact samplers
    pub acceptance: Vec<f64>,
}

impl PosteriorSamples {
    pub fn flat(&self) -> Vec<f64> {
        self.chains.concat()
    }

    pub fn len(&self) -> usize {
        self.chains.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mean(&self) -> f64 {
        let n = self.len();
        if n == 0 {
            return f64::NAN;
        }
        self.chains.iter().flatten().sum::<f64>() / n as f64
    }
}

/// anything that turns a model plus observations into posterior draws
pub trait PosteriorSampler {
    fn sample(
        &self,
        model: &NormalMeanModel,
        observed: &[f64],
    ) -> Result<PosteriorSamples, ExamError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SamplerBackend {
    Metropolis,
    Conjugate,
}

/// standard normal variate by the Box-Muller transform
pub fn sample_standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // 1 - u keeps the logarithm away from zero
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

pub(crate) fn check_counts(draws: usize, chains: usize) -> Result<(), ExamError> {
    if draws == 0 {
        return Err(ExamError::Sampler("number of draws must be positive".to_string()));
    }
    if chains == 0 {
        return Err(ExamError::Sampler("number of chains must be positive".to_string()));
    }
    Ok(())
}
