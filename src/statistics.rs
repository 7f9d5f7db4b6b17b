//! Bayesian fit of the mean of the ratio
pub mod conjugate;
pub mod metropolis;
pub mod model;
/// the sampler interface and the posterior draws it returns
pub mod sampler;
/// mean, sd, HDI, R-hat and histograms of the draws
pub mod summary;
