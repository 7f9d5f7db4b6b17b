use crate::error::ExamError;
use std::fmt;
use tabled::{builder::Builder, settings::Style};

/// share of the posterior mass covered by the reported interval
pub const HDI_PROB: f64 = 0.94;

#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorSummary {
    pub n_draws: usize,
    pub mean: f64,
    pub sd: f64,
    pub hdi_prob: f64,
    pub hdi: (f64, f64),
    pub acceptance: Vec<f64>,
    /// split R-hat, None when the chains are too short
    pub r_hat: Option<f64>,
}

fn mean_of(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// sample variance with n - 1 in the denominator
fn variance_of(values: &[f64]) -> f64 {
    let m = mean_of(values);
    values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// linear-interpolated percentile of sorted data, q in [0, 1]; NaN for no data
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}

/// narrowest interval containing the share `prob` of the draws
pub fn hdi(draws: &[f64], prob: f64) -> Result<(f64, f64), ExamError> {
    if draws.is_empty() {
        return Err(ExamError::InvalidInput("no draws for the HDI".to_string()));
    }
    if !(prob > 0.0 && prob <= 1.0) {
        return Err(ExamError::InvalidInput(format!(
            "HDI probability must lie in (0, 1], got {}",
            prob
        )));
    }
    let mut sorted = draws.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let width_idx = ((prob * n as f64).floor() as usize).min(n - 1);
    let n_intervals = n - width_idx;
    let best = (0..n_intervals)
        .min_by(|&i, &j| {
            let wi = sorted[i + width_idx] - sorted[i];
            let wj = sorted[j + width_idx] - sorted[j];
            wi.total_cmp(&wj)
        })
        .unwrap_or(0);
    Ok((sorted[best], sorted[best + width_idx]))
}

/// potential scale reduction over the chains split in halves
pub fn split_r_hat(chains: &[Vec<f64>]) -> Option<f64> {
    let half = chains.iter().map(|c| c.len() / 2).min()?;
    if half < 2 {
        return None;
    }
    let mut halves: Vec<&[f64]> = Vec::with_capacity(2 * chains.len());
    for chain in chains {
        halves.push(&chain[..half]);
        halves.push(&chain[chain.len() - half..]);
    }
    let n = half as f64;
    let means: Vec<f64> = halves.iter().map(|h| mean_of(h)).collect();
    let within = mean_of(&halves.iter().map(|h| variance_of(h)).collect::<Vec<f64>>());
    if within <= 0.0 {
        return None;
    }
    let between = n * variance_of(&means);
    let var_hat = (n - 1.0) / n * within + between / n;
    Some((var_hat / within).sqrt())
}

pub fn summarize(chains: &[Vec<f64>], acceptance: &[f64]) -> Result<PosteriorSummary, ExamError> {
    let draws: Vec<f64> = chains.concat();
    if draws.len() < 2 {
        return Err(ExamError::InvalidInput(format!(
            "at least two draws are needed for a summary, got {}",
            draws.len()
        )));
    }
    Ok(PosteriorSummary {
        n_draws: draws.len(),
        mean: mean_of(&draws),
        sd: variance_of(&draws).sqrt(),
        hdi_prob: HDI_PROB,
        hdi: hdi(&draws, HDI_PROB)?,
        acceptance: acceptance.to_vec(),
        r_hat: split_r_hat(chains),
    })
}

impl PosteriorSummary {
    pub fn to_table(&self) -> String {
        let lo_name = format!("hdi_{:.0}%", 50.0 * (1.0 - self.hdi_prob));
        let hi_name = format!("hdi_{:.0}%", 100.0 - 50.0 * (1.0 - self.hdi_prob));
        let mut builder = Builder::default();
        builder.push_record(["", "mean", "sd", lo_name.as_str(), hi_name.as_str(), "r_hat", "draws"]);
        builder.push_record([
            "mu".to_string(),
            format!("{:.3}", self.mean),
            format!("{:.3}", self.sd),
            format!("{:.3}", self.hdi.0),
            format!("{:.3}", self.hdi.1),
            self.r_hat
                .map(|r| format!("{:.3}", r))
                .unwrap_or_else(|| "-".to_string()),
            self.n_draws.to_string(),
        ]);
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

impl fmt::Display for PosteriorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

/// upper bound on the number of histogram bins
pub const MAX_BINS: usize = 1000;

/// bin count of the "auto" rule: the finer of Sturges and Freedman-Diaconis.
/// Freedman-Diaconis is dropped when outliers would push it past MAX_BINS
pub fn auto_bins(samples: &[f64]) -> usize {
    let n = samples.len();
    if n < 2 {
        return 1;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let range = sorted[n - 1] - sorted[0];
    if !(range > 0.0) {
        return 1;
    }
    let sturges = (((n as f64).log2() + 1.0).ceil() as usize).clamp(1, MAX_BINS);
    if !range.is_finite() {
        return sturges;
    }
    let iqr = quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25);
    let fd_width = 2.0 * iqr / (n as f64).cbrt();
    if !(fd_width > 0.0) {
        return sturges;
    }
    let fd = (range / fd_width).ceil();
    if fd > MAX_BINS as f64 {
        return sturges;
    }
    sturges.max(fd as usize)
}

/// histogram normalised to unit area
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// bins + 1 edges
    pub edges: Vec<f64>,
    pub densities: Vec<f64>,
}

impl Histogram {
    /// (left edge, right edge, density) per bin
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.edges
            .windows(2)
            .zip(self.densities.iter())
            .map(|(w, &d)| (w[0], w[1], d))
    }
}

pub fn density_histogram(samples: &[f64], bins: Option<usize>) -> Histogram {
    if samples.is_empty() {
        return Histogram {
            edges: vec![0.0, 1.0],
            densities: vec![0.0],
        };
    }
    let bins = bins.unwrap_or_else(|| auto_bins(samples)).clamp(1, MAX_BINS);
    let mut lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + i as f64 * width })
        .collect();
    let mut counts = vec![0usize; bins];
    for &x in samples {
        let idx = (((x - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let total = samples.len() as f64;
    let densities = counts.iter().map(|&c| c as f64 / (total * width)).collect();
    Histogram { edges, densities }
}
