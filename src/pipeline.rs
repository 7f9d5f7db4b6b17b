//! The exam exercises as one linear pipeline
//!
//! every step takes what it needs as arguments and returns what it produced,
//! `run_all` chains them in exercise order.
use crate::Utils::plots::{plot_posterior, plot_series_and_histogram};
use crate::config::ExamConfig;
use crate::error::ExamError;
use crate::numerical::FE::FE;
use crate::numerical::exambirulobin_model::ProteinKinetics;
use crate::numerical::grid::linspace;
use crate::statistics::conjugate::ConjugateNormalSampler;
use crate::statistics::sampler::{PosteriorSampler, PosteriorSamples, SamplerBackend};
use crate::statistics::summary::{PosteriorSummary, summarize};
use crate::tabular::frame::ValuesFrame;
use crate::tabular::values_csv::read_first_column_from_path;
use log::info;
use nalgebra::DVector;
use std::fs;
use std::path::PathBuf;

pub const TRAJECTORY_PNG: &str = "trajectory.png";
pub const TRAJECTORY_CSV: &str = "trajectory.csv";
pub const VALUES_PNG: &str = "values_and_ratio.png";
pub const VALUES_CSV: &str = "values_derived.csv";
pub const POSTERIOR_PNG: &str = "posterior.png";

#[derive(Debug, Clone)]
pub struct Trajectory {
    pub t: DVector<f64>,
    pub y: DVector<f64>,
}

#[derive(Debug, Clone)]
pub struct ExamReport {
    pub kinetics: ProteinKinetics,
    pub trajectory: Trajectory,
    pub first_column: DVector<f64>,
    pub frame: ValuesFrame,
    pub posterior: PosteriorSamples,
    pub summary: PosteriorSummary,
    /// files written to the output directory
    pub artifacts: Vec<PathBuf>,
}

pub struct ExamPipeline {
    config: ExamConfig,
    artifacts: Vec<PathBuf>,
}

impl ExamPipeline {
    pub fn new(config: ExamConfig) -> Self {
        ExamPipeline {
            config,
            artifacts: Vec::new(),
        }
    }

    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    fn output_path(&mut self, name: &str) -> Result<PathBuf, ExamError> {
        fs::create_dir_all(&self.config.output.dir)?;
        let path = self.config.output.dir.join(name);
        self.artifacts.push(path.clone());
        Ok(path)
    }

    /// exercise 1: right-hand side of the kinetic equation
    pub fn kinetics(&self) -> ProteinKinetics {
        let kinetics = self.config.kinetics;
        info!(
            "dy/dt = {} + {}*y + {}*y^2, dy/dt(0) = {}",
            kinetics.a,
            kinetics.b,
            kinetics.c,
            kinetics.deriv(0.0)
        );
        kinetics
    }

    /// exercises 2 and 3: Euler approximation on [t0, t_end) and its plot
    pub fn integrate(&mut self, kinetics: &ProteinKinetics) -> Result<Trajectory, ExamError> {
        let ic = self.config.integration.clone();
        let mut solver = FE::new();
        solver.set_initial(ic.t0, ic.t_end, ic.dt, ic.y0);
        solver.solve(kinetics.as_fn())?;
        info!("{}", solver);
        let csv_path = self.output_path(TRAJECTORY_CSV)?;
        solver.save_result(&csv_path)?;
        if self.config.output.plots {
            let png_path = self.output_path(TRAJECTORY_PNG)?;
            solver.plot_result(&png_path)?;
        }
        let (t, y) = solver.get_result();
        Ok(Trajectory { t, y })
    }

    /// exercise 4: first column of the measurements file
    pub fn first_column(&self) -> Result<DVector<f64>, ExamError> {
        let column = read_first_column_from_path(&self.config.data_path)?;
        info!("exambirulobin: {} values", column.len());
        Ok(column)
    }

    /// exercise 5: both columns as a table
    pub fn load_frame(&self) -> Result<ValuesFrame, ExamError> {
        let frame = ValuesFrame::from_csv_path(&self.config.data_path)?;
        info!("\n{}", frame.head(5));
        Ok(frame)
    }

    /// exercise 6: diff and ratio columns
    pub fn derive_columns(&mut self, mut frame: ValuesFrame) -> Result<ValuesFrame, ExamError> {
        frame.derive_columns()?;
        info!("\n{}", frame.head(5));
        let csv_path = self.output_path(VALUES_CSV)?;
        frame.save_csv(&csv_path)?;
        Ok(frame)
    }

    /// exercise 7: exambirulobin series next to the ratio histogram
    pub fn plot_values(&mut self, frame: &ValuesFrame) -> Result<(), ExamError> {
        if !self.config.output.plots {
            return Ok(());
        }
        let ratio = frame
            .ratio()
            .ok_or_else(|| ExamError::InvalidInput("ratio column not derived yet".to_string()))?;
        let t = linspace(0.0, 15.0, frame.len());
        let path = self.output_path(VALUES_PNG)?;
        plot_series_and_histogram(&path, &t, frame.exambirulobin(), ratio)
    }

    pub fn sampler(&self) -> Box<dyn PosteriorSampler> {
        let settings = &self.config.sampler;
        match settings.backend {
            SamplerBackend::Metropolis => Box::new(self.config.metropolis()),
            SamplerBackend::Conjugate => Box::new(ConjugateNormalSampler {
                draws: settings.draws,
                chains: settings.chains,
                seed: settings.seed,
            }),
        }
    }

    /// exercise 8: posterior of the mean ratio and its plot
    pub fn fit_posterior(
        &mut self,
        frame: &ValuesFrame,
        sampler: &dyn PosteriorSampler,
    ) -> Result<(PosteriorSamples, PosteriorSummary), ExamError> {
        let ratio = frame
            .ratio()
            .ok_or_else(|| ExamError::InvalidInput("ratio column not derived yet".to_string()))?;
        let samples = sampler.sample(&self.config.model, ratio)?;
        let summary = summarize(&samples.chains, &samples.acceptance)?;
        info!("posterior of mu\n{}", summary);
        if self.config.output.plots {
            let path = self.output_path(POSTERIOR_PNG)?;
            plot_posterior(&path, &samples.flat(), &summary)?;
        }
        Ok((samples, summary))
    }

    pub fn run_all(mut self) -> Result<ExamReport, ExamError> {
        let kinetics = self.kinetics();
        let trajectory = self.integrate(&kinetics)?;
        let first_column = self.first_column()?;
        let frame = self.load_frame()?;
        let frame = self.derive_columns(frame)?;
        self.plot_values(&frame)?;
        let sampler = self.sampler();
        let (posterior, summary) = self.fit_posterior(&frame, sampler.as_ref())?;
        info!("{} files written to {}", self.artifacts.len(), self.config.output.dir.display());
        Ok(ExamReport {
            kinetics,
            trajectory,
            first_column,
            frame,
            posterior,
            summary,
            artifacts: self.artifacts,
        })
    }
}
