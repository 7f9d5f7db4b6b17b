//! Forward (explicit) Euler method for the scalar autonomous equation dy/dt = f(y)
//!
//! the state on every grid point is obtained from the previous one by
//! y[i] = y[i-1] + (t[i] - t[i-1]) * f(y[i-1]),
//! the grid may be non-uniform: the actual time deltas are used.
use crate::Utils::logger::save_columns_to_csv;
use crate::Utils::plots::plot_trajectory;
use crate::error::ExamError;
use crate::numerical::grid::{arange, validate_grid};
use core::fmt::Display;
use log::{info, warn};
use nalgebra::DVector;
use std::path::Path;
use std::time::Instant;

/// Euler approximation of the solution on the grid t, starting from f0 at t[0]
/// ```
/// use ExamSciThe::numerical::FE::approx_euler;
/// use ExamSciThe::numerical::exambirulobin_model::deriv;
/// use nalgebra::DVector;
/// let res = approx_euler(&DVector::from_vec(vec![0.0]), 42.0, deriv).unwrap();
/// assert_eq!(res.as_slice(), &[42.0]);
/// ```
pub fn approx_euler<F>(t: &DVector<f64>, f0: f64, dfun: F) -> Result<DVector<f64>, ExamError>
where
    F: Fn(f64) -> f64,
{
    validate_grid(t)?;
    if !f0.is_finite() {
        return Err(ExamError::InvalidInput(format!(
            "initial value must be finite, got {}",
            f0
        )));
    }
    let mut res = DVector::zeros(t.len());
    res[0] = f0;
    let mut blown_up = false;
    for i in 1..t.len() {
        res[i] = res[i - 1] + (t[i] - t[i - 1]) * dfun(res[i - 1]);
        if !blown_up && !res[i].is_finite() {
            warn!(
                "Euler trajectory is no longer finite at t[{}] = {}: {}",
                i, t[i], res[i]
            );
            blown_up = true;
        }
    }
    Ok(res)
}

/// solver object for the Euler integration on a uniform grid [t0, t_bound) with step h
pub struct FE {
    t0: f64,
    t_bound: f64,
    h: f64,
    y0: f64,
    status: String,
    t_result: DVector<f64>,
    y_result: DVector<f64>,
}

impl Display for FE {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FE {{ t0: {}, t_bound: {}, h: {}, y0: {}, status: {} }}",
            self.t0, self.t_bound, self.h, self.y0, self.status
        )
    }
}

impl FE {
    pub fn new() -> FE {
        FE {
            t0: 0.0,
            t_bound: 0.0,
            h: 0.0,
            y0: 0.0,
            status: "created".to_string(),
            t_result: DVector::zeros(0),
            y_result: DVector::zeros(0),
        }
    }

    pub fn set_initial(&mut self, t0: f64, t_bound: f64, h: f64, y0: f64) {
        self.t0 = t0;
        self.t_bound = t_bound;
        self.h = h;
        self.y0 = y0;
        self.status = "initialized".to_string();
    }

    pub fn solve<F>(&mut self, dfun: F) -> Result<(), ExamError>
    where
        F: Fn(f64) -> f64,
    {
        let start = Instant::now();
        let grid = arange(self.t0, self.t_bound, self.h)
            .and_then(|t| approx_euler(&t, self.y0, dfun).map(|y| (t, y)));
        let (t, y) = match grid {
            Ok(result) => result,
            Err(err) => {
                self.status = "failed".to_string();
                return Err(err);
            }
        };
        info!(
            "Euler integration of {} steps took {} ms, y(end) = {}",
            t.len().saturating_sub(1),
            start.elapsed().as_millis(),
            y[y.len() - 1]
        );
        self.t_result = t;
        self.y_result = y;
        self.status = "finished".to_string();
        Ok(())
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn get_result(&self) -> (DVector<f64>, DVector<f64>) {
        (self.t_result.clone(), self.y_result.clone())
    }

    pub fn save_result(&self, path: &Path) -> Result<(), ExamError> {
        save_columns_to_csv(
            path,
            &["t", "y"],
            &[self.t_result.as_slice(), self.y_result.as_slice()],
        )?;
        info!("result saved to {}", path.display());
        Ok(())
    }

    pub fn plot_result(&self, path: &Path) -> Result<(), ExamError> {
        plot_trajectory(path, &self.t_result, &self.y_result, "Derivative approximation")?;
        info!("result plotted to {}", path.display());
        Ok(())
    }
}
