//! Time grids for the integrators and plots
use crate::error::ExamError;
use nalgebra::DVector;

/// largest grid arange will build
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// half-open grid [start, stop) with fixed step, same point count as numpy.arange
pub fn arange(start: f64, stop: f64, step: f64) -> Result<DVector<f64>, ExamError> {
    if !start.is_finite() || !stop.is_finite() || !step.is_finite() {
        return Err(ExamError::InvalidInput(format!(
            "arange bounds must be finite, got start = {}, stop = {}, step = {}",
            start, stop, step
        )));
    }
    if step <= 0.0 {
        return Err(ExamError::InvalidInput(format!(
            "arange step must be positive, got {}",
            step
        )));
    }
    if stop <= start {
        return Ok(DVector::zeros(0));
    }
    let n = ((stop - start) / step).ceil();
    if !(n <= MAX_GRID_POINTS as f64) {
        return Err(ExamError::InvalidInput(format!(
            "arange over [{}, {}) with step {} needs {:e} points, at most {} are allowed",
            start, stop, step, n, MAX_GRID_POINTS
        )));
    }
    let n = n as usize;
    Ok(DVector::from_fn(n, |i, _| start + i as f64 * step))
}

/// n evenly spaced points, both ends included
pub fn linspace(start: f64, stop: f64, n: usize) -> DVector<f64> {
    match n {
        0 => DVector::zeros(0),
        1 => DVector::from_element(1, start),
        _ => {
            let h = (stop - start) / (n - 1) as f64;
            DVector::from_fn(n, |i, _| {
                if i == n - 1 { stop } else { start + i as f64 * h }
            })
        }
    }
}

pub fn is_strictly_increasing(t: &DVector<f64>) -> bool {
    t.as_slice().windows(2).all(|w| w[1] > w[0])
}

/// checks that the grid is non-empty, finite and strictly increasing
pub fn validate_grid(t: &DVector<f64>) -> Result<(), ExamError> {
    if t.is_empty() {
        return Err(ExamError::InvalidInput("time grid is empty".to_string()));
    }
    if let Some(i) = t.iter().position(|ti| !ti.is_finite()) {
        return Err(ExamError::InvalidInput(format!(
            "time grid value t[{}] = {} is not finite",
            i, t[i]
        )));
    }
    if let Some(i) = t.as_slice().windows(2).position(|w| w[1] <= w[0]) {
        return Err(ExamError::InvalidInput(format!(
            "time grid is not strictly increasing: t[{}] = {} >= t[{}] = {}",
            i,
            t[i],
            i + 1,
            t[i + 1]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arange_exam_grid() {
        let t = arange(0.0, 15.0, 0.01).unwrap();
        assert_eq!(t.len(), 1500);
        assert_eq!(t[0], 0.0);
        assert_relative_eq!(t[1499], 14.99, epsilon = 1e-9);
        assert!(t[t.len() - 1] < 15.0);
        assert!(is_strictly_increasing(&t));
    }

    #[test]
    fn test_arange_degenerate() {
        assert_eq!(arange(1.0, 1.0, 0.1).unwrap().len(), 0);
        assert_eq!(arange(2.0, 1.0, 0.1).unwrap().len(), 0);
        assert!(arange(0.0, 1.0, 0.0).is_err());
        assert!(arange(0.0, 1.0, -0.5).is_err());
        assert!(arange(0.0, f64::INFINITY, 0.5).is_err());
    }

    #[test]
    fn test_arange_refuses_huge_grids() {
        assert!(matches!(
            arange(0.0, 15.0, 1e-15),
            Err(ExamError::InvalidInput(_))
        ));
        assert!(arange(0.0, 1e300, 1e-300).is_err());
        assert_eq!(arange(0.0, 5_000_000.0, 0.5).unwrap().len(), MAX_GRID_POINTS);
    }

    #[test]
    fn test_linspace_endpoints() {
        let t = linspace(0.0, 15.0, 7);
        assert_eq!(t.len(), 7);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[6], 15.0);
        assert_relative_eq!(t[2], 5.0, epsilon = 1e-12);
        assert_eq!(linspace(3.0, 4.0, 1).as_slice(), &[3.0]);
        assert!(linspace(3.0, 4.0, 0).is_empty());
    }

    #[test]
    fn test_validate_grid() {
        assert!(validate_grid(&DVector::from_vec(vec![0.0])).is_ok());
        assert!(validate_grid(&DVector::from_vec(vec![0.0, 0.1, 0.5])).is_ok());
        assert!(validate_grid(&DVector::zeros(0)).is_err());
        assert!(validate_grid(&DVector::from_vec(vec![0.0, 0.0])).is_err());
        assert!(validate_grid(&DVector::from_vec(vec![0.0, 1.0, 0.5])).is_err());
        assert!(validate_grid(&DVector::from_vec(vec![0.0, f64::NAN])).is_err());
    }
}
