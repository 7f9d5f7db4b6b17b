use crate::error::ExamError;
use crate::statistics::summary::{PosteriorSummary, density_histogram};
use nalgebra::DVector;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

/// axis range with a 5% margin; a constant series gets a unit-wide range
fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min <= f64::EPSILON * max.abs().max(1.0) {
        return (min - 0.5, max + 0.5);
    }
    let pad = 0.05 * (max - min);
    (min - pad, max + pad)
}

fn check_finite(name: &str, values: &[f64]) -> Result<(), ExamError> {
    if values.is_empty() {
        return Err(ExamError::InvalidInput(format!("nothing to plot: '{}' is empty", name)));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(ExamError::InvalidInput(format!(
            "cannot plot '{}': value at index {} is {}",
            name, i, values[i]
        )));
    }
    Ok(())
}

fn check_same_len(x: &[f64], y: &[f64]) -> Result<(), ExamError> {
    if x.len() != y.len() {
        return Err(ExamError::InvalidInput(format!(
            "x has {} points, y has {}",
            x.len(),
            y.len()
        )));
    }
    Ok(())
}

/// line plot of the integrated trajectory y(t)
pub fn plot_trajectory(
    path: &Path,
    t: &DVector<f64>,
    y: &DVector<f64>,
    label: &str,
) -> Result<(), ExamError> {
    check_finite("t", t.as_slice())?;
    check_finite("y", y.as_slice())?;
    check_same_len(t.as_slice(), y.as_slice())?;
    Ok(draw_trajectory(path, t.as_slice(), y.as_slice(), label)?)
}

fn draw_trajectory(path: &Path, t: &[f64], y: &[f64], label: &str) -> Result<(), Box<dyn Error>> {
    let (x_min, x_max) = padded_range(t);
    let (y_min, y_max) = padded_range(y);
    let root_area = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root_area)
        .caption("exambirulobin", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart.configure_mesh().x_desc("t").y_desc("y").draw()?;

    let series: Vec<(f64, f64)> = t.iter().zip(y.iter()).map(|(&x, &y)| (x, y)).collect();
    chart
        .draw_series(LineSeries::new(series, &Palette99::pick(0)))?
        .label(label.to_string())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(0)));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root_area.present()?;
    Ok(())
}

/// two adjacent panels: the measured exambirulobin series and the density histogram of the ratio
pub fn plot_series_and_histogram(
    path: &Path,
    t: &DVector<f64>,
    series: &[f64],
    ratio: &[f64],
) -> Result<(), ExamError> {
    check_finite("t", t.as_slice())?;
    check_finite("exambirulobin", series)?;
    check_finite("ratio", ratio)?;
    check_same_len(t.as_slice(), series)?;
    Ok(draw_series_and_histogram(path, t.as_slice(), series, ratio)?)
}

fn draw_series_and_histogram(
    path: &Path,
    t: &[f64],
    series: &[f64],
    ratio: &[f64],
) -> Result<(), Box<dyn Error>> {
    let root_area = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root_area.fill(&WHITE)?;
    let panels = root_area.split_evenly((1, 2));

    let (x_min, x_max) = padded_range(t);
    let (y_min, y_max) = padded_range(series);
    let mut left = ChartBuilder::on(&panels[0])
        .caption("Exambirulobin", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    left.configure_mesh().x_desc("t").y_desc("exambirulobin").draw()?;
    let points: Vec<(f64, f64)> = t.iter().zip(series.iter()).map(|(&x, &y)| (x, y)).collect();
    left.draw_series(LineSeries::new(points, &BLUE))?
        .label("Exambirulobin")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    left.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    let histogram = density_histogram(ratio, None);
    let (h_min, h_max) = padded_range(&histogram.edges);
    let d_max = histogram.densities.iter().copied().fold(0.0, f64::max).max(1e-12) * 1.1;
    let mut right = ChartBuilder::on(&panels[1])
        .caption("ratio", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(h_min..h_max, 0.0..d_max)?;
    right.configure_mesh().x_desc("ratio").y_desc("density").draw()?;
    right
        .draw_series(histogram.bars().map(|(lo, hi, d)| {
            Rectangle::new([(lo, 0.0), (hi, d)], RED.mix(0.6).filled())
        }))?
        .label("ratio")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], RED.mix(0.6).filled()));
    right
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root_area.present()?;
    Ok(())
}

/// density histogram of the posterior draws of mu with the mean and the HDI marked
pub fn plot_posterior(
    path: &Path,
    draws: &[f64],
    summary: &PosteriorSummary,
) -> Result<(), ExamError> {
    check_finite("mu", draws)?;
    Ok(draw_posterior(path, draws, summary)?)
}

fn draw_posterior(
    path: &Path,
    draws: &[f64],
    summary: &PosteriorSummary,
) -> Result<(), Box<dyn Error>> {
    let histogram = density_histogram(draws, None);
    let (x_min, x_max) = padded_range(&histogram.edges);
    let d_max = histogram.densities.iter().copied().fold(0.0, f64::max).max(1e-12) * 1.15;

    let root_area = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE)?;
    let caption = format!(
        "mu: mean = {:.3}, {:.0}% HDI [{:.3}, {:.3}]",
        summary.mean,
        100.0 * summary.hdi_prob,
        summary.hdi.0,
        summary.hdi.1
    );
    let mut chart = ChartBuilder::on(&root_area)
        .caption(caption, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..d_max)?;
    chart.configure_mesh().x_desc("mu").y_desc("density").draw()?;

    chart
        .draw_series(histogram.bars().map(|(lo, hi, d)| {
            Rectangle::new([(lo, 0.0), (hi, d)], BLUE.mix(0.4).filled())
        }))?
        .label("posterior")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], BLUE.mix(0.4).filled()));

    let mean = summary.mean;
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(mean, 0.0), (mean, d_max / 1.15)],
            BLACK.stroke_width(2),
        )))?
        .label("mean")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

    let (lo, hi) = summary.hdi;
    let hdi_height = 0.02 * d_max;
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(lo, hdi_height), (hi, hdi_height)],
            RED.stroke_width(4),
        )))?
        .label("HDI")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(4)));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root_area.present()?;
    Ok(())
}

/// plot tests accept a missing system font: the bitmap backend cannot lay out text without one
#[cfg(test)]
pub(crate) fn check_png_written(result: Result<(), ExamError>, path: &Path) {
    match result {
        Ok(()) => assert!(std::fs::metadata(path).unwrap().len() > 0),
        Err(ExamError::Plot(msg)) => eprintln!("plot skipped, backend unavailable: {}", msg),
        Err(other) => panic!("unexpected plot error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::summary::summarize;

    #[test]
    fn test_padded_range() {
        let (lo, hi) = padded_range(&[0.0, 10.0]);
        assert_eq!((lo, hi), (-0.5, 10.5));
        let (lo, hi) = padded_range(&[2.0, 2.0]);
        assert_eq!((lo, hi), (1.5, 2.5));
    }

    #[test]
    fn test_plot_trajectory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectory.png");
        let t = DVector::from_vec(vec![0.0, 1.0, 2.0]);
        let y = DVector::from_vec(vec![0.1, 0.2, 0.4]);
        plot_trajectory(&path, &t, &y, "Derivative approximation").unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_rejects_empty_and_non_finite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        let empty = DVector::zeros(0);
        assert!(matches!(
            plot_trajectory(&path, &empty, &empty, "y"),
            Err(ExamError::InvalidInput(_))
        ));
        let t = DVector::from_vec(vec![0.0, 1.0]);
        let y = DVector::from_vec(vec![0.1, f64::INFINITY]);
        assert!(matches!(
            plot_trajectory(&path, &t, &y, "y"),
            Err(ExamError::InvalidInput(_))
        ));
        let short = DVector::from_vec(vec![0.1]);
        assert!(plot_trajectory(&path, &t, &short, "y").is_err());
    }

    #[test]
    fn test_plot_series_and_histogram() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values_and_ratio.png");
        let t = DVector::from_vec(vec![0.0, 5.0, 10.0, 15.0]);
        let series = [1.0, 2.0, 1.5, 3.0];
        let ratio = [0.5, 0.7, 0.4, 1.2];
        check_png_written(plot_series_and_histogram(&path, &t, &series, &ratio), &path);
    }

    #[test]
    fn test_plot_posterior() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posterior.png");
        let chains = vec![vec![0.9, 1.0, 1.1, 1.05, 0.95], vec![1.0, 1.02, 0.98, 1.01, 0.99]];
        let summary = summarize(&chains, &[0.5, 0.5]).unwrap();
        let draws: Vec<f64> = chains.concat();
        check_png_written(plot_posterior(&path, &draws, &summary), &path);
    }
}
