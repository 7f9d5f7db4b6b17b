use crate::error::ExamError;
use csv::Writer;
use log::LevelFilter;
use simplelog::*;
use std::fs::File;
use std::path::Path;

/// console logger plus an optional file logger; a second call keeps the first logger
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<(), ExamError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(filename) = log_file {
        let file = File::create(filename)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

/// writes equally long columns under a header row
pub fn save_columns_to_csv(
    path: &Path,
    headers: &[&str],
    columns: &[&[f64]],
) -> Result<(), ExamError> {
    if headers.len() != columns.len() {
        return Err(ExamError::InvalidInput(format!(
            "{} headers for {} columns",
            headers.len(),
            columns.len()
        )));
    }
    let nrows = columns.first().map(|c| c.len()).unwrap_or(0);
    if let Some(bad) = columns.iter().position(|c| c.len() != nrows) {
        return Err(ExamError::InvalidInput(format!(
            "column '{}' has {} rows, expected {}",
            headers[bad],
            columns[bad].len(),
            nrows
        )));
    }
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(headers)?;
    for i in 0..nrows {
        writer.write_record(columns.iter().map(|c| c[i].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
