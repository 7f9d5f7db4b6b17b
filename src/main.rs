#![allow(non_snake_case)]
use ExamSciThe::Utils::logger::init_logger;
use ExamSciThe::config::ExamConfig;
use ExamSciThe::error::ExamError;
use ExamSciThe::pipeline::ExamPipeline;
use log::{error, info};
use std::path::PathBuf;

fn run() -> Result<(), ExamError> {
    // the only argument is an optional path to the task document
    let config = match std::env::args().nth(1) {
        Some(path) => ExamConfig::from_file(&PathBuf::from(path))?,
        None => ExamConfig::default(),
    };
    init_logger(config.output.log_level, config.output.log_file.as_deref())?;
    info!("data: {}, output: {}", config.data_path.display(), config.output.dir.display());
    let report = ExamPipeline::new(config).run_all()?;
    println!("{}", report.summary);
    for path in &report.artifacts {
        println!("written {}", path.display());
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
