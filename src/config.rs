//! Settings of an exam run, read from a task document
//!
//! ```text
//! model
//! a: 0.1
//! b: 0.02
//! c: 0.03
//! integration
//! t0: 0.0
//! t_end: 15.0
//! dt: 0.01
//! y0: 0.1
//! data
//! path: values.csv
//! sampler
//! backend: metropolis
//! draws: 1000
//! tune: 1000
//! chains: 2
//! seed: 42
//! proposal_sd: 0.5
//! output
//! dir: exam_output
//! plots: true
//! log_level: info
//! log_file: exam.log
//! ```
//! every key is optional, missing keys keep the default value
use crate::Utils::task_parser::{DocumentMap, Value, parse_document};
use crate::error::ExamError;
use crate::numerical::exambirulobin_model::ProteinKinetics;
use crate::statistics::metropolis::MetropolisSampler;
use crate::statistics::model::NormalMeanModel;
use crate::statistics::sampler::SamplerBackend;
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::IntoEnumIterator;

#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationConfig {
    pub t0: f64,
    pub t_end: f64,
    pub dt: f64,
    pub y0: f64,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        IntegrationConfig {
            t0: 0.0,
            t_end: 15.0,
            dt: 0.01,
            y0: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    pub backend: SamplerBackend,
    pub draws: usize,
    pub tune: usize,
    pub chains: usize,
    pub seed: u64,
    pub proposal_sd: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        let metropolis = MetropolisSampler::default();
        SamplerConfig {
            backend: SamplerBackend::Metropolis,
            draws: metropolis.draws,
            tune: metropolis.tune,
            chains: metropolis.chains,
            seed: metropolis.seed,
            proposal_sd: metropolis.proposal_sd,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub plots: bool,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: PathBuf::from("exam_output"),
            plots: true,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExamConfig {
    pub kinetics: ProteinKinetics,
    pub integration: IntegrationConfig,
    pub data_path: PathBuf,
    pub model: NormalMeanModel,
    pub sampler: SamplerConfig,
    pub output: OutputConfig,
}

impl Default for ExamConfig {
    fn default() -> Self {
        ExamConfig {
            kinetics: ProteinKinetics::default(),
            integration: IntegrationConfig::default(),
            data_path: PathBuf::from("values.csv"),
            model: NormalMeanModel::default(),
            sampler: SamplerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

const KNOWN_KEYS: [(&str, &[&str]); 6] = [
    ("model", &["a", "b", "c"]),
    ("integration", &["t0", "t_end", "dt", "y0"]),
    ("data", &["path"]),
    ("bayes", &["prior_mu", "prior_sigma", "likelihood_sigma"]),
    (
        "sampler",
        &["backend", "draws", "tune", "chains", "seed", "proposal_sd"],
    ),
    ("output", &["dir", "plots", "log_level", "log_file"]),
];

fn single<'a>(doc: &'a DocumentMap, section: &str, key: &str) -> Result<Option<&'a Value>, ExamError> {
    match doc.get(section).and_then(|s| s.get(key)) {
        None => Ok(None),
        Some(values) if values.len() == 1 => Ok(Some(&values[0])),
        Some(values) => Err(ExamError::Config(format!(
            "{}.{} expects a single value, got {}",
            section,
            key,
            values.len()
        ))),
    }
}

fn type_error(section: &str, key: &str, expected: &str, value: &Value) -> ExamError {
    ExamError::Config(format!(
        "{}.{} must be {}, got '{}'",
        section, key, expected, value
    ))
}

fn read_float(doc: &DocumentMap, section: &str, key: &str, target: &mut f64) -> Result<(), ExamError> {
    if let Some(value) = single(doc, section, key)? {
        *target = value
            .as_float()
            .ok_or_else(|| type_error(section, key, "a number", value))?;
    }
    Ok(())
}

fn read_count(doc: &DocumentMap, section: &str, key: &str, target: &mut usize) -> Result<(), ExamError> {
    if let Some(value) = single(doc, section, key)? {
        *target = value
            .as_integer()
            .filter(|i| *i >= 0)
            .ok_or_else(|| type_error(section, key, "a non-negative integer", value))?
            as usize;
    }
    Ok(())
}

fn read_text(doc: &DocumentMap, section: &str, key: &str) -> Result<Option<String>, ExamError> {
    Ok(single(doc, section, key)?.map(|value| value.to_string_value()))
}

impl ExamConfig {
    pub fn from_document(doc: &DocumentMap) -> Result<Self, ExamError> {
        for (section, keys) in doc {
            let known = KNOWN_KEYS
                .iter()
                .find(|(name, _)| *name == section.as_str())
                .ok_or_else(|| ExamError::Config(format!("unknown section '{}'", section)))?;
            if let Some(key) = keys.keys().find(|k| !known.1.contains(&k.as_str())) {
                return Err(ExamError::Config(format!(
                    "unknown key '{}' in section '{}'",
                    key, section
                )));
            }
        }

        let mut config = ExamConfig::default();
        read_float(doc, "model", "a", &mut config.kinetics.a)?;
        read_float(doc, "model", "b", &mut config.kinetics.b)?;
        read_float(doc, "model", "c", &mut config.kinetics.c)?;

        read_float(doc, "integration", "t0", &mut config.integration.t0)?;
        read_float(doc, "integration", "t_end", &mut config.integration.t_end)?;
        read_float(doc, "integration", "dt", &mut config.integration.dt)?;
        read_float(doc, "integration", "y0", &mut config.integration.y0)?;

        if let Some(path) = read_text(doc, "data", "path")? {
            config.data_path = PathBuf::from(path);
        }

        read_float(doc, "bayes", "prior_mu", &mut config.model.prior_mu)?;
        read_float(doc, "bayes", "prior_sigma", &mut config.model.prior_sigma)?;
        read_float(doc, "bayes", "likelihood_sigma", &mut config.model.likelihood_sigma)?;

        if let Some(value) = single(doc, "sampler", "backend")? {
            config.sampler.backend =
                SamplerBackend::from_str(&value.to_string_value()).map_err(|_| {
                    let names: Vec<String> = SamplerBackend::iter().map(|b| b.to_string()).collect();
                    type_error("sampler", "backend", &names.join(" or "), value)
                })?;
        }
        read_count(doc, "sampler", "draws", &mut config.sampler.draws)?;
        read_count(doc, "sampler", "tune", &mut config.sampler.tune)?;
        read_count(doc, "sampler", "chains", &mut config.sampler.chains)?;
        let mut seed = config.sampler.seed as usize;
        read_count(doc, "sampler", "seed", &mut seed)?;
        config.sampler.seed = seed as u64;
        read_float(doc, "sampler", "proposal_sd", &mut config.sampler.proposal_sd)?;

        if let Some(dir) = read_text(doc, "output", "dir")? {
            config.output.dir = PathBuf::from(dir);
        }
        if let Some(value) = single(doc, "output", "plots")? {
            config.output.plots = value
                .as_boolean()
                .ok_or_else(|| type_error("output", "plots", "true or false", value))?;
        }
        if let Some(value) = single(doc, "output", "log_level")? {
            config.output.log_level = LevelFilter::from_str(&value.to_string_value())
                .map_err(|_| type_error("output", "log_level", "a log level", value))?;
        }
        if let Some(file) = read_text(doc, "output", "log_file")? {
            config.output.log_file = Some(PathBuf::from(file));
        }
        Ok(config)
    }

    pub fn from_str_document(text: &str) -> Result<Self, ExamError> {
        ExamConfig::from_document(&parse_document(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ExamError> {
        let text = fs::read_to_string(path)?;
        ExamConfig::from_str_document(&text)
    }

    pub fn metropolis(&self) -> MetropolisSampler {
        MetropolisSampler::new(
            self.sampler.draws,
            self.sampler.tune,
            self.sampler.chains,
            self.sampler.seed,
            self.sampler.proposal_sd,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_exam_defaults() {
        let config = ExamConfig::from_str_document("").unwrap();
        assert_eq!(config, ExamConfig::default());
        assert_eq!(config.kinetics, ProteinKinetics::new(0.1, 0.02, 0.03));
        assert_eq!(config.integration.dt, 0.01);
        assert_eq!(config.integration.t_end, 15.0);
        assert_eq!(config.integration.y0, 0.1);
        assert_eq!(config.model, NormalMeanModel::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_full_document() {
        let text = r#"
            model
            a: 0.2
            b: 0
            c: 0.5
            integration
            t_end: 5
            dt: 0.1
            data
            path: data/values.csv
            bayes
            prior_sigma: 2.0
            sampler
            backend: conjugate
            draws: 500
            chains: 4
            seed: 7
            output
            dir: out
            plots: false
            log_level: debug
            log_file: run.log
            "#;
        let config = ExamConfig::from_str_document(text).unwrap();
        assert_eq!(config.kinetics, ProteinKinetics::new(0.2, 0.0, 0.5));
        assert_eq!(config.integration.t_end, 5.0);
        assert_eq!(config.integration.dt, 0.1);
        assert_eq!(config.integration.t0, 0.0);
        assert_eq!(config.data_path, PathBuf::from("data/values.csv"));
        assert_eq!(config.model.prior_sigma, 2.0);
        assert_eq!(config.sampler.backend, SamplerBackend::Conjugate);
        assert_eq!(config.sampler.draws, 500);
        assert_eq!(config.sampler.tune, 1000);
        assert_eq!(config.sampler.chains, 4);
        assert_eq!(config.sampler.seed, 7);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert!(!config.output.plots);
        assert_eq!(config.output.log_level, LevelFilter::Debug);
        assert_eq!(config.output.log_file, Some(PathBuf::from("run.log")));
        assert_eq!(config.metropolis().chains, 4);
    }

    #[test]
    fn test_unknown_section_and_key() {
        assert!(matches!(
            ExamConfig::from_str_document("plotting\nsize: 3\n"),
            Err(ExamError::Config(_))
        ));
        assert!(ExamConfig::from_str_document("model\nd: 3\n").is_err());
    }

    #[test]
    fn test_wrong_value_types() {
        assert!(ExamConfig::from_str_document("model\na: fast\n").is_err());
        assert!(ExamConfig::from_str_document("sampler\ndraws: 1.5\n").is_err());
        assert!(ExamConfig::from_str_document("sampler\ndraws: -3\n").is_err());
        assert!(ExamConfig::from_str_document("sampler\nbackend: nuts\n").is_err());
        assert!(ExamConfig::from_str_document("output\nplots: 1\n").is_err());
        assert!(ExamConfig::from_str_document("model\na: 1, 2\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam.conf");
        std::fs::write(&path, "integration\ny0: 0.5\n").unwrap();
        let config = ExamConfig::from_file(&path).unwrap();
        assert_eq!(config.integration.y0, 0.5);
        assert!(matches!(
            ExamConfig::from_file(&dir.path().join("missing.conf")),
            Err(ExamError::Io(_))
        ));
    }
}
