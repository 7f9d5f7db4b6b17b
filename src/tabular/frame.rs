//! Column table of the exambirulobin and calcium measurements
use crate::Utils::logger::save_columns_to_csv;
use crate::error::ExamError;
use csv::ReaderBuilder;
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub const EXAMBIRULOBIN: &str = "exambirulobin";
pub const CALCIUM: &str = "calcium";
pub const DIFF: &str = "diff";
pub const RATIO: &str = "ratio";

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedColumns {
    pub diff: Vec<f64>,
    pub ratio: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValuesFrame {
    exambirulobin: Vec<f64>,
    calcium: Vec<f64>,
    derived: Option<DerivedColumns>,
}

#[derive(Tabled)]
struct RowView {
    #[tabled(rename = "")]
    index: usize,
    exambirulobin: f64,
    calcium: f64,
    diff: String,
    ratio: String,
}

impl ValuesFrame {
    pub fn new(exambirulobin: Vec<f64>, calcium: Vec<f64>) -> Result<Self, ExamError> {
        if exambirulobin.len() != calcium.len() {
            return Err(ExamError::InvalidInput(format!(
                "{} exambirulobin values for {} calcium values",
                exambirulobin.len(),
                calcium.len()
            )));
        }
        Ok(ValuesFrame {
            exambirulobin,
            calcium,
            derived: None,
        })
    }

    /// two headerless columns: exambirulobin, calcium
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ExamError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut exambirulobin = Vec::new();
        let mut calcium = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(i + 1);
            if record.len() == 1 && record[0].is_empty() {
                continue;
            }
            if record.len() != 2 {
                return Err(ExamError::Parse {
                    line,
                    column: 0,
                    message: format!("expected 2 fields, found {}", record.len()),
                });
            }
            let mut parsed = [0.0; 2];
            for (column, value) in parsed.iter_mut().enumerate() {
                let field = &record[column];
                *value = field.parse::<f64>().map_err(|err| ExamError::Parse {
                    line,
                    column: column + 1,
                    message: format!("'{}': {}", field, err),
                })?;
            }
            exambirulobin.push(parsed[0]);
            calcium.push(parsed[1]);
        }
        debug!("loaded {} records", exambirulobin.len());
        ValuesFrame::new(exambirulobin, calcium)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, ExamError> {
        let file = File::open(path)?;
        let frame = ValuesFrame::from_reader(file)?;
        info!("{} records read from {}", frame.len(), path.display());
        Ok(frame)
    }

    pub fn len(&self) -> usize {
        self.exambirulobin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exambirulobin.is_empty()
    }

    pub fn exambirulobin(&self) -> &[f64] {
        &self.exambirulobin
    }

    pub fn calcium(&self) -> &[f64] {
        &self.calcium
    }

    pub fn diff(&self) -> Option<&[f64]> {
        self.derived.as_ref().map(|d| d.diff.as_slice())
    }

    pub fn ratio(&self) -> Option<&[f64]> {
        self.derived.as_ref().map(|d| d.ratio.as_slice())
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        match self.derived {
            Some(_) => vec![EXAMBIRULOBIN, CALCIUM, DIFF, RATIO],
            None => vec![EXAMBIRULOBIN, CALCIUM],
        }
    }

    /// adds diff = calcium - exambirulobin and ratio = diff / exambirulobin;
    /// a zero exambirulobin value leaves the ratio undefined and is rejected
    pub fn derive_columns(&mut self) -> Result<(), ExamError> {
        if let Some(row) = self.exambirulobin.iter().position(|&e| e == 0.0) {
            return Err(ExamError::InvalidInput(format!(
                "exambirulobin is zero at row {}: ratio is undefined",
                row
            )));
        }
        let diff: Vec<f64> = self
            .calcium
            .iter()
            .zip(self.exambirulobin.iter())
            .map(|(c, e)| c - e)
            .collect();
        let ratio: Vec<f64> = diff
            .iter()
            .zip(self.exambirulobin.iter())
            .map(|(d, e)| d / e)
            .collect();
        self.derived = Some(DerivedColumns { diff, ratio });
        Ok(())
    }

    /// first n rows rendered as a text table
    pub fn head(&self, n: usize) -> String {
        let rows: Vec<RowView> = (0..self.len().min(n))
            .map(|i| RowView {
                index: i,
                exambirulobin: self.exambirulobin[i],
                calcium: self.calcium[i],
                diff: self
                    .diff()
                    .map(|d| d[i].to_string())
                    .unwrap_or_else(|| "-".to_string()),
                ratio: self
                    .ratio()
                    .map(|r| r[i].to_string())
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::modern_rounded());
        table.to_string()
    }

    pub fn save_csv(&self, path: &Path) -> Result<(), ExamError> {
        let names = self.column_names();
        let mut columns: Vec<&[f64]> = vec![self.exambirulobin.as_slice(), self.calcium.as_slice()];
        if let Some(derived) = &self.derived {
            columns.push(&derived.diff);
            columns.push(&derived.ratio);
        }
        save_columns_to_csv(path, &names, &columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_load_and_derive() {
        let mut frame = ValuesFrame::from_reader("1.0,2.0\n3.0,4.0\n".as_bytes()).unwrap();
        assert_eq!(frame.exambirulobin(), &[1.0, 3.0]);
        assert_eq!(frame.calcium(), &[2.0, 4.0]);
        assert!(frame.ratio().is_none());
        frame.derive_columns().unwrap();
        assert_eq!(frame.diff().unwrap(), &[1.0, 1.0]);
        let ratio = frame.ratio().unwrap();
        assert_eq!(ratio[0], 1.0);
        assert_relative_eq!(ratio[1], 1.0 / 3.0, epsilon = 1e-15);
        assert_eq!(frame.column_names(), vec!["exambirulobin", "calcium", "diff", "ratio"]);
    }

    #[test]
    fn test_zero_exambirulobin_is_rejected() {
        let mut frame = ValuesFrame::from_reader("1.0,2.0\n0.0,4.0\n".as_bytes()).unwrap();
        match frame.derive_columns() {
            Err(ExamError::InvalidInput(msg)) => assert!(msg.contains("row 1")),
            other => panic!("expected an invalid input error, got {:?}", other),
        }
        assert!(frame.ratio().is_none());
    }

    #[test]
    fn test_malformed_field() {
        match ValuesFrame::from_reader("1.0,2.0\n3.0,x\n".as_bytes()) {
            Err(ExamError::Parse { line, column, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, 2);
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_field_count() {
        assert!(matches!(
            ValuesFrame::from_reader("1.0,2.0,3.0\n".as_bytes()),
            Err(ExamError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ValuesFrame::from_csv_path(&dir.path().join("values.csv"));
        assert!(matches!(result, Err(ExamError::Io(_))));
    }

    #[test]
    fn test_head_and_save() {
        let mut frame =
            ValuesFrame::from_reader("1.0,2.0\n2.0,3.0\n4.0,2.0\n8.0,9.0\n".as_bytes()).unwrap();
        let head = frame.head(2);
        assert!(head.contains("exambirulobin"));
        assert!(head.contains('-'));
        frame.derive_columns().unwrap();
        let head = frame.head(2);
        assert!(head.contains("0.5"));
        assert!(!head.contains("-0.5"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values_derived.csv");
        frame.save_csv(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("exambirulobin,calcium,diff,ratio"));
        assert_eq!(lines.next(), Some("1,2,1,1"));
        assert_eq!(content.lines().count(), 5);
    }

    #[test]
    fn test_new_rejects_unequal_columns() {
        assert!(ValuesFrame::new(vec![1.0], vec![]).is_err());
    }
}
