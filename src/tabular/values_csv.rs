//! Plain line-by-line reading of the measurements file
use crate::error::ExamError;
use nalgebra::DVector;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// first comma separated field of every non-blank line as f64
pub fn read_first_column<R: Read>(reader: R) -> Result<DVector<f64>, ExamError> {
    let mut values = Vec::new();
    for (i, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let field = line.split(',').next().unwrap_or("").trim();
        let value = field.parse::<f64>().map_err(|err| ExamError::Parse {
            line: i + 1,
            column: 1,
            message: format!("'{}': {}", field, err),
        })?;
        values.push(value);
    }
    Ok(DVector::from_vec(values))
}

pub fn read_first_column_from_path(path: &Path) -> Result<DVector<f64>, ExamError> {
    let file = File::open(path)?;
    read_first_column(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_first_column() {
        let data = "1.0,2.0\n3.0,4.0\n";
        let column = read_first_column(data.as_bytes()).unwrap();
        assert_eq!(column.as_slice(), &[1.0, 3.0]);
    }

    #[test]
    fn test_blank_lines_and_spaces() {
        let data = " 1.5 , 2.0\n\n-3e-2,4.0\r\n";
        let column = read_first_column(data.as_bytes()).unwrap();
        assert_eq!(column.as_slice(), &[1.5, -0.03]);
    }

    #[test]
    fn test_malformed_value_reports_line() {
        let data = "1.0,2.0\nabc,4.0\n";
        match read_first_column(data.as_bytes()) {
            Err(ExamError::Parse { line, column, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, 1);
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_first_column_from_path(&dir.path().join("values.csv"));
        assert!(matches!(result, Err(ExamError::Io(_))));
    }
}
