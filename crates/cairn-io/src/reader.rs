//! CSV sample reader with input validation.

use std::path::{Path, PathBuf};

use cairn_tree::{Label, Sample};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads labelled samples from a CSV file.
///
/// Expected format:
/// - An optional header row, skipped without inspection (on by default)
/// - `label,x0,x1,...,xn` with an integer label in the first column
/// - Every data row has the same number of columns as the first data row
///
/// Blank lines are skipped and fields are trimmed.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::NoFeatureColumns`] | First data row has only a label |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than the first row |
/// | [`IoError::InvalidLabel`] | Label is not an integer |
/// | [`IoError::NonFiniteValue`] | Feature is NaN, Inf, or unparseable float |
#[derive(Debug, Clone)]
pub struct SampleReader {
    path: PathBuf,
    max_rows: Option<usize>,
    header: bool,
}

impl SampleReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            max_rows: None,
            header: true,
        }
    }

    /// Stop after `max_rows` samples. `None` reads the whole file.
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Whether the first line is a header to skip (default `true`).
    #[must_use]
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Return the configured row limit.
    #[must_use]
    pub fn max_rows(&self) -> Option<usize> {
        self.max_rows
    }

    /// Read and validate the CSV file.
    #[instrument(skip(self), fields(path = %self.path.display(), max_rows = ?self.max_rows))]
    pub fn read(&self) -> Result<Vec<Sample>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so that InconsistentRowLength fires instead of CsvParse.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let limit = self.max_rows.unwrap_or(usize::MAX);
        let mut expected_cols = None;
        let mut samples = Vec::new();

        for result in rdr.records() {
            if samples.len() >= limit {
                break;
            }
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let row_index = samples.len();

            let expected = *expected_cols.get_or_insert(record.len());
            if expected < 2 {
                return Err(IoError::NoFeatureColumns {
                    path: self.path.clone(),
                });
            }
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }

            let raw_label = record.get(0).unwrap_or("");
            let label: i64 = raw_label.parse().map_err(|_| IoError::InvalidLabel {
                path: self.path.clone(),
                row_index,
                raw: raw_label.to_string(),
            })?;

            let features = record
                .iter()
                .skip(1)
                .enumerate()
                .map(|(col_index, raw)| {
                    raw.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| IoError::NonFiniteValue {
                            path: self.path.clone(),
                            row_index,
                            col_index,
                            raw: raw.to_string(),
                        })
                })
                .collect::<Result<Vec<f64>, _>>()?;

            samples.push(Sample::new(features, Label::new(label)));
        }

        if samples.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        if samples.len() == limit {
            debug!(limit, "row limit reached");
        }

        info!(
            n_samples = samples.len(),
            n_features = samples[0].features().len(),
            "samples loaded"
        );

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_rows() {
        let csv = "label,x0,x1,x2\n3,0.0,0.5,1.0\n7,1.5,2.0,2.5\n3,3.0,3.5,4.0\n";
        let f = write_csv(csv);
        let samples = SampleReader::new(f.path()).read().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].label(), Label::new(3));
        assert_eq!(samples[1].label(), Label::new(7));
        assert_eq!(samples[1].features(), &[1.5, 2.0, 2.5]);
    }

    #[test]
    fn value_round_trip() {
        let csv = "label,x0,x1\n-4,1.23456789,9.87654321\n";
        let f = write_csv(csv);
        let samples = SampleReader::new(f.path()).read().unwrap();
        assert_eq!(samples[0].label(), Label::new(-4));
        let vals = samples[0].features();
        assert!((vals[0] - 1.23456789).abs() < 1e-12);
        assert!((vals[1] - 9.87654321).abs() < 1e-12);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let csv = "label,x0,x1\n 1 , 2.0 ,3.0\n";
        let f = write_csv(csv);
        let samples = SampleReader::new(f.path()).read().unwrap();
        assert_eq!(samples[0].label(), Label::new(1));
        assert_eq!(samples[0].features(), &[2.0, 3.0]);
    }

    #[test]
    fn max_rows_truncates() {
        let csv = "label,x0\n0,1.0\n1,2.0\n2,3.0\n3,4.0\n";
        let f = write_csv(csv);
        let samples = SampleReader::new(f.path())
            .with_max_rows(Some(2))
            .read()
            .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].label(), Label::new(1));
    }

    #[test]
    fn max_rows_larger_than_file() {
        let csv = "label,x0\n0,1.0\n1,2.0\n";
        let f = write_csv(csv);
        let samples = SampleReader::new(f.path())
            .with_max_rows(Some(1000))
            .read()
            .unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn headerless_file() {
        let csv = "5,1.0,2.0\n6,3.0,4.0\n";
        let f = write_csv(csv);
        let samples = SampleReader::new(f.path())
            .with_header(false)
            .read()
            .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label(), Label::new(5));
    }

    #[test]
    fn header_is_not_inspected() {
        // The header may have a different width than the data.
        let csv = "pixels\n1,0.0,0.0,0.0\n";
        let f = write_csv(csv);
        let samples = SampleReader::new(f.path()).read().unwrap();
        assert_eq!(samples[0].features().len(), 3);
    }

    #[test]
    fn error_file_not_found() {
        let result = SampleReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let csv = "label,x0,x1\n";
        let f = write_csv(csv);
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_no_feature_columns() {
        let csv = "label\n1\n2\n";
        let f = write_csv(csv);
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NoFeatureColumns { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let csv = "label,x0,x1\n0,1.0,2.0\n1,1.0\n";
        let f = write_csv(csv);
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength {
                row_index: 1,
                expected: 3,
                got: 2,
                ..
            })
        ));
    }

    #[test]
    fn error_invalid_label() {
        let csv = "label,x0\n1.5,2.0\n";
        let f = write_csv(csv);
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::InvalidLabel { row_index: 0, .. })));
    }

    #[test]
    fn error_non_finite_nan() {
        let csv = "label,x0,x1\n0,1.0,NaN\n";
        let f = write_csv(csv);
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NonFiniteValue { col_index: 1, .. })
        ));
    }

    #[test]
    fn error_non_finite_inf() {
        let csv = "label,x0,x1\n0,inf,1.0\n";
        let f = write_csv(csv);
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NonFiniteValue { col_index: 0, .. })
        ));
    }

    #[test]
    fn error_unparseable_value() {
        let csv = "label,x0,x1\n0,1.0,abc\n";
        let f = write_csv(csv);
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { .. })));
    }
}
