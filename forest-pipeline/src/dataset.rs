use std::io;
use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use crowd_rforest::label_encoder::LabelEncoder;
use crowd_rforest::train::{Row, TARGET_INDEX};
use tracing::{debug, warn};

/// Training rows read from a CSV split, with the encoder of their target
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub rows: Vec<Row>,
    pub label_encoder: LabelEncoder,
}

impl Dataset {
    /// Read a CSV file with a header line.
    ///
    /// Columns 0-2 are features and column 3 is the target. A non-numeric
    /// target column holds condition labels and is encoded with `labels`, or
    /// with an encoder fitted on the column when `labels` is `None`.
    pub fn read(path: impl AsRef<Path>, labels: Option<LabelEncoder>) -> Result<Self> {
        let path = path.as_ref();
        let rdr = std::fs::File::open(path)
            .with_context(|| format!("Could not open dataset {}", path.display()))?;
        Self::from_reader(rdr, labels)
            .with_context(|| format!("Could not read dataset {}", path.display()))
    }

    pub fn from_reader<R: io::Read>(rdr: R, labels: Option<LabelEncoder>) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(rdr);

        let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

        let targets = records
            .iter()
            .filter_map(|r| r.get(TARGET_INDEX))
            .collect::<Vec<_>>();
        let numeric_targets = targets.iter().all(|t| t.parse::<f64>().is_ok());

        let label_encoder = match labels {
            Some(encoder) => encoder,
            None if numeric_targets => {
                warn!("numeric targets without a label encoder, predictions will not decode");
                LabelEncoder::default()
            }
            None => LabelEncoder::fit(&targets),
        };

        let rows = records
            .iter()
            .map(|record| {
                record
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        // Unparseable cells become NaN so the trainer sees the row as malformed
                        let parsed = cell.parse::<f64>().ok();
                        match parsed {
                            Some(v) => v,
                            None if i == TARGET_INDEX => label_encoder
                                .encode(cell)
                                .map(f64::from)
                                .unwrap_or(f64::NAN),
                            None => f64::NAN,
                        }
                    })
                    .collect::<Row>()
            })
            .collect::<Vec<_>>();

        debug!(rows = rows.len(), labels = label_encoder.len(), "dataset read");

        Ok(Self {
            rows,
            label_encoder,
        })
    }
}

/// Parse `sunny=0,rainy=1` into an encoder.
///
/// Every label and every code may appear only once, so that decoding an
/// encoded label gives the label back.
pub fn parse_labels(spec: &str) -> Result<LabelEncoder> {
    let mut condition = std::collections::BTreeMap::new();
    let mut codes = std::collections::BTreeMap::new();
    for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (label, code) = pair
            .split_once('=')
            .ok_or_else(|| eyre!("Label {pair:?} is not of the form name=code"))?;
        let code = code
            .trim()
            .parse::<u32>()
            .with_context(|| format!("Label {pair:?} has a non-numeric code"))?;
        let label = label.trim();
        if let Some(previous) = codes.insert(code, label) {
            return Err(eyre!("Code {code} is given to both {previous:?} and {label:?}"));
        }
        if condition.insert(label.to_owned(), code).is_some() {
            return Err(eyre!("Label {label:?} is listed more than once"));
        }
    }
    Ok(LabelEncoder::new(condition))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_column_is_encoded_in_order_of_appearance() {
        let csv = "temperature,humidity,month,condition\n\
                   10.5,70,1,rainy\n\
                   20,45,2,sunny\n\
                   12,80,3,rainy\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), None).unwrap();

        assert_eq!(dataset.label_encoder, LabelEncoder::fit(["rainy", "sunny"]));
        assert_eq!(
            dataset.rows,
            vec![
                vec![10.5, 70.0, 1.0, 0.0],
                vec![20.0, 45.0, 2.0, 1.0],
                vec![12.0, 80.0, 3.0, 0.0],
            ]
        );
    }

    #[test]
    fn given_encoder_is_used() {
        let csv = "t,h,m,condition\n10,70,1,sunny\n";
        let labels = parse_labels("rainy=0, sunny=1").unwrap();
        let dataset = Dataset::from_reader(csv.as_bytes(), Some(labels.clone())).unwrap();
        assert_eq!(dataset.rows, vec![vec![10.0, 70.0, 1.0, 1.0]]);
        assert_eq!(dataset.label_encoder, labels);
    }

    #[test]
    fn numeric_targets_pass_through() {
        let csv = "a,b,c,target\n1,2,3,10\n1,2,3,20\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), None).unwrap();
        assert_eq!(dataset.rows[1], vec![1.0, 2.0, 3.0, 20.0]);
        assert!(dataset.label_encoder.is_empty());
    }

    #[test]
    fn bad_cells_and_short_rows_survive_as_malformed_rows() {
        let csv = "a,b,c,target\n1,oops,3,10\n1,2\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), None).unwrap();
        assert!(dataset.rows[0][1].is_nan());
        assert_eq!(dataset.rows[1], vec![1.0, 2.0]);
    }

    #[test]
    fn malformed_label_spec_is_rejected() {
        assert!(parse_labels("sunny").is_err());
        assert!(parse_labels("sunny=first").is_err());
        assert!(parse_labels("").unwrap().is_empty());
    }

    #[test]
    fn labels_and_codes_must_be_unique() {
        let err = parse_labels("sunny=0,rainy=0").unwrap_err();
        assert!(err.to_string().contains("both \"sunny\" and \"rainy\""));
        assert!(parse_labels("sunny=0,sunny=1").is_err());

        let labels = parse_labels("sunny=0,rainy=1,cloudy=2").unwrap();
        for label in ["sunny", "rainy", "cloudy"] {
            let code = labels.encode(label).unwrap();
            assert_eq!(labels.decode(f64::from(code)), Some(label));
        }
    }
}
