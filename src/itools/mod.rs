//! iTools spreadsheet exports
//!
//! The export is `;` delimited with comma decimals.
//! Every control loop variable has a value column followed by its `Timestamp` and `Quality` columns,
//! and the header row may be repeated further down the file.

use crate::{source, timestamp, Readings};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

mod blocks;
mod pivot;
pub use blocks::{Block, Classifier, Column, Header, DATE_TIME};
pub use pivot::{LoopVariable, Pair, LOOP};

#[derive(thiserror::Error, Debug)]
pub enum ItoolsError {
    #[error("Failed to open the iTools export")]
    Io(#[from] std::io::Error),
    #[error("Failed to read the iTools export")]
    Csv(#[from] csv::Error),
    #[error("invalid header regex")]
    Regex(#[from] regex::Error),
    #[error("the {0} column is missing")]
    MissingColumn(&'static str),
    #[error("{0} is not followed by a timestamp column")]
    MalformedHeader(String),
    #[error(r#"{0} is neither a "WorkingSP" nor a "PV" control loop variable"#)]
    UnknownLoopVariable(String),
    #[error("line {line}: invalid date and time")]
    Timestamp {
        line: u64,
        #[source]
        source: timestamp::TimestampError,
    },
    #[error(r#"line {line}: temperature "{text}" is not a number"#)]
    Temperature { line: u64, text: String },
}
type Result<T> = std::result::Result<T, ItoolsError>;

pub struct ItoolsLoader {
    path: PathBuf,
    raw_names: bool,
}
impl Default for ItoolsLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from("itools.csv"),
            raw_names: false,
        }
    }
}
impl ItoolsLoader {
    pub fn data_path<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..self
        }
    }
    /// Keeps the export column names as variable labels
    pub fn raw_names(self, raw_names: bool) -> Self {
        Self { raw_names, ..self }
    }
    /// Loads the export into the canonical table
    pub fn load(self) -> Result<Readings> {
        log::info!("Loading {:?}...", self.path);
        let now = Instant::now();
        let contents = source::read_contents(&self.path)?;
        let readings = self.parse(&contents)?;
        log::info!(
            "... loaded {} readings in {}ms",
            readings.len(),
            now.elapsed().as_millis()
        );
        Ok(readings)
    }
    /// Parses the export contents into the canonical table
    pub fn parse(&self, contents: &str) -> Result<Readings> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_reader(contents.as_bytes());
        let mut records = rdr.records();

        let classifier = Classifier::new()?;
        let header = match records.next() {
            Some(record) => classifier.header(record?.iter()),
            None => return Err(ItoolsError::MissingColumn(DATE_TIME)),
        };
        let rows = records.collect::<std::result::Result<Vec<_>, csv::Error>>()?;

        let mut readings = Readings::default();
        for block in blocks::split(&classifier, header, &rows)? {
            pivot::pivot(&block, self.raw_names, &mut readings)?;
        }
        readings.sort_by_datetime();
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io::Write};

    const HEADER: &str = "Date/Time;169-254-237-3.ID001-3508.Loop.1.Main.WorkingSP;Timestamp;Quality;169-254-237-3.ID001-3508.Loop.1.Main.PV;Timestamp;Quality";

    fn row(second: usize, wsp: &str, pv: &str) -> String {
        let t = format!("02/06/2025 10:{:02}:{:02}", second / 60, second % 60);
        format!("{t};{wsp};{t};Good;{pv};{t};Good")
    }

    fn export(n_rows: usize) -> String {
        std::iter::once(HEADER.to_string())
            .chain((0..n_rows).map(|i| row(i, "25,0", &format!("{},5", 20 + i % 5))))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn one_hundred_rows() {
        let readings = ItoolsLoader::default().parse(&export(100)).unwrap();
        assert_eq!(readings.len(), 200);
        assert_eq!(readings.variables(), ["working_set_point", "process_value"]);
        assert_eq!(readings.series("working_set_point").count(), 100);
        assert_eq!(readings.series("process_value").count(), 100);
        let datetimes: Vec<_> = readings.iter().map(|(_, _, d)| d).collect();
        assert!(datetimes.windows(2).all(|w| w[0] <= w[1]));
        let (_, temperature, _) = readings.iter().nth(1).unwrap();
        assert_eq!(temperature, 20.5);
    }

    #[test]
    fn raw_names() {
        let readings = ItoolsLoader::default()
            .raw_names(true)
            .parse(&export(3))
            .unwrap();
        assert_eq!(
            readings.variables(),
            [
                "169-254-237-3.ID001-3508.Loop.1.Main.WorkingSP",
                "169-254-237-3.ID001-3508.Loop.1.Main.PV"
            ]
        );
    }

    #[test]
    fn repeated_headers() {
        let contents = [
            HEADER.to_string(),
            row(0, "25,0", "20,0"),
            row(1, "25,0", "20,5"),
            HEADER.to_string(),
            row(2, "26,0", "21,0"),
            row(3, "26,0", "21,5"),
            ";;;;;;".to_string(),
            HEADER.to_string(),
            row(4, "27,0", "22,0"),
        ]
        .join("\n");
        let readings = ItoolsLoader::default().parse(&contents).unwrap();
        // 5 data rows, the page trailer excluded
        assert_eq!(readings.len(), 10);
        let pv: Vec<_> = readings
            .series("process_value")
            .map(|r| r.temperature)
            .collect();
        assert_eq!(pv, vec![20.0, 20.5, 21.0, 21.5, 22.0]);
    }

    #[test]
    fn no_repeated_header() {
        let contents = export(10);
        let readings = ItoolsLoader::default().parse(&contents).unwrap();
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(contents.as_bytes());
        let direct: Vec<f64> = rdr
            .records()
            .map(|r| r.unwrap()[4].replace(',', ".").parse().unwrap())
            .collect();
        let pv: Vec<_> = readings
            .series("process_value")
            .map(|r| r.temperature)
            .collect();
        assert_eq!(pv, direct);
    }

    #[test]
    fn unknown_loop_variable() {
        let contents = format!(
            "Date/Time;169-254-237-3.ID001-3508.Loop.1.Main.Alarm;Timestamp;Quality;169-254-237-3.ID001-3508.Loop.1.Main.PV;Timestamp;Quality\n{}",
            row(0, "1", "20,0")
        );
        match ItoolsLoader::default().parse(&contents) {
            Err(ItoolsError::UnknownLoopVariable(name)) => {
                assert_eq!(name, "169-254-237-3.ID001-3508.Loop.1.Main.Alarm")
            }
            other => panic!("expected an unknown loop variable, got {other:?}"),
        }
    }

    #[test]
    fn invalid_temperature() {
        let contents = format!("{HEADER}\n{}", row(0, "25,0", "n/a"));
        assert!(matches!(
            ItoolsLoader::default().parse(&contents),
            Err(ItoolsError::Temperature { line: 2, .. })
        ));
    }

    #[test]
    fn missing_quality() {
        let contents = "Date/Time;X.Loop.1.PV;Timestamp\n";
        assert!(matches!(
            ItoolsLoader::default().parse(contents),
            Err(ItoolsError::MissingColumn("Quality"))
        ));
    }

    #[test]
    fn empty_export() {
        assert!(matches!(
            ItoolsLoader::default().parse(""),
            Err(ItoolsError::MissingColumn(DATE_TIME))
        ));
    }

    #[test]
    fn load_from_path() -> std::result::Result<(), Box<dyn Error>> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        file.write_all(export(5).as_bytes())?;
        let readings = ItoolsLoader::default().data_path(file.path()).load()?;
        assert_eq!(readings.len(), 10);
        Ok(())
    }
}
