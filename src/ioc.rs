//! camonitor logs of the IOC process variables
//!
//! Each line holds a process variable sample:
//! ```text
//! QUA:B:EU3508:LOOP1:PV:RBV 2025-06-02 10:15:32.123456 23.5 [status severity]
//! ```
//! with no header and any trailing alarm columns ignored.

use crate::{source, timestamp, Readings};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(thiserror::Error, Debug)]
pub enum IocError {
    #[error("Failed to open the IOC log")]
    Io(#[from] std::io::Error),
    #[error("Failed to read the IOC log")]
    Csv(#[from] csv::Error),
    #[error("line {line}: missing the {column} column")]
    ColumnNotFound { line: u64, column: &'static str },
    #[error("line {line}: invalid date and time")]
    Timestamp {
        line: u64,
        #[source]
        source: timestamp::TimestampError,
    },
    #[error(r#"line {line}: temperature "{text}" is not a number"#)]
    Temperature { line: u64, text: String },
}
type Result<T> = std::result::Result<T, IocError>;

const COLUMNS: [&str; 4] = ["variable", "date", "time", "temperature"];

pub struct IocLoader {
    path: PathBuf,
}
impl Default for IocLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from("camonitor.txt"),
        }
    }
}
impl IocLoader {
    pub fn data_path<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
    /// Loads the log file into the canonical table
    pub fn load(self) -> Result<Readings> {
        log::info!("Loading {:?}...", self.path);
        let now = Instant::now();
        let contents = source::read_contents(&self.path)?;
        let readings = Self::parse(&contents)?;
        log::info!(
            "... loaded {} readings in {}ms",
            readings.len(),
            now.elapsed().as_millis()
        );
        Ok(readings)
    }
    /// Parses the log contents into the canonical table
    pub fn parse(contents: &str) -> Result<Readings> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());

        let mut readings = Readings::default();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            // runs of spaces yield empty fields
            let fields: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
            if let Some(&column) = COLUMNS.get(fields.len()) {
                return Err(IocError::ColumnNotFound { line, column });
            }
            let datetime = timestamp::parse(format!("{} {}", fields[1], fields[2]))
                .map_err(|source| IocError::Timestamp { line, source })?;
            let temperature = fields[3]
                .parse::<f64>()
                .map_err(|_| IocError::Temperature {
                    line,
                    text: fields[3].to_string(),
                })?;
            readings.push(fields[0], temperature, datetime);
        }
        readings.sort_by_datetime();
        Ok(readings)
    }
}
