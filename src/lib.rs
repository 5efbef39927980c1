//! # Temperature sensors logs parser
//!
//! Normalizes the temperature logs of the oven control loop into a single table of
//! `(variable, temperature, datetime)` readings sorted by date and time.
//! Two log formats are supported:
//!  - camonitor logs of the IOC process variables ([ioc]),
//!  - iTools spreadsheet exports of the Eurotherm controller ([itools]).
//!
//! ```no_run
//! use parse_sensors::Source;
//!
//! let readings = "itools".parse::<Source>()?.load("data/20250602/raw/20250602.csv")?;
//! readings.summary();
//! # Ok::<(), parse_sensors::Error>(())
//! ```

pub mod error;
pub mod ioc;
pub mod itools;
pub mod readings;
pub mod source;
pub mod timestamp;

pub use error::Error;
pub use ioc::IocLoader;
pub use itools::ItoolsLoader;
pub use readings::{Reading, Readings};
pub use source::Source;

pub type Result<T> = std::result::Result<T, Error>;

/// Loads the file at `path` written in the `source` format
///
/// `source` is either `ioc` or `itools`.
pub fn load<P: AsRef<std::path::Path>>(source: &str, path: P) -> Result<Readings> {
    source.parse::<Source>()?.load(path)
}
