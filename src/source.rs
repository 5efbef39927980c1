use crate::{ioc::IocLoader, itools::ItoolsLoader, Error, Readings};
use flate2::read::GzDecoder;
use std::{
    fmt,
    fs::File,
    io::{self, Read},
    path::Path,
    str::FromStr,
};
use strum_macros::EnumIter;

/// Sensor log formats
#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// camonitor log of the IOC process variables
    Ioc,
    /// iTools spreadsheet export
    Itools,
}
impl Source {
    /// Loads the canonical table from the file at `path` with the matching loader
    pub fn load<P: AsRef<Path>>(&self, path: P) -> crate::Result<Readings> {
        match self {
            Source::Ioc => Ok(IocLoader::default().data_path(path).load()?),
            Source::Itools => Ok(ItoolsLoader::default().data_path(path).load()?),
        }
    }
}
impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ioc" => Ok(Source::Ioc),
            "itools" => Ok(Source::Itools),
            _ => Err(Error::Source(s.to_string())),
        }
    }
}
impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Ioc => write!(f, "ioc"),
            Source::Itools => write!(f, "itools"),
        }
    }
}

/// Reads the whole file in memory, gunzipping files with the `gz` extension
pub fn read_contents<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut contents = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(file).read_to_string(&mut contents)?;
    } else {
        file.read_to_string(&mut contents)?;
    }
    Ok(contents)
}
