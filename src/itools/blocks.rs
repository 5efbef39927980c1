//! Splitting of the iTools export into header blocks
//!
//! iTools paginates long exports by repeating the header row in the middle of the data.
//! The columns below a repeated header are named by that header, until the next one.

use super::{ItoolsError, Result};
use csv::StringRecord;
use itertools::Itertools;
use regex::Regex;

/// The export row marker column
pub const DATE_TIME: &str = "Date/Time";

/// A header cell
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// The `Date/Time` marker column
    DateTime,
    /// A sample timestamp column, numbered in first-seen order: `Timestamp1`, `Timestamp2`, ...
    Timestamp(String),
    /// A sample quality column
    Quality,
    /// A sampled variable
    Value(String),
}

/// Header cells classifier
pub struct Classifier {
    re_timestamp: Regex,
    re_quality: Regex,
}
impl Classifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // repeated names are suffixed with ".1", ".2", ... by some exporters
            re_timestamp: Regex::new(r"^Timestamp(\.\d+)?$")?,
            re_quality: Regex::new(r"^Quality(\.\d+)?$")?,
        })
    }
    pub fn is_timestamp(&self, cell: &str) -> bool {
        self.re_timestamp.is_match(cell.trim())
    }
    /// Builds the [Header] from the cells of a header row
    pub fn header<'a, I>(&self, cells: I) -> Header
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut n_timestamp = 0;
        let columns = cells
            .into_iter()
            .map(str::trim)
            .map(|cell| {
                if cell == DATE_TIME {
                    Column::DateTime
                } else if self.re_timestamp.is_match(cell) {
                    n_timestamp += 1;
                    Column::Timestamp(format!("Timestamp{n_timestamp}"))
                } else if self.re_quality.is_match(cell) {
                    Column::Quality
                } else {
                    Column::Value(cell.to_string())
                }
            })
            .collect();
        Header { columns }
    }
}

/// The columns of a block
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    columns: Vec<Column>,
}
impl Header {
    /// Index of the `Date/Time` column
    pub fn date_time(&self) -> Option<usize> {
        self.columns.iter().position(|c| *c == Column::DateTime)
    }
    /// Number of quality columns
    pub fn n_quality(&self) -> usize {
        self.columns.iter().filter(|c| **c == Column::Quality).count()
    }
    /// Iterator over the `(cell index, column)` that are neither quality nor `Date/Time` columns
    pub fn data_columns(&self) -> impl Iterator<Item = (usize, &Column)> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !matches!(c, Column::Quality | Column::DateTime))
    }
    /// Checks that the columns of the export first row are all there
    pub fn validate(&self) -> Result<usize> {
        let date_time = self
            .date_time()
            .ok_or(ItoolsError::MissingColumn(DATE_TIME))?;
        match self.n_quality() {
            0 => Err(ItoolsError::MissingColumn("Quality")),
            1 => Err(ItoolsError::MissingColumn("Quality.1")),
            _ => Ok(date_time),
        }
    }
}

/// A run of data rows sharing the same [Header]
#[derive(Debug)]
pub struct Block<'a> {
    pub header: Header,
    pub rows: &'a [StringRecord],
}

/// Splits the export into blocks
///
/// A row is a repeated header when its `Date/Time` cell reads `Date/Time` and
/// one of its cells is a timestamp column name.
/// The rows of a repeated header block stop one row short of the next repeated header,
/// that row being the page trailer.
/// The rows before the first repeated header come last, with the export header.
pub fn split<'a>(
    classifier: &Classifier,
    header: Header,
    rows: &'a [StringRecord],
) -> Result<Vec<Block<'a>>> {
    let date_time = header.validate()?;
    let is_header = |row: &StringRecord| {
        row.get(date_time).map(str::trim) == Some(DATE_TIME)
            && row.iter().any(|cell| classifier.is_timestamp(cell))
    };
    let markers: Vec<usize> = rows.iter().positions(is_header).collect();
    log::debug!("{} repeated header(s) at rows {:?}", markers.len(), markers);

    let mut blocks: Vec<Block> = markers
        .iter()
        .enumerate()
        .map(|(i, &j)| {
            let start = j + 1;
            let end = markers
                .get(i + 1)
                .map_or(rows.len(), |&next| next.saturating_sub(1))
                .clamp(start.min(rows.len()), rows.len());
            Block {
                header: classifier.header(rows[j].iter()),
                rows: &rows[start.min(rows.len())..end],
            }
        })
        .collect();
    let leading = markers.first().copied().unwrap_or(rows.len());
    blocks.push(Block {
        header,
        rows: &rows[..leading],
    });
    blocks
        .iter()
        .for_each(|block| log::debug!("block of {} rows", block.rows.len()));
    Ok(blocks)
}
