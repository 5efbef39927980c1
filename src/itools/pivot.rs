//! Wide to long reshaping of the control loop columns

use super::{
    blocks::{Block, Column},
    ItoolsError, Result,
};
use crate::{timestamp, Readings};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Tag of the control loop columns
pub const LOOP: &str = "Loop.1";

/// Control loop variables
#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopVariable {
    WorkingSetPoint,
    ProcessValue,
}
impl LoopVariable {
    /// The tag identifying the variable in a column name
    pub fn tag(&self) -> &'static str {
        match self {
            LoopVariable::WorkingSetPoint => "WorkingSP",
            LoopVariable::ProcessValue => "PV",
        }
    }
    /// The variable label in the canonical table
    pub fn label(&self) -> &'static str {
        match self {
            LoopVariable::WorkingSetPoint => "working_set_point",
            LoopVariable::ProcessValue => "process_value",
        }
    }
    /// Matches a control loop column name to its variable, the first tag found wins
    pub fn from_column(name: &str) -> Result<Self> {
        LoopVariable::iter()
            .find(|v| name.contains(v.tag()))
            .ok_or_else(|| ItoolsError::UnknownLoopVariable(name.to_string()))
    }
}
impl fmt::Display for LoopVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A control loop value column and its timestamp column
#[derive(Debug, PartialEq)]
pub struct Pair {
    pub variable: String,
    pub value: usize,
    pub timestamp: usize,
}

/// Pairs each control loop column with the timestamp column on its right
pub fn pairs(block: &Block, raw_names: bool) -> Result<Vec<Pair>> {
    let columns: Vec<_> = block.header.data_columns().collect();
    columns
        .iter()
        .enumerate()
        .filter_map(|(k, (idx, column))| match column {
            Column::Value(name) if name.contains(LOOP) => Some((k, *idx, name)),
            _ => None,
        })
        .map(|(k, value, name)| {
            let variable = LoopVariable::from_column(name)?;
            match columns.get(k + 1) {
                Some((timestamp, Column::Timestamp(_))) => Ok(Pair {
                    variable: if raw_names {
                        name.clone()
                    } else {
                        variable.label().to_string()
                    },
                    value,
                    timestamp: *timestamp,
                }),
                _ => Err(ItoolsError::MalformedHeader(name.clone())),
            }
        })
        .collect()
}

/// Appends the control loop samples of a block to the canonical table
///
/// Pairs of empty cells, the padding of a shorter series, are skipped.
pub fn pivot(block: &Block, raw_names: bool, readings: &mut Readings) -> Result<()> {
    let mut n_empty = 0usize;
    for pair in pairs(block, raw_names)? {
        for row in block.rows {
            let line = row.position().map_or(0, |p| p.line());
            let value = row.get(pair.value).unwrap_or_default().trim();
            let datetime = row.get(pair.timestamp).unwrap_or_default().trim();
            if value.is_empty() && datetime.is_empty() {
                n_empty += 1;
                continue;
            }
            let temperature = value
                .replace(',', ".")
                .parse::<f64>()
                .map_err(|_| ItoolsError::Temperature {
                    line,
                    text: value.to_string(),
                })?;
            let datetime = timestamp::parse(datetime)
                .map_err(|source| ItoolsError::Timestamp { line, source })?;
            readings.push(&pair.variable, temperature, datetime);
        }
    }
    if n_empty > 0 {
        log::debug!("skipped {n_empty} empty samples");
    }
    Ok(())
}
