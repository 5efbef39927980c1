use crate::timestamp;
use chrono::NaiveDateTime;
#[cfg(feature = "plot")]
use plotters::prelude::*;
use serde::Serialize;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum ReadingsError {
    #[error("Failed to write the CSV file")]
    Csv(#[from] csv::Error),
    #[error("Failed to write the file")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "plot")]
    #[error("Failed to draw the plot: {0}")]
    Plot(String),
    #[error("No readings to plot")]
    Empty,
}
type Result<T> = std::result::Result<T, ReadingsError>;

#[derive(Serialize)]
struct Record<'a> {
    variable: &'a str,
    temperature: f64,
    datetime: String,
}

/// A single temperature sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// index into [Readings::variables]
    pub(crate) variable: usize,
    pub temperature: f64,
    pub datetime: NaiveDateTime,
}

/// The canonical `(variable, temperature, datetime)` table
///
/// Variables are categorical: each label is stored once, in first-seen order,
/// and every reading refers to it by index.
#[derive(Debug, Default, Clone)]
pub struct Readings {
    variables: Vec<String>,
    readings: Vec<Reading>,
}
impl Readings {
    /// Appends a reading, registering the variable label if it is new
    pub fn push<S: AsRef<str>>(&mut self, variable: S, temperature: f64, datetime: NaiveDateTime) {
        let variable = self.category(variable.as_ref());
        self.readings.push(Reading {
            variable,
            temperature,
            datetime,
        });
    }
    fn category(&mut self, label: &str) -> usize {
        match self.variables.iter().position(|v| v == label) {
            Some(idx) => idx,
            None => {
                self.variables.push(label.to_string());
                self.variables.len() - 1
            }
        }
    }
    /// Sorts the readings by ascending date and time, keeping the order of equal timestamps
    pub fn sort_by_datetime(&mut self) -> &mut Self {
        self.readings.sort_by_key(|r| r.datetime);
        self
    }
    pub fn len(&self) -> usize {
        self.readings.len()
    }
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
    /// The variable labels
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
    /// The label of a reading, `None` if the reading belongs to another table
    pub fn label(&self, reading: &Reading) -> Option<&str> {
        self.variables.get(reading.variable).map(String::as_str)
    }
    /// Iterator over `(variable, temperature, datetime)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64, NaiveDateTime)> + '_ {
        self.readings
            .iter()
            .map(move |r| (self.variables[r.variable].as_str(), r.temperature, r.datetime))
    }
    /// Iterator over the readings of one variable
    pub fn series<'a>(&'a self, variable: &str) -> impl Iterator<Item = &'a Reading> + 'a {
        let idx = self.variables.iter().position(|v| v == variable);
        self.readings
            .iter()
            .filter(move |r| Some(r.variable) == idx)
    }
    /// Returns the earliest and latest timestamps
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.readings.iter().map(|r| r.datetime).min()?;
        let last = self.readings.iter().map(|r| r.datetime).max()?;
        Some((first, last))
    }
    /// Returns the temperature range
    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        Some((
            self.temperature_iter().fold(f64::INFINITY, f64::min),
            self.temperature_iter().fold(f64::NEG_INFINITY, f64::max),
        ))
    }
    pub fn temperature_iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().map(|r| r.temperature)
    }
    /// Seconds elapsed since the earliest timestamp, for each reading
    pub fn elapsed_seconds(&self) -> Vec<f64> {
        match self.time_range() {
            Some((t0, _)) => self
                .readings
                .iter()
                .map(|r| elapsed(t0, r.datetime))
                .collect(),
            None => vec![],
        }
    }
    /// Axis limits for the elapsed time and the temperature, rounded and padded by 1
    pub fn plot_limits(&self) -> Option<((f64, f64), (f64, f64))> {
        let (t0, t1) = self.time_range()?;
        let (temp_min, temp_max) = self.temperature_range()?;
        Some((
            (-1., elapsed(t0, t1).round() + 1.),
            (temp_min.round() - 1., temp_max.round() + 1.),
        ))
    }
    pub fn summary(&self) {
        let stats = |x: &[f64]| {
            let n = x.len() as f64;
            let mean = x.iter().sum::<f64>() / n;
            let std = (x.iter().map(|x| x - mean).fold(0f64, |s, x| s + x * x) / n).sqrt();
            (mean, std)
        };
        let minmax = |x: &[f64]| {
            (
                x.iter().cloned().fold(f64::INFINITY, f64::min),
                x.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            )
        };

        println!("SUMMARY:");
        println!(" - # of records: {}", self.len());
        if let Some((t0, t1)) = self.time_range() {
            println!(
                " - time range: [{} - {}] ({:.0}s)",
                timestamp::format(&t0),
                timestamp::format(&t1),
                elapsed(t0, t1)
            );
        }
        println!(" - # of variables: {}", self.variables.len());
        println!(" - Temperature:");
        println!(
            "    {:^32}: {:>6} ({:^9}, {:^9})  ({:^9}, {:^9})",
            "VARIABLE", "#", "MEAN", "STD", "MIN", "MAX"
        );
        for variable in &self.variables {
            let values: Vec<f64> = self.series(variable).map(|r| r.temperature).collect();
            println!(
                "  - {:32}: {:>6} {:>9.3?}  {:>9.3?}",
                variable,
                values.len(),
                stats(&values),
                minmax(&values)
            );
        }
    }
    /// Writes the table to a CSV file with a `variable,temperature,datetime` header
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        for (variable, temperature, datetime) in self.iter() {
            wtr.serialize(Record {
                variable,
                temperature,
                datetime: timestamp::format(&datetime),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
    /// Plots the temperature of each variable against the elapsed time into a SVG file
    ///
    /// The variable `skip_variable` is left out of the plot.
    #[cfg(feature = "plot")]
    pub fn plot<P: AsRef<Path>>(&self, path: P, skip_variable: Option<&str>) -> Result<()> {
        let (t0, _) = self.time_range().ok_or(ReadingsError::Empty)?;
        let (x_lim, y_lim) = self.plot_limits().ok_or(ReadingsError::Empty)?;
        let plot_err = |e: &dyn std::fmt::Display| ReadingsError::Plot(e.to_string());

        let plot = SVGBackend::new(path.as_ref(), (1300, 800)).into_drawing_area();
        plot.fill(&WHITE).map_err(|e| plot_err(&e))?;

        let mut chart = ChartBuilder::on(&plot)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .margin(10)
            .build_cartesian_2d(x_lim.0..x_lim.1, y_lim.0..y_lim.1)
            .map_err(|e| plot_err(&e))?;
        chart
            .configure_mesh()
            .x_desc("elapsed_seconds")
            .y_desc("temperature")
            .draw()
            .map_err(|e| plot_err(&e))?;

        let colors = colorous::TABLEAU10.iter().cycle();
        for ((idx, variable), color) in self.variables.iter().enumerate().zip(colors) {
            if Some(variable.as_str()) == skip_variable {
                continue;
            }
            let rgb = RGBColor(color.r, color.g, color.b);
            chart
                .draw_series(LineSeries::new(
                    self.readings
                        .iter()
                        .filter(|r| r.variable == idx)
                        .map(|r| (elapsed(t0, r.datetime), r.temperature)),
                    &rgb,
                ))
                .map_err(|e| plot_err(&e))?
                .label(variable)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &rgb));
        }
        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(|e| plot_err(&e))?;
        plot.present().map_err(|e| plot_err(&e))?;
        Ok(())
    }
}

fn elapsed(t0: NaiveDateTime, t: NaiveDateTime) -> f64 {
    (t - t0).num_microseconds().unwrap_or(i64::MAX) as f64 * 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn at(s: &str) -> NaiveDateTime {
        timestamp::parse(s).unwrap()
    }

    fn sample() -> Readings {
        let mut readings = Readings::default();
        readings.push("process_value", 21.5, at("2025-06-02 10:00:10"));
        readings.push("working_set_point", 25.0, at("2025-06-02 10:00:00"));
        readings.push("process_value", 22.4, at("2025-06-02 10:00:00"));
        readings.push("working_set_point", 25.0, at("2025-06-02 10:00:10"));
        readings
    }

    #[test]
    fn categories_in_first_seen_order() {
        let readings = sample();
        assert_eq!(readings.variables(), ["process_value", "working_set_point"]);
        assert_eq!(readings.series("process_value").count(), 2);
        assert_eq!(readings.series("unknown").count(), 0);
    }

    #[test]
    fn stable_sort() {
        let mut readings = sample();
        readings.sort_by_datetime();
        let rows: Vec<_> = readings.iter().map(|(v, t, _)| (v, t)).collect();
        assert_eq!(
            rows,
            vec![
                ("working_set_point", 25.0),
                ("process_value", 22.4),
                ("process_value", 21.5),
                ("working_set_point", 25.0),
            ]
        );
    }

    #[test]
    fn elapsed_and_limits() {
        let mut readings = sample();
        readings.sort_by_datetime();
        assert_eq!(readings.elapsed_seconds(), vec![0., 0., 10., 10.]);
        let (x_lim, y_lim) = readings.plot_limits().unwrap();
        assert_eq!(x_lim, (-1., 11.));
        assert_eq!(y_lim, (21., 26.));
    }

    #[test]
    fn label_from_another_table() {
        let readings = sample();
        let mut other = Readings::default();
        other.push("ambient", 19.0, at("2025-06-02 10:00:00"));
        let pv = readings.series("working_set_point").next().unwrap();
        assert_eq!(readings.label(pv), Some("working_set_point"));
        assert_eq!(other.label(pv), None);
    }

    #[test]
    fn empty_table() {
        let readings = Readings::default();
        assert!(readings.is_empty());
        assert!(readings.time_range().is_none());
        assert!(readings.plot_limits().is_none());
        assert!(readings.elapsed_seconds().is_empty());
    }

    #[cfg(feature = "plot")]
    #[test]
    fn plot_svg() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("readings.svg");
        sample()
            .sort_by_datetime()
            .plot(&path, Some("working_set_point"))?;
        assert!(std::fs::read_to_string(&path)?.contains("process_value"));
        Ok(())
    }

    #[test]
    fn csv_write_out() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("processed.csv");
        let mut readings = sample();
        readings.sort_by_datetime().to_csv(&path)?;
        let contents = std::fs::read_to_string(&path)?;
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("variable,temperature,datetime"));
        assert_eq!(
            lines.next(),
            Some("working_set_point,25.0,2025-06-02 10:00:00.000000")
        );
        assert_eq!(lines.count(), 3);
        Ok(())
    }
}
