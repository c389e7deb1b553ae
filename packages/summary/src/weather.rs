//! Daily weather observations joined onto the neighborhood summary.
//!
//! The first column of the weather CSV is the observation date; every
//! other column is carried through untouched.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::SummaryError;

/// Date layouts accepted in the first column.
pub const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Weather rows keyed by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherTable {
    columns: Vec<String>,
    rows: HashMap<NaiveDate, Vec<String>>,
}

impl WeatherTable {
    /// Reads a weather CSV.
    ///
    /// Rows with fewer cells than the header are padded with blanks and
    /// extra cells are dropped. When a date repeats, the first row wins.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::InvalidWeatherDate`] if a first cell is not
    /// a date, or an I/O/CSV error if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, SummaryError> {
        let reader = taxi_nbhd_storage::io::open_reader(path)?;
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().skip(1).map(str::to_string).collect();
        let mut rows = HashMap::new();

        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let cell = record.get(0).unwrap_or_default();
            let date = parse_weather_date(cell).ok_or_else(|| SummaryError::InvalidWeatherDate {
                path: path.to_path_buf(),
                line: i as u64 + 2,
                value: cell.to_string(),
            })?;

            let mut values: Vec<String> = record
                .iter()
                .skip(1)
                .take(columns.len())
                .map(str::to_string)
                .collect();
            values.resize(columns.len(), String::new());
            rows.entry(date).or_insert(values);
        }

        log::info!(
            "Loaded {} weather day(s) with {} column(s) from {}",
            rows.len(),
            columns.len(),
            path.display()
        );
        Ok(Self { columns, rows })
    }

    /// Column names after the date column, verbatim.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values for `date`, aligned with [`Self::columns`].
    #[must_use]
    pub fn row(&self, date: NaiveDate) -> Option<&[String]> {
        self.rows.get(&date).map(Vec::as_slice)
    }

    /// Number of dated rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parses a weather date in any of [`DATE_FORMATS`].
#[must_use]
pub fn parse_weather_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
}
