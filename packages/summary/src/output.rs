//! Writes the summary tables into the data directory.

use std::path::Path;

use serde::Serialize;
use taxi_nbhd_storage::paths;

use crate::SummaryError;
use crate::aggregate::{PickupsHdlRow, Summaries};
use crate::weather::WeatherTable;

/// Writes every table as gzip CSV under `data_dir`, joining `weather` onto
/// the neighborhood table when given.
///
/// # Errors
///
/// Returns [`SummaryError`] if any file cannot be written.
pub fn write_summaries(
    data_dir: &Path,
    summaries: &Summaries,
    weather: Option<&WeatherTable>,
) -> Result<(), SummaryError> {
    write_rows(&data_dir.join(paths::PICKUPS_HD_FILE), &summaries.pickups_hd)?;
    write_rows(&data_dir.join(paths::PICKUPS_HR_FILE), &summaries.pickups_hr)?;
    write_rows(&data_dir.join(paths::DATE_AVGS_FILE), &summaries.date_avgs)?;
    write_neighborhood_rows(
        &data_dir.join(paths::PICKUPS_HDL_FILE),
        &summaries.pickups_hdl,
        weather,
    )
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), SummaryError> {
    taxi_nbhd_storage::io::write_atomic(path, |out| {
        let mut wtr = csv::Writer::from_writer(out);
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok::<_, SummaryError>(())
    })?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes the neighborhood table, with weather columns between the
/// holiday flag and the calendar columns. Dates without weather get
/// blank cells.
///
/// # Errors
///
/// Returns [`SummaryError`] if the file cannot be written.
pub fn write_neighborhood_rows(
    path: &Path,
    rows: &[PickupsHdlRow],
    weather: Option<&WeatherTable>,
) -> Result<(), SummaryError> {
    let weather_columns = weather.map_or(&[][..], WeatherTable::columns);
    let blanks = vec![String::new(); weather_columns.len()];

    taxi_nbhd_storage::io::write_atomic(path, |out| {
        let mut wtr = csv::Writer::from_writer(out);

        let mut header = vec!["borough", "neighborhood", "date", "hour", "passenger_count", "holiday"];
        header.extend(weather_columns.iter().map(String::as_str));
        header.extend(["day_of_week", "month"]);
        wtr.write_record(&header)?;

        for row in rows {
            let values = weather
                .and_then(|w| w.row(row.date))
                .unwrap_or(blanks.as_slice());

            let mut record = vec![
                row.label.borough.clone(),
                row.label.neighborhood.clone(),
                row.date.format("%Y-%m-%d").to_string(),
                row.hour.to_string(),
                row.passenger_count.to_string(),
                u8::from(row.holiday).to_string(),
            ];
            record.extend(values.iter().cloned());
            record.push(row.day_of_week.to_string());
            record.push(row.month.to_string());
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok::<_, SummaryError>(())
    })?;

    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
