//! CSV serialization of the harvest table.

use crate::extract::UNAVAILABLE;
use crate::harvest::IndicatorRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// Fixed column order of the output artifact.
const HEADERS: [&str; 4] = [
    "municipio",
    "populacao_ultimo_censo",
    "populacao_estimada",
    "densidade_demografica",
];

/// Write the table to `path` as UTF-8 CSV, one row per record in table
/// order. Absent fields render as the unavailability sentinel, never as
/// an empty cell.
pub fn write_csv(path: &Path, table: &[IndicatorRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(HEADERS)?;
    for record in table {
        writer.write_record([
            record.municipality.as_str(),
            record.last_census_population.as_deref().unwrap_or(UNAVAILABLE),
            record.estimated_population.as_deref().unwrap_or(UNAVAILABLE),
            record.density.as_deref().unwrap_or(UNAVAILABLE),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        municipality: &str,
        census: Option<&str>,
        estimated: Option<&str>,
        density: Option<&str>,
    ) -> IndicatorRecord {
        IndicatorRecord {
            municipality: municipality.to_string(),
            last_census_population: census.map(str::to_string),
            estimated_population: estimated.map(str::to_string),
            density: density.map(str::to_string),
        }
    }

    #[test]
    fn writes_header_and_rows_in_table_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = vec![
            record("Porto Velho", Some("548.952"), Some("539.354"), Some("6.59")),
            record("Ji-Paraná", Some("130.009"), Some("131.560"), Some("18.82")),
        ];

        write_csv(&path, &table).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(
            lines,
            [
                "municipio,populacao_ultimo_censo,populacao_estimada,densidade_demografica",
                "Porto Velho,548.952,539.354,6.59",
                "Ji-Paraná,130.009,131.560,18.82",
            ]
        );
    }

    #[test]
    fn absent_fields_render_the_sentinel_not_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = vec![record("Xyz", None, None, Some("6.59"))];

        write_csv(&path, &table).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let row = body.lines().nth(1).unwrap();
        assert_eq!(row, format!("Xyz,{UNAVAILABLE},{UNAVAILABLE},6.59"));
        assert!(!row.contains(",,"));
    }

    #[test]
    fn rerun_over_same_table_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let table = vec![record("Porto Velho", Some("548.952"), None, Some("6.59"))];

        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        write_csv(&a, &table).unwrap();
        write_csv(&b, &table).unwrap();

        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    }
}
