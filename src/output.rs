//! Output formatters for the earthquake list.
//!
//! Supports human-readable (with colored badges), JSON, and NDJSON formats.

use std::fmt;
use std::io::{self, Write};

use chrono::TimeZone;

use crate::presenter::{EarthquakeAdapter, RowFields};

// ANSI codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const WHITE: &str = "\x1b[97m";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Write one bound row.
///
/// Format: ` 6.1  86km NE of  Rincon, Puerto Rico   Feb 02, 2016  12:00 AM`
fn write_row<W: Write>(writer: &mut W, row: &RowFields) -> io::Result<()> {
    let badge = row.badge_color.ansi_bg();
    writeln!(
        writer,
        "{badge}{WHITE}{BOLD} {mag:>4} {RESET} \
         {DIM}{offset:<14}{RESET} \
         {location:<40} \
         {date} {DIM}{time:>8}{RESET}",
        mag = row.magnitude,
        offset = row.location_offset,
        location = row.location,
        date = row.date,
        time = row.time,
    )
}

/// Write rows in human-readable format.
///
/// A single row resource is rebound for every position.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W, Tz>(writer: &mut W, adapter: &EarthquakeAdapter<Tz>) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if adapter.is_empty() {
        writeln!(writer, "{DIM}No earthquakes found{RESET}")?;
        return Ok(());
    }

    let mut row = RowFields::default();
    for position in 0..adapter.len() {
        let Some(bound) = adapter.get_view(position, Some(row)) else {
            break;
        };
        write_row(writer, &bound)?;
        row = bound;
    }
    Ok(())
}

/// Write records as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W, Tz>(writer: &mut W, adapter: &EarthquakeAdapter<Tz>) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let json = serde_json::to_string_pretty(adapter.earthquakes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write records as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W, Tz>(writer: &mut W, adapter: &EarthquakeAdapter<Tz>) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    for quake in adapter.earthquakes() {
        let json = serde_json::to_string(quake)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write the list in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W, Tz>(
    writer: &mut W,
    adapter: &EarthquakeAdapter<Tz>,
    format: Format,
) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match format {
        Format::Human => write_human(writer, adapter),
        Format::Json => write_json(writer, adapter),
        Format::Ndjson => write_ndjson(writer, adapter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Earthquake;
    use crate::presenter::Palette;
    use chrono::Utc;

    fn adapter() -> EarthquakeAdapter<Utc> {
        EarthquakeAdapter::new(
            vec![
                Earthquake::new(6.14, "86km NE of Rincon, Puerto Rico", 1_454_371_200_000, "u1"),
                Earthquake::new(2.3, "Pacific-Antarctic Ridge", 1_454_371_200_000, "u2"),
            ],
            Palette::default(),
            Utc,
        )
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_human_rows() {
        let mut out = Vec::new();
        write_human(&mut out, &adapter()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\x1b[48;2;252;102;68m"));
        assert!(lines[0].contains(" 6.1 "));
        assert!(lines[0].contains("86km NE of"));
        assert!(lines[0].contains("Rincon, Puerto Rico"));
        assert!(lines[0].contains("Feb 02, 2016"));
        assert!(lines[0].contains("12:00 AM"));
        assert!(lines[1].contains("Near the"));
        assert!(lines[1].contains("Pacific-Antarctic Ridge"));
    }

    #[test]
    fn test_human_empty() {
        let empty = EarthquakeAdapter::new(Vec::new(), Palette::default(), Utc);
        let mut out = Vec::new();
        write_human(&mut out, &empty).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No earthquakes found"));
    }

    #[test]
    fn test_ndjson_one_record_per_line() {
        let mut out = Vec::new();
        write_ndjson(&mut out, &adapter()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["place"], "86km NE of Rincon, Puerto Rico");
        assert_eq!(first["time"], 1_454_371_200_000_i64);
        assert_eq!(first["url"], "u1");
    }

    #[test]
    fn test_json_array() {
        let mut out = Vec::new();
        write_events(&mut out, &adapter(), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }
}
