//! Row binding for the earthquake list.
//!
//! Everything here is pure formatting: a record goes in, text and a badge
//! color come out. Hosts own the row resources and decide how to draw them.

use std::fmt;

use chrono::{DateTime, TimeZone};

use crate::models::Earthquake;

/// Offset text used when a place has no distance prefix.
pub const DEFAULT_OFFSET: &str = "Near the";

/// Marker that identifies a `"<n>km <dir> of <place>"` description.
const DISTANCE_MARKER: &str = "km ";

/// Separator between the distance prefix and the place name.
const OF_MARKER: &str = "of ";

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// ANSI 24-bit background escape for this color.
    #[must_use]
    pub fn ansi_bg(self) -> String {
        format!("\x1b[48;2;{};{};{}m", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// One of the ten severity buckets derived from `floor(magnitude)`.
///
/// Bin 1 covers everything below 2 (including negatives), bin 10 covers
/// everything from 10 up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeverityBin(u8);

impl SeverityBin {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Bin for a magnitude. Total over all `f64`; NaN lands in bin 1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_magnitude(magnitude: f64) -> Self {
        let floor = magnitude.floor();
        if floor.is_nan() || floor <= f64::from(Self::MIN) {
            Self(Self::MIN)
        } else if floor >= f64::from(Self::MAX) {
            Self(Self::MAX)
        } else {
            Self(floor as u8)
        }
    }

    /// Bin number, 1 through 10.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Ten badge colors, one per severity bin, increasing in intensity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette([Color; 10]);

impl Palette {
    /// Badge color for a severity bin.
    #[must_use]
    pub fn color(&self, bin: SeverityBin) -> Color {
        self.0[usize::from(bin.value() - SeverityBin::MIN)]
    }

    /// Badge color for a magnitude.
    #[must_use]
    pub fn color_for(&self, magnitude: f64) -> Color {
        self.color(SeverityBin::from_magnitude(magnitude))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self([
            Color::rgb(0x4A, 0x7B, 0xA7),
            Color::rgb(0x04, 0xB4, 0xB3),
            Color::rgb(0x10, 0xCA, 0xC9),
            Color::rgb(0xF5, 0xA6, 0x23),
            Color::rgb(0xFF, 0x7D, 0x50),
            Color::rgb(0xFC, 0x66, 0x44),
            Color::rgb(0xE7, 0x5F, 0x40),
            Color::rgb(0xE1, 0x3A, 0x20),
            Color::rgb(0xD9, 0x32, 0x18),
            Color::rgb(0xC0, 0x38, 0x23),
        ])
    }
}

/// Writable display slots of one list row.
pub trait QuakeRow {
    fn set_magnitude(&mut self, text: &str);
    fn set_location_offset(&mut self, text: &str);
    fn set_location(&mut self, text: &str);
    fn set_date(&mut self, text: &str);
    fn set_time(&mut self, text: &str);
    fn set_badge_color(&mut self, color: Color);
}

/// Plain row resource holding the bound text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFields {
    pub magnitude: String,
    pub location_offset: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub badge_color: Color,
}

impl Default for RowFields {
    fn default() -> Self {
        Self {
            magnitude: String::new(),
            location_offset: String::new(),
            location: String::new(),
            date: String::new(),
            time: String::new(),
            badge_color: Color::rgb(0, 0, 0),
        }
    }
}

impl QuakeRow for RowFields {
    fn set_magnitude(&mut self, text: &str) {
        text.clone_into(&mut self.magnitude);
    }

    fn set_location_offset(&mut self, text: &str) {
        text.clone_into(&mut self.location_offset);
    }

    fn set_location(&mut self, text: &str) {
        text.clone_into(&mut self.location);
    }

    fn set_date(&mut self, text: &str) {
        text.clone_into(&mut self.date);
    }

    fn set_time(&mut self, text: &str) {
        text.clone_into(&mut self.time);
    }

    fn set_badge_color(&mut self, color: Color) {
        self.badge_color = color;
    }
}

/// Magnitude with one decimal place, rounding halves away from zero.
#[must_use]
pub fn format_magnitude(magnitude: f64) -> String {
    let scaled = magnitude * 10.0;
    if !scaled.is_finite() {
        // Too large to scale; print as is
        return format!("{magnitude:.1}");
    }
    let rounded = scaled.round() / 10.0;
    // Avoid "-0.0" for tiny negative values
    let rounded = if rounded.abs() < f64::EPSILON { 0.0 } else { rounded };
    format!("{rounded:.1}")
}

/// Split a place into `(offset, location)`.
///
/// `"86km NE of Rincon, Puerto Rico"` becomes `("86km NE of", "Rincon, Puerto Rico")`.
/// The offset ends one character before the location starts, so the
/// trailing space of `"of "` belongs to neither half. When `"of "` is
/// missing both cuts fall back to character positions 1 and 2.
#[must_use]
pub fn split_place(place: &str) -> (String, String) {
    if !place.contains(DISTANCE_MARKER) {
        return (DEFAULT_OFFSET.to_string(), place.to_string());
    }

    let (offset_end, location_start) = match place.find(OF_MARKER) {
        Some(i) => (i + 2, i + OF_MARKER.len()),
        None => (char_boundary(place, 1), char_boundary(place, 2)),
    };

    let offset = place.get(..offset_end).unwrap_or(place).trim();
    let location = place.get(location_start..).unwrap_or_default().trim();
    (offset.to_string(), location.to_string())
}

/// Byte index of the `n`th character, clamped to the string length.
fn char_boundary(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

/// Date as `"Feb 02, 2016"` in the given timezone.
#[must_use]
pub fn format_date<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format_millis(millis, tz, "%b %d, %Y")
}

/// Time as `"3:04 PM"` in the given timezone.
#[must_use]
pub fn format_time<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format_millis(millis, tz, "%-I:%M %p")
}

fn format_millis<Tz>(millis: i64, tz: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(tz).format(pattern).to_string())
        .unwrap_or_default()
}

/// Populate every slot of `row` from `quake`.
pub fn bind_row<R, Tz>(quake: &Earthquake, row: &mut R, palette: &Palette, tz: &Tz)
where
    R: QuakeRow + ?Sized,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let (offset, location) = split_place(quake.place());

    row.set_magnitude(&format_magnitude(quake.magnitude()));
    row.set_badge_color(palette.color_for(quake.magnitude()));
    row.set_location_offset(&offset);
    row.set_location(&location);
    row.set_date(&format_date(quake.time_millis(), tz));
    row.set_time(&format_time(quake.time_millis(), tz));
}

/// The loaded list plus what is needed to bind its rows.
#[derive(Debug, Clone)]
pub struct EarthquakeAdapter<Tz: TimeZone> {
    quakes: Vec<Earthquake>,
    palette: Palette,
    tz: Tz,
}

impl<Tz> EarthquakeAdapter<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    #[must_use]
    pub fn new(quakes: Vec<Earthquake>, palette: Palette, tz: Tz) -> Self {
        Self { quakes, palette, tz }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quakes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quakes.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Earthquake> {
        self.quakes.get(position)
    }

    #[must_use]
    pub fn earthquakes(&self) -> &[Earthquake] {
        &self.quakes
    }

    /// Bind the row at `position`, reusing `recycled` when given.
    ///
    /// Returns `None` for an out-of-range position.
    pub fn get_view<R>(&self, position: usize, recycled: Option<R>) -> Option<R>
    where
        R: QuakeRow + Default,
    {
        let quake = self.quakes.get(position)?;
        let mut row = recycled.unwrap_or_default();
        bind_row(quake, &mut row, &self.palette, &self.tz);
        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    const GOLDEN_MILLIS: i64 = 1_454_371_200_000;

    #[test]
    fn test_magnitude_one_decimal() {
        assert_eq!(format_magnitude(6.14), "6.1");
        assert_eq!(format_magnitude(6.0), "6.0");
        assert_eq!(format_magnitude(7.25), "7.3");
        assert_eq!(format_magnitude(4.96), "5.0");
        assert_eq!(format_magnitude(-0.04), "0.0");
        assert_eq!(format_magnitude(-1.25), "-1.3");
    }

    #[test]
    fn test_magnitude_near_f64_max_stays_numeric() {
        let text = format_magnitude(1e308);
        assert!(text.starts_with("1000"), "{text}");
        assert!(text.ends_with(".0"), "{text}");
        assert_eq!(format_magnitude(f64::MAX), format!("{:.1}", f64::MAX));
    }

    #[test]
    fn test_magnitude_format_idempotent() {
        for m in [0.0, 0.05, 1.449, 2.5, 3.35, 6.14, 7.85, 9.999, 12.0, -0.7] {
            let once = format_magnitude(m);
            let reparsed: f64 = once.parse().expect("formatted magnitude parses");
            assert_eq!(format_magnitude(reparsed), once, "magnitude {m}");
        }
    }

    #[test]
    fn test_severity_bins() {
        let cases = [
            (-3.2, 1),
            (0.0, 1),
            (1.99, 1),
            (2.0, 2),
            (3.7, 3),
            (4.5, 4),
            (5.0, 5),
            (6.14, 6),
            (7.9, 7),
            (8.0, 8),
            (9.99, 9),
            (10.0, 10),
            (12.3, 10),
        ];
        for (m, bin) in cases {
            assert_eq!(SeverityBin::from_magnitude(m).value(), bin, "magnitude {m}");
        }
    }

    #[test]
    fn test_severity_bin_is_total() {
        for m in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, f64::MAX, f64::MIN] {
            let bin = SeverityBin::from_magnitude(m).value();
            assert!((SeverityBin::MIN..=SeverityBin::MAX).contains(&bin));
        }
    }

    #[test]
    fn test_palette_distinct_colors() {
        let palette = Palette::default();
        let mut colors: Vec<String> = (1..=10)
            .map(|b| palette.color_for(f64::from(b)).to_string())
            .collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 10);
        assert_eq!(palette.color_for(6.14).to_string(), "#FC6644");
        assert_eq!(palette.color_for(0.5).to_string(), "#4A7BA7");
        assert_eq!(palette.color_for(11.0).to_string(), "#C03823");
    }

    #[test]
    fn test_split_place_with_distance() {
        let (offset, location) = split_place("86km NE of Rincon, Puerto Rico");
        assert_eq!(offset, "86km NE of");
        assert_eq!(location, "Rincon, Puerto Rico");
    }

    #[test]
    fn test_split_place_reconstructs_with_one_char_gap() {
        for place in [
            "86km NE of Rincon, Puerto Rico",
            "4km SSW of Volcano, Hawaii",
            "120km W of Ferndale, CA",
        ] {
            let (offset, location) = split_place(place);
            assert_eq!(format!("{offset} {location}"), place.trim());
        }
    }

    #[test]
    fn test_split_place_without_distance() {
        for place in ["Pacific-Antarctic Ridge", "", "  South of Fiji Islands "] {
            let (offset, location) = split_place(place);
            assert_eq!(offset, DEFAULT_OFFSET);
            assert_eq!(location, place);
        }
    }

    #[test]
    fn test_split_place_unusual_spacing() {
        // "of" followed by two spaces: the offset keeps "of", the location
        // is trimmed of the extra space.
        let (offset, location) = split_place("10km N of  Anchorage");
        assert_eq!(offset, "10km N of");
        assert_eq!(location, "Anchorage");

        // No "of " at all: cuts fall back to characters 1 and 2.
        let (offset, location) = split_place("5km east-northeast Alaska");
        assert_eq!(offset, "5");
        assert_eq!(location, "m east-northeast Alaska");
    }

    #[test]
    fn test_split_place_non_ascii_does_not_panic() {
        let (offset, location) = split_place("Ñkm Ñorte");
        assert_eq!(offset, "Ñ");
        assert_eq!(location, "m Ñorte");
    }

    #[test]
    fn test_golden_date_time_utc() {
        assert_eq!(format_date(GOLDEN_MILLIS, &Utc), "Feb 02, 2016");
        assert_eq!(format_time(GOLDEN_MILLIS, &Utc), "12:00 AM");
    }

    #[test]
    fn test_golden_date_time_pacific() {
        let pst = FixedOffset::west_opt(8 * 3600).expect("valid offset");
        assert_eq!(format_date(GOLDEN_MILLIS, &pst), "Feb 01, 2016");
        assert_eq!(format_time(GOLDEN_MILLIS, &pst), "4:00 PM");
    }

    #[test]
    fn test_time_has_no_leading_zero() {
        // 2016-02-02T15:04:00Z
        let millis = GOLDEN_MILLIS + (15 * 3600 + 4 * 60) * 1000;
        assert_eq!(format_time(millis, &Utc), "3:04 PM");
    }

    #[test]
    fn test_bind_row() {
        let quake = Earthquake::new(
            6.14,
            "86km NE of Rincon, Puerto Rico",
            GOLDEN_MILLIS,
            "https://earthquake.usgs.gov/earthquakes/eventpage/pr16033000",
        );
        let mut row = RowFields::default();
        bind_row(&quake, &mut row, &Palette::default(), &Utc);

        assert_eq!(row.magnitude, "6.1");
        assert_eq!(row.badge_color, Palette::default().color(SeverityBin(6)));
        assert_eq!(row.location_offset, "86km NE of");
        assert_eq!(row.location, "Rincon, Puerto Rico");
        assert_eq!(row.date, "Feb 02, 2016");
        assert_eq!(row.time, "12:00 AM");
    }

    #[test]
    fn test_adapter_reuses_recycled_row() {
        let adapter = EarthquakeAdapter::new(
            vec![
                Earthquake::new(6.14, "86km NE of Rincon, Puerto Rico", GOLDEN_MILLIS, ""),
                Earthquake::new(1.2, "Pacific-Antarctic Ridge", GOLDEN_MILLIS, ""),
            ],
            Palette::default(),
            Utc,
        );
        assert_eq!(adapter.len(), 2);

        let first: RowFields = adapter.get_view(0, None).expect("row 0");
        let second = adapter.get_view(1, Some(first)).expect("row 1");

        assert_eq!(second.magnitude, "1.2");
        assert_eq!(second.location_offset, DEFAULT_OFFSET);
        assert_eq!(second.location, "Pacific-Antarctic Ridge");
        assert!(adapter.get_view::<RowFields>(2, None).is_none());
    }
}
