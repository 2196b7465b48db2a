//! Delimited-text decoder
//!
//! Hand-rolled line splitting rather than a CSV library: the format is a
//! flat numeric table with no quoting or embedded delimiters, so a full
//! dialect parser buys nothing here.

use crate::errors::{FormatError, ParseError};
use crate::reading::Reading;

use super::{parse_timestamp, RawRecord};

/// Column positions of the four required fields within the header
struct HeaderLayout {
    timestamp: usize,
    temperature: usize,
    humidity: usize,
    luminosity: usize,
    /// Total columns the header declares; rows must reach the required ones
    width: usize,
}

impl HeaderLayout {
    fn from_line(header: &str) -> Result<Self, FormatError> {
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();

        let find = |name: &'static str| -> Result<usize, FormatError> {
            columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name))
                .ok_or(FormatError::MissingColumn { column: name })
        };

        Ok(Self {
            timestamp: find("timestamp")?,
            temperature: find("temperature")?,
            humidity: find("humidity")?,
            luminosity: find("luminosity")?,
            width: columns.len(),
        })
    }

    /// Highest column index a data row must actually contain
    fn required_width(&self) -> usize {
        [self.timestamp, self.temperature, self.humidity, self.luminosity]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Parse a whole delimited-text source
///
/// Line 1 is the header; blank lines are skipped. Extra columns beyond the
/// four required ones are ignored.
pub(super) fn parse(input: &str) -> Result<Vec<Reading>, ParseError> {
    let mut lines = input.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((_, line)) => break line,
            None => {
                return Err(FormatError::Structure {
                    detail: "source is empty".to_string(),
                }
                .into())
            }
        }
    };
    let layout = HeaderLayout::from_line(header)?;

    let mut readings = Vec::new();
    let mut record = 0usize;

    for (line_idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        record += 1;

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < layout.required_width() {
            return Err(FormatError::ColumnCount {
                line: line_idx + 1,
                expected: layout.required_width().max(layout.width),
                found: fields.len(),
            }
            .into());
        }

        let timestamp = parse_timestamp(record, fields[layout.timestamp])?;
        let raw = RawRecord {
            record,
            timestamp,
            temperature: parse_field(record, "temperature", fields[layout.temperature])?,
            humidity: parse_field(record, "humidity", fields[layout.humidity])?,
            luminosity: parse_field(record, "luminosity", fields[layout.luminosity])?,
        };

        readings.push(raw.validate()?);
    }

    Ok(readings)
}

fn parse_field(
    record: usize,
    field: &'static str,
    raw: &str,
) -> Result<f32, crate::errors::ValidationError> {
    raw.parse::<f32>()
        .map_err(|_| crate::errors::ValidationError::NotNumeric {
            record,
            field,
            raw: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    const WELL_FORMED: &str = "\
timestamp,temperature,humidity,luminosity
1000,20.5,40.0,300.0
2000,21.0,41.5,310.0
";

    #[test]
    fn parses_ordered_rows() {
        let readings = parse(WELL_FORMED).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].timestamp, 1000);
        assert_eq!(readings[0].temperature, 20.5);
        assert_eq!(readings[1].humidity, 41.5);
    }

    #[test]
    fn header_columns_may_be_reordered() {
        let input = "\
luminosity,timestamp,humidity,temperature
300.0,1000,40.0,20.5
";
        let readings = parse(input).unwrap();
        assert_eq!(readings[0].temperature, 20.5);
        assert_eq!(readings[0].luminosity, 300.0);
    }

    #[test]
    fn extra_columns_ignored() {
        let input = "\
timestamp,temperature,humidity,luminosity,battery
1000,20.5,40.0,300.0,98
";
        let readings = parse(input).unwrap();
        assert_eq!(readings.len(), 1);
    }

    #[test]
    fn missing_column_is_format_error() {
        let input = "timestamp,temperature,humidity\n1000,20.5,40.0\n";
        let err = parse(input).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Format(FormatError::MissingColumn { column: "luminosity" })
        ));
    }

    #[test]
    fn short_row_is_format_error_with_line() {
        let input = "timestamp,temperature,humidity,luminosity\n1000,20.5\n";
        let err = parse(input).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Format(FormatError::ColumnCount { line: 2, found: 2, .. })
        ));
    }

    #[test]
    fn first_bad_record_rejects_whole_source() {
        // Record 2 has non-numeric humidity; nothing is returned at all
        let input = "\
timestamp,temperature,humidity,luminosity
1000,20.5,40.0,300.0
2000,21.0,wet,310.0
3000,21.5,42.0,320.0
";
        let err = parse(input).unwrap_err();

        match err {
            ParseError::Validation(ValidationError::NotNumeric { record, field, raw }) => {
                assert_eq!(record, 2);
                assert_eq!(field, "humidity");
                assert_eq!(raw, "wet");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_lines_do_not_count_as_records() {
        let input = "\
timestamp,temperature,humidity,luminosity

1000,20.5,40.0,300.0

2000,21.0,41.0,310.0
";
        let readings = parse(input).unwrap();
        assert_eq!(readings.len(), 2);
    }

    #[test]
    fn input_order_is_preserved_even_if_unsorted() {
        let input = "\
timestamp,temperature,humidity,luminosity
2000,21.0,41.0,310.0
1000,20.5,40.0,300.0
";
        let readings = parse(input).unwrap();
        assert_eq!(readings[0].timestamp, 2000);
        assert_eq!(readings[1].timestamp, 1000);
    }
}
