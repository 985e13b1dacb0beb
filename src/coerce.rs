//! Conversion of raw cell text into typed values

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::errors::Error;
use crate::record::{FieldKind, FieldType};

/// A typed value, produced from cell text and consumed by record fields
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value
    #[default]
    Empty,
    /// Text
    Text(String),
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time
    DateTime(NaiveDateTime),
}

impl Value {
    /// Is this value empty
    pub fn is_empty(&self) -> bool {
        *self == Value::Empty
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
        }
    }
}

/// Reason why a raw value could not be coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoerceError {
    /// Empty input for a field which cannot be empty
    Empty,
    /// Input does not parse as the target kind
    Invalid,
}

/// A date pattern used to parse textual dates.
///
/// Patterns are written with the usual spreadsheet tokens (`dd/MM/yyyy`,
/// `yyyy-MM-dd HH:mm:ss`). A pattern containing `%` is taken as a chrono
/// strftime pattern as is.
///
/// Numeric fields are parsed leniently: `dd` and `MM` also accept a single
/// digit, so `1/5/1990` reads as 1 May 1990 under `dd/MM/yyyy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    strftime: String,
}

impl Default for DateFormat {
    fn default() -> Self {
        DateFormat {
            pattern: "dd/MM/yyyy".to_string(),
            strftime: "%d/%m/%Y".to_string(),
        }
    }
}

impl DateFormat {
    /// Creates a new `DateFormat`, failing on an empty pattern
    pub fn new(pattern: &str) -> Result<DateFormat, Error> {
        if pattern.trim().is_empty() {
            return Err(Error::MissingArgument("date_format"));
        }
        let strftime = if pattern.contains('%') {
            pattern.to_string()
        } else {
            to_strftime(pattern)
        };
        Ok(DateFormat {
            pattern: pattern.to_string(),
            strftime,
        })
    }

    /// Gets the pattern as given by the caller
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Gets the equivalent chrono pattern
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Parses `s`, accepting date-only patterns (at midnight)
    pub fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        NaiveDateTime::parse_from_str(s, &self.strftime)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, &self.strftime)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
    }
}

/// Translates spreadsheet date tokens into a strftime pattern
fn to_strftime(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }
        match c {
            'y' => out.push_str(if run <= 2 { "%y" } else { "%Y" }),
            'M' => out.push_str(match run {
                1 | 2 => "%m",
                3 => "%b",
                _ => "%B",
            }),
            'd' => out.push_str(match run {
                1 | 2 => "%d",
                3 => "%a",
                _ => "%A",
            }),
            'H' => out.push_str("%H"),
            'h' => out.push_str("%I"),
            'm' => out.push_str("%M"),
            's' => out.push_str("%S"),
            't' => out.push_str("%p"),
            'f' => out.push_str(match run {
                1..=3 => "%3f",
                4..=6 => "%6f",
                _ => "%9f",
            }),
            '\'' | '"' => {
                // quoted literal, up to the matching quote
                let end = chars[i + 1..]
                    .iter()
                    .position(|&q| q == c)
                    .map_or(chars.len(), |p| i + 1 + p);
                for &l in &chars[i + 1..end] {
                    push_literal(&mut out, l);
                }
                i = end + 1;
                continue;
            }
            '\\' => {
                if let Some(&l) = chars.get(i + 1) {
                    push_literal(&mut out, l);
                }
                i += 2;
                continue;
            }
            _ => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
            }
        }
        i += run;
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Converts a serial day number of the 1900 date system
///
/// The serial counts days from 1899-12-30, so serials below 61 are one day
/// earlier than the date Excel displays for them.
pub fn from_serial(days: i64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch
        .checked_add_signed(Duration::try_days(days)?)
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Coerces raw cell text into a [`Value`] of the `target` kind
///
/// Text is kept verbatim, whitespace included: only a truly empty cell is
/// empty for text fields. Other kinds ignore surrounding whitespace.
///
/// Integers beyond `i64` but within `u64` are kept as [`Value::Text`], which
/// unsigned fields parse back.
pub fn coerce(raw: &str, target: FieldType, date_format: &DateFormat) -> Result<Value, CoerceError> {
    let trimmed = raw.trim();
    let is_empty = match target.kind {
        FieldKind::Text => raw.is_empty(),
        _ => trimmed.is_empty(),
    };
    if is_empty {
        return if target.nullable {
            Ok(Value::Empty)
        } else if target.kind == FieldKind::Text {
            Ok(Value::Text(String::new()))
        } else {
            Err(CoerceError::Empty)
        };
    }
    match target.kind {
        FieldKind::Text => Ok(Value::Text(raw.to_string())),
        FieldKind::Integer => match trimmed.parse::<i64>() {
            Ok(v) => Ok(Value::Integer(v)),
            Err(_) => trimmed
                .parse::<u64>()
                .map(|_| Value::Text(trimmed.to_string()))
                .map_err(|_| CoerceError::Invalid),
        },
        FieldKind::Float => fast_float2::parse::<f64, _>(trimmed)
            .map(Value::Float)
            .map_err(|_| CoerceError::Invalid),
        FieldKind::Boolean => match trimmed {
            "1" => Ok(Value::Boolean(true)),
            "0" => Ok(Value::Boolean(false)),
            s if s.eq_ignore_ascii_case("true") => Ok(Value::Boolean(true)),
            s if s.eq_ignore_ascii_case("false") => Ok(Value::Boolean(false)),
            _ => Err(CoerceError::Invalid),
        },
        FieldKind::Date => parse_date(trimmed, date_format).map(|d| Value::Date(d.date())),
        FieldKind::DateTime => parse_date(trimmed, date_format).map(Value::DateTime),
    }
}

fn parse_date(s: &str, date_format: &DateFormat) -> Result<NaiveDateTime, CoerceError> {
    if let Ok(serial) = s.parse::<i64>() {
        if let Some(d) = from_serial(serial) {
            return Ok(d);
        }
    }
    date_format.parse(s).ok_or(CoerceError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(kind: FieldKind) -> FieldType {
        FieldType::new(kind, false)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_to_strftime() {
        assert_eq!(to_strftime("dd/MM/yyyy"), "%d/%m/%Y");
        assert_eq!(to_strftime("yyyy-MM-dd HH:mm:ss"), "%Y-%m-%d %H:%M:%S");
        assert_eq!(to_strftime("d MMM yy"), "%d %b %y");
        assert_eq!(to_strftime("hh:mm tt"), "%I:%M %p");
        assert_eq!(to_strftime("yyyy'T'HH"), "%YT%H");
        assert_eq!(to_strftime("dd.MM.yyyy\\%"), "%d.%m.%Y%%");
    }

    #[test]
    fn test_date_format() {
        assert_eq!(DateFormat::default().strftime(), "%d/%m/%Y");
        assert_eq!(DateFormat::new("%Y%m%d").unwrap().strftime(), "%Y%m%d");
        assert!(matches!(
            DateFormat::new(""),
            Err(Error::MissingArgument("date_format"))
        ));
        let fmt = DateFormat::new("yyyy-MM-dd HH:mm").unwrap();
        assert_eq!(
            fmt.parse("2021-03-04 10:30"),
            date(2021, 3, 4).and_hms_opt(10, 30, 0)
        );
        assert_eq!(
            DateFormat::default().parse("10/05/1990"),
            Some(date(1990, 5, 10).and_time(NaiveTime::MIN))
        );
        // single digit days and months are accepted
        assert_eq!(
            DateFormat::default().parse("1/5/1990"),
            Some(date(1990, 5, 1).and_time(NaiveTime::MIN))
        );
    }

    #[test]
    fn test_from_serial() {
        assert_eq!(from_serial(0).map(|d| d.date()), Some(date(1899, 12, 30)));
        assert_eq!(from_serial(61).map(|d| d.date()), Some(date(1900, 3, 1)));
        assert_eq!(from_serial(60).map(|d| d.date()), Some(date(1900, 2, 28)));
        assert_eq!(from_serial(59).map(|d| d.date()), Some(date(1900, 2, 27)));
        assert_eq!(from_serial(45).map(|d| d.date()), Some(date(1900, 2, 13)));
        assert_eq!(from_serial(44197).map(|d| d.date()), Some(date(2021, 1, 1)));
        assert_eq!(from_serial(i64::MAX), None);
    }

    #[test]
    fn test_coerce_dates() {
        let fmt = DateFormat::default();
        let serial = coerce("45", ty(FieldKind::Date), &fmt).unwrap();
        let text = coerce("10/05/1990", ty(FieldKind::Date), &fmt).unwrap();
        assert_eq!(text, Value::Date(date(1990, 5, 10)));
        assert_eq!(serial, Value::Date(date(1900, 2, 13)));
        assert_ne!(serial, text);
        assert_eq!(
            coerce("not-a-date", ty(FieldKind::Date), &fmt),
            Err(CoerceError::Invalid)
        );
        assert_eq!(
            coerce("10/05/1990", ty(FieldKind::DateTime), &fmt),
            Ok(Value::DateTime(date(1990, 5, 10).and_time(NaiveTime::MIN)))
        );
    }

    #[test]
    fn test_coerce_empty() {
        let fmt = DateFormat::default();
        assert_eq!(
            coerce("  ", FieldType::new(FieldKind::Date, true), &fmt),
            Ok(Value::Empty)
        );
        assert_eq!(
            coerce("", ty(FieldKind::Text), &fmt),
            Ok(Value::Text(String::new()))
        );
        assert_eq!(
            coerce("", ty(FieldKind::Integer), &fmt),
            Err(CoerceError::Empty)
        );
        assert_eq!(
            coerce(" ", ty(FieldKind::Integer), &fmt),
            Err(CoerceError::Empty)
        );
    }

    #[test]
    fn test_coerce_whitespace_text() {
        let fmt = DateFormat::default();
        assert_eq!(
            coerce("  ", ty(FieldKind::Text), &fmt),
            Ok(Value::Text("  ".to_string()))
        );
        assert_eq!(
            coerce("  ", FieldType::new(FieldKind::Text, true), &fmt),
            Ok(Value::Text("  ".to_string()))
        );
        assert_eq!(
            coerce("", FieldType::new(FieldKind::Text, true), &fmt),
            Ok(Value::Empty)
        );
    }

    #[test]
    fn test_coerce_scalars() {
        let fmt = DateFormat::default();
        assert_eq!(
            coerce(" 42 ", ty(FieldKind::Integer), &fmt),
            Ok(Value::Integer(42))
        );
        assert_eq!(
            coerce("4.2", ty(FieldKind::Integer), &fmt),
            Err(CoerceError::Invalid)
        );
        assert_eq!(
            coerce("18446744073709551615", ty(FieldKind::Integer), &fmt),
            Ok(Value::Text("18446744073709551615".to_string()))
        );
        assert_eq!(
            coerce("18446744073709551616", ty(FieldKind::Integer), &fmt),
            Err(CoerceError::Invalid)
        );
        assert_eq!(
            coerce("1.5e3", ty(FieldKind::Float), &fmt),
            Ok(Value::Float(1500.0))
        );
        assert_eq!(
            coerce("TRUE", ty(FieldKind::Boolean), &fmt),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            coerce("0", ty(FieldKind::Boolean), &fmt),
            Ok(Value::Boolean(false))
        );
        assert_eq!(
            coerce("yes", ty(FieldKind::Boolean), &fmt),
            Err(CoerceError::Invalid)
        );
        assert_eq!(
            coerce(" Alice ", ty(FieldKind::Text), &fmt),
            Ok(Value::Text(" Alice ".to_string()))
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Date(date(1990, 5, 10)).to_string(), "1990-05-10");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }
}
