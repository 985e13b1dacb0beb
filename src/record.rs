//! Typed records
//!
//! A record type describes its fields once, in a static table of [`Field`]
//! descriptors, usually generated by the [`record!`](crate::record!) macro.
//! Reading matches normalized headers against those descriptors
//! ([`PropertyMap`]) and fills fresh records ([`materialize`]), writing walks
//! the same table in declared order.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;

use crate::coerce::{coerce, CoerceError, Value};
use crate::errors::{ConversionError, Error};
use crate::extract::RowMapping;
use crate::key::normalize;
use crate::ReadOptions;

/// The kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Text
    Text,
    /// Signed or unsigned integer
    Integer,
    /// Floating point number
    Float,
    /// Boolean
    Boolean,
    /// Calendar date
    Date,
    /// Date and time
    DateTime,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    /// Kind of value
    pub kind: FieldKind,
    /// Can the field hold no value
    pub nullable: bool,
}

impl FieldType {
    /// Creates a new `FieldType`
    pub const fn new(kind: FieldKind, nullable: bool) -> FieldType {
        FieldType { kind, nullable }
    }
}

/// A type which can be stored in a record field
pub trait FieldValue: Sized {
    /// Kind used to coerce cell text
    const KIND: FieldKind;
    /// Does `Value::Empty` map to a value of this type
    const NULLABLE: bool = false;

    /// Narrows a coerced value, `None` if it does not fit
    fn from_value(value: Value) -> Option<Self>;

    /// Widens this value for writing
    fn to_value(&self) -> Value;
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

macro_rules! integer_field {
    ($($t:ty),*) => {
        $(
            impl FieldValue for $t {
                const KIND: FieldKind = FieldKind::Integer;

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Integer(v) => <$t>::try_from(v).ok(),
                        // beyond i64, only unsigned types can fit
                        Value::Text(s) => s.parse().ok(),
                        _ => None,
                    }
                }

                /// Values beyond `i64` are written as text
                fn to_value(&self) -> Value {
                    i64::try_from(*self).map_or_else(|_| Value::Text(self.to_string()), Value::Integer)
                }
            }
        )*
    };
}

integer_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FieldValue for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FieldValue for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) if v.is_finite() && v.abs() > f32::MAX as f64 => None,
            Value::Float(v) => Some(v as f32),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        // go through the shortest representation so that 0.1f32 prints as 0.1
        let v = self.to_string().parse().unwrap_or(f64::from(*self));
        Value::Float(v)
    }
}

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Boolean(v) => Some(v),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl FieldValue for NaiveDate {
    const KIND: FieldKind = FieldKind::Date;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Date(d) => Some(d),
            Value::DateTime(d) => Some(d.date()),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl FieldValue for NaiveDateTime {
    const KIND: FieldKind = FieldKind::DateTime;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::DateTime(d) => Some(d),
            Value::Date(d) => Some(d.and_time(chrono::NaiveTime::MIN)),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Empty => Some(None),
            v => T::from_value(v).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Empty, T::to_value)
    }
}

/// Descriptor of one record field
pub struct Field<T> {
    name: &'static str,
    ty: FieldType,
    set: fn(&mut T, Value) -> bool,
    get: fn(&T) -> Value,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish()
    }
}

impl<T> Field<T> {
    /// Creates a new field descriptor
    ///
    /// `set` returns `false` when the value does not fit the field.
    pub const fn new(
        name: &'static str,
        ty: FieldType,
        set: fn(&mut T, Value) -> bool,
        get: fn(&T) -> Value,
    ) -> Field<T> {
        Field { name, ty, set, get }
    }

    /// Gets the declared field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the declared field type
    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    /// Gets the normalized field name
    pub fn key(&self) -> String {
        normalize(self.name)
    }

    /// Reads the field out of `record`
    pub fn get(&self, record: &T) -> Value {
        (self.get)(record)
    }

    /// Stores `value` into `record`, returns `false` if it does not fit
    pub fn set(&self, record: &mut T, value: Value) -> bool {
        (self.set)(record, value)
    }
}

/// A type constructed from spreadsheet rows
pub trait Record: Default + 'static {
    /// Field descriptors, in declared order
    const FIELDS: &'static [Field<Self>];
}

/// Implements [`Record`] for a struct.
///
/// Each field is listed with its type, and optionally the name under which it
/// appears in headers (defaults to the field identifier).
///
/// ```
/// use xlshaper::{record, Record};
///
/// #[derive(Default)]
/// struct Person {
///     first_name: String,
///     age: u32,
///     nickname: Option<String>,
/// }
///
/// record!(Person {
///     first_name: String => "FirstName",
///     age: u32,
///     nickname: Option<String>,
/// });
///
/// assert_eq!(Person::FIELDS[0].name(), "FirstName");
/// assert!(Person::FIELDS[2].field_type().nullable);
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident : $fty:ty $(=> $name:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            const FIELDS: &'static [$crate::Field<Self>] = &[
                $(
                    $crate::Field::new(
                        $crate::__field_name!($field $(, $name)?),
                        $crate::FieldType::new(
                            <$fty as $crate::FieldValue>::KIND,
                            <$fty as $crate::FieldValue>::NULLABLE,
                        ),
                        |record: &mut $ty, value: $crate::Value| {
                            match <$fty as $crate::FieldValue>::from_value(value) {
                                Some(v) => {
                                    record.$field = v;
                                    true
                                }
                                None => false,
                            }
                        },
                        |record: &$ty| $crate::FieldValue::to_value(&record.$field),
                    ),
                )*
            ];
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_name {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $name:literal) => {
        $name
    };
}

/// Normalized header keys mapped to record fields
#[derive(Debug)]
pub struct PropertyMap<T: 'static> {
    entries: Vec<(String, &'static Field<T>)>,
}

impl<T: Record> PropertyMap<T> {
    /// Builds the mapping for a header row
    ///
    /// Each header is matched against the first field with the same normalized
    /// name. Unmatched headers are dropped, duplicated headers keep their first
    /// occurrence.
    pub fn build<S: AsRef<str>>(headers: &[S]) -> PropertyMap<T> {
        let fields: Vec<(String, &'static Field<T>)> =
            T::FIELDS.iter().map(|f| (f.key(), f)).collect();
        let mut entries: Vec<(String, &'static Field<T>)> = Vec::with_capacity(headers.len());
        for header in headers {
            let key = normalize(header.as_ref());
            if entries.iter().any(|(k, _)| *k == key) {
                warn!("duplicate header '{}', keeping first column", header.as_ref());
                continue;
            }
            if let Some((_, field)) = fields.iter().find(|(k, _)| *k == key) {
                entries.push((key, *field));
            }
        }
        PropertyMap { entries }
    }

    /// Number of mapped fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is there no mapped field
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets the field mapped to a normalized key
    pub fn get(&self, key: &str) -> Option<&'static Field<T>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, f)| *f)
    }

    /// Iterates over the `(key, field)` pairs in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'static Field<T>)> {
        self.entries.iter().map(|(k, f)| (k.as_str(), *f))
    }
}

/// Builds one record out of a row mapping
///
/// Keys absent from `row` leave the field to its default value.
pub fn materialize<T: Record>(
    map: &PropertyMap<T>,
    row: &RowMapping,
    options: &ReadOptions,
) -> Result<T, Error> {
    let mut record = T::default();
    for (key, field) in map.iter() {
        let Some(raw) = row.get(key) else {
            continue;
        };
        let ty = field.field_type();
        let value = match coerce(raw, ty, options.get_date_format()) {
            Ok(v) => v,
            Err(CoerceError::Empty) if options.is_empty_as_default() => continue,
            Err(_) => return Err(conversion_error(field, raw)),
        };
        if !field.set(&mut record, value) {
            return Err(conversion_error(field, raw));
        }
    }
    Ok(record)
}

fn conversion_error<T>(field: &Field<T>, raw: &str) -> Error {
    ConversionError {
        field: field.name().to_string(),
        value: raw.to_string(),
        target: field.field_type().kind,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Employee {
        eeid: String,
        full_name: String,
        age: u8,
        salary: f64,
        active: bool,
        hire_date: Option<NaiveDate>,
    }

    record!(Employee {
        eeid: String => "EEID",
        full_name: String => "Full Name",
        age: u8,
        salary: f64 => "Annual Salary",
        active: bool,
        hire_date: Option<NaiveDate> => "Hire Date",
    });

    #[derive(Debug, Default)]
    struct Counter {
        hits: u64,
        signed: i64,
    }

    record!(Counter { hits: u64 => "Hits", signed: i64 => "Signed" });

    fn row(pairs: &[(&str, &str)]) -> RowMapping {
        pairs
            .iter()
            .map(|(k, v)| (normalize(k), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fields() {
        let names: Vec<_> = Employee::FIELDS.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            ["EEID", "Full Name", "age", "Annual Salary", "active", "Hire Date"]
        );
        assert_eq!(Employee::FIELDS[3].key(), "annualsalary");
        assert_eq!(
            Employee::FIELDS[5].field_type(),
            FieldType::new(FieldKind::Date, true)
        );
    }

    #[test]
    fn test_property_map() {
        let map = PropertyMap::<Employee>::build(&["eeid", "FULLNAME", "Unknown", "Age", "EEID"]);
        let keys: Vec<_> = map.iter().map(|(k, f)| (k, f.name())).collect();
        assert_eq!(
            keys,
            [("eeid", "EEID"), ("fullname", "Full Name"), ("age", "age")]
        );
        assert!(map.get("unknown").is_none());
        assert!(PropertyMap::<Employee>::build::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_materialize() {
        let map = PropertyMap::<Employee>::build(&[
            "EEID",
            "Full Name",
            "Age",
            "Annual Salary",
            "Active",
            "Hire Date",
        ]);
        let options = ReadOptions::new();
        let e: Employee = materialize(
            &map,
            &row(&[
                ("EEID", "E02002"),
                ("Full Name", "Kai Le"),
                ("Age", "47"),
                ("Annual Salary", "92368"),
                ("Active", "true"),
                ("Hire Date", "15/02/2022"),
            ]),
            &options,
        )
        .unwrap();
        assert_eq!(e.full_name, "Kai Le");
        assert_eq!(e.age, 47);
        assert_eq!(e.salary, 92368.0);
        assert!(e.active);
        assert_eq!(e.hire_date, NaiveDate::from_ymd_opt(2022, 2, 15));

        // absent keys keep their default, empty nullable is None
        let e: Employee = materialize(
            &map,
            &row(&[("EEID", "E1"), ("Hire Date", "")]),
            &options,
        )
        .unwrap();
        assert_eq!(
            e,
            Employee {
                eeid: "E1".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_materialize_errors() {
        let map = PropertyMap::<Employee>::build(&["Age", "Hire Date"]);
        let options = ReadOptions::new();
        match materialize::<Employee>(&map, &row(&[("Age", "300")]), &options) {
            Err(Error::Conversion(e)) => {
                assert_eq!(e.field, "age");
                assert_eq!(e.value, "300");
                assert_eq!(e.target, FieldKind::Integer);
            }
            r => panic!("expecting a conversion error, got {r:?}"),
        }
        assert!(matches!(
            materialize::<Employee>(&map, &row(&[("Hire Date", "not-a-date")]), &options),
            Err(Error::Conversion(_))
        ));
        assert!(matches!(
            materialize::<Employee>(&map, &row(&[("Age", " ")]), &options),
            Err(Error::Conversion(_))
        ));
        let counters = PropertyMap::<Counter>::build(&["Hits", "Signed"]);
        let max = u64::MAX.to_string();
        let c: Counter = materialize(&counters, &row(&[("Hits", max.as_str())]), &options).unwrap();
        assert_eq!(c.hits, u64::MAX);
        match materialize::<Counter>(&counters, &row(&[("Signed", max.as_str())]), &options) {
            Err(Error::Conversion(e)) => assert_eq!(e.target, FieldKind::Integer),
            r => panic!("expecting a conversion error, got {r:?}"),
        }
        let lenient = ReadOptions::new().empty_as_default(true);
        let e: Employee = materialize(&map, &row(&[("Age", " ")]), &lenient).unwrap();
        assert_eq!(e.age, 0);
    }

    #[test]
    fn test_field_values() {
        assert_eq!(u64::MAX.to_value(), Value::Text(u64::MAX.to_string()));
        assert_eq!(0.1f32.to_value(), Value::Float(0.1));
        assert_eq!(Option::<i32>::None.to_value(), Value::Empty);
        assert_eq!(i8::from_value(Value::Integer(128)), None);
        assert_eq!(u64::from_value(u64::MAX.to_value()), Some(u64::MAX));
        assert_eq!(i64::from_value(u64::MAX.to_value()), None);
        assert_eq!(Option::<i8>::from_value(Value::Empty), Some(None));
    }
}
