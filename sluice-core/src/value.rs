use crate::{DATE_FORMAT, TIME_FORMAT, TIMESTAMP_FORMAT, TIMESTAMP_WITH_TIMEZONE_FORMAT};
use rust_decimal::Decimal;
use std::fmt::{self, Display, Write};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// A typed SQL value, used both as a statement parameter and as a row cell.
///
/// Every variant carries an `Option`: `None` is a null that still knows its type.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    /// True for `Null` and for any typed null.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null
            | Value::Boolean(None)
            | Value::Int32(None)
            | Value::Int64(None)
            | Value::UInt64(None)
            | Value::Float32(None)
            | Value::Float64(None)
            | Value::Decimal(None)
            | Value::Varchar(None)
            | Value::Blob(None)
            | Value::Date(None)
            | Value::Time(None)
            | Value::Timestamp(None)
            | Value::TimestampWithTimezone(None)
            | Value::Uuid(None) => true,
            _ => false,
        }
    }

    /// Canonical text form of values that drivers without a native type store as text.
    ///
    /// Returns `None` for nulls and for values that have a native numeric or binary form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Decimal(Some(v)) => Some(v.to_string()),
            Value::Varchar(Some(v)) => Some(v.clone()),
            Value::Date(Some(v)) => v.format(DATE_FORMAT).ok(),
            Value::Time(Some(v)) => v.format(TIME_FORMAT).ok(),
            Value::Timestamp(Some(v)) => v.format(TIMESTAMP_FORMAT).ok(),
            Value::TimestampWithTimezone(Some(v)) => v.format(TIMESTAMP_WITH_TIMEZONE_FORMAT).ok(),
            Value::Uuid(Some(v)) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => self.same_type(other),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => write!(f, "{}", v),
            Value::Int32(Some(v)) => write!(f, "{}", v),
            Value::Int64(Some(v)) => write!(f, "{}", v),
            Value::UInt64(Some(v)) => write!(f, "{}", v),
            Value::Float32(Some(v)) => write!(f, "{}", v),
            Value::Float64(Some(v)) => write!(f, "{}", v),
            Value::Decimal(Some(v)) => write!(f, "{}", v),
            Value::Varchar(Some(v)) => write_quoted(f, v),
            Value::Blob(Some(v)) => {
                f.write_str("X'")?;
                for b in v.iter() {
                    write!(f, "{:02X}", b)?;
                }
                f.write_char('\'')
            }
            _ => match self.as_text() {
                Some(text) => write_quoted(f, &text),
                None => f.write_str("NULL"),
            },
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('\'')?;
    for c in value.chars() {
        if c == '\'' {
            f.write_char('\'')?;
        }
        f.write_char(c)?;
    }
    f.write_char('\'')
}
