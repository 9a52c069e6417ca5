use crate::{
    DATE_FORMAT, Error, Result, TIME_FORMAT, TIMESTAMP_FORMAT, TIMESTAMP_WITH_TIMEZONE_FORMAT,
    Value, truncate_long,
};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::any;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time,
    format_description::BorrowedFormatItem,
    macros::format_description,
};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`] that backs
/// query parameters and row cells.
///
/// `try_from_value` accepts the canonical variant for the type and the representations
/// a driver without a native type may hand back (integers for booleans, text for dates).
///
/// ```rust
/// use sluice_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The typed null of this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} to {}",
        value,
        any::type_name::<T>()
    ))
}

fn out_of_range<T>(value: impl std::fmt::Display) -> Error {
    Error::msg(format!(
        "Value {} is out of range for {}",
        value,
        any::type_name::<T>()
    ))
}

fn parse_error<T>(error: impl std::error::Error + Send + Sync + 'static, text: &str) -> Error {
    Error::new(error).context(format!(
        "Cannot parse `{}` as {}",
        truncate_long!(text),
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value!(
    bool,
    Value::Boolean,
    Value::Int32(Some(v)) => Ok(v != 0),
    Value::Int64(Some(v)) => Ok(v != 0),
    Value::UInt64(Some(v)) => Ok(v != 0),
);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Boolean(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => i32::try_from(v).map_err(|_| out_of_range::<i32>(v)),
    Value::UInt64(Some(v)) => i32::try_from(v).map_err(|_| out_of_range::<i32>(v)),
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Boolean(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::UInt64(Some(v)) => i64::try_from(v).map_err(|_| out_of_range::<i64>(v)),
);
impl_as_value!(
    u64,
    Value::UInt64,
    Value::Boolean(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => u64::try_from(v).map_err(|_| out_of_range::<u64>(v)),
    Value::Int64(Some(v)) => u64::try_from(v).map_err(|_| out_of_range::<u64>(v)),
);
impl_as_value!(
    f32,
    Value::Float32,
    Value::Float64(Some(v)) => {
        let result = v as f32;
        if result.is_finite() != v.is_finite() {
            return Err(out_of_range::<f32>(v));
        }
        Ok(result)
    },
    Value::Int32(Some(v)) => Ok(v as _),
);
impl_as_value!(
    f64,
    Value::Float64,
    Value::Float32(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => Ok(v as _),
);
impl_as_value!(
    Decimal,
    Value::Decimal,
    Value::Int32(Some(v)) => Ok(v.into()),
    Value::Int64(Some(v)) => Ok(v.into()),
    Value::UInt64(Some(v)) => Ok(v.into()),
    Value::Float64(Some(v)) => Decimal::from_f64(v).ok_or_else(|| out_of_range::<Decimal>(v)),
    Value::Varchar(Some(v)) => v
        .parse::<Decimal>()
        .map_err(|e| parse_error::<Decimal>(e, &v)),
);
impl_as_value!(String, Value::Varchar);
impl_as_value!(
    Box<[u8]>,
    Value::Blob,
    Value::Varchar(Some(v)) => Ok(v.into_bytes().into()),
);
impl_as_value!(
    Uuid,
    Value::Uuid,
    Value::Varchar(Some(v)) => v
        .parse::<Uuid>()
        .map_err(|e| parse_error::<Uuid>(e, &v)),
    Value::Blob(Some(v)) => Uuid::from_slice(&v)
        .map_err(|e| Error::new(e).context(conversion_error::<Uuid>(&Value::Blob(Some(v))))),
);

macro_rules! parse_temporal {
    ($ty:ty, $text:expr, $($format:expr),+ $(,)?) => {{
        let text: &str = $text;
        None$(.or_else(|| <$ty>::parse(text, $format).ok()))+
            .ok_or_else(|| {
                Error::msg(format!(
                    "Cannot parse `{}` as {}",
                    truncate_long!(text),
                    any::type_name::<$ty>()
                ))
            })
    }};
}

const TIME_FORMAT_SECONDS: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");
const TIMESTAMP_FORMAT_SECONDS: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const TIMESTAMP_WITH_TIMEZONE_FORMAT_SECONDS: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
);

impl_as_value!(
    Date,
    Value::Date,
    Value::Varchar(Some(ref v)) => parse_temporal!(Date, v, DATE_FORMAT),
);
impl_as_value!(
    Time,
    Value::Time,
    Value::Varchar(Some(ref v)) => parse_temporal!(Time, v, TIME_FORMAT, TIME_FORMAT_SECONDS),
);
impl_as_value!(
    PrimitiveDateTime,
    Value::Timestamp,
    Value::Varchar(Some(ref v)) => {
        parse_temporal!(PrimitiveDateTime, v, TIMESTAMP_FORMAT, TIMESTAMP_FORMAT_SECONDS)
    },
);
impl_as_value!(
    OffsetDateTime,
    Value::TimestampWithTimezone,
    Value::Varchar(Some(ref v)) => parse_temporal!(
        OffsetDateTime,
        v,
        TIMESTAMP_WITH_TIMEZONE_FORMAT,
        TIMESTAMP_WITH_TIMEZONE_FORMAT_SECONDS,
    ),
);

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        <Box<[u8]>>::try_from_value(value).map(Into::into)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}
