use std::time::Instant;
use time::{format_description::BorrowedFormatItem, macros::format_description};

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
pub const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond]");
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");
pub const TIMESTAMP_WITH_TIMEZONE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
);

/// Milliseconds elapsed since `start`, with sub-millisecond precision.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// The longest prefix of `value` not exceeding `len` bytes that ends on a char boundary.
pub fn truncate_at(value: &str, len: usize) -> &str {
    if value.len() <= len {
        return value;
    }
    let mut end = len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncate_at(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}
