mod cbox;
mod driver;
mod extract;
mod grammar;
mod handle;
mod prepared;

use std::ffi::{CStr, c_char};

pub(crate) use cbox::*;
pub use driver::*;
pub use grammar::*;
pub use handle::*;
pub use prepared::*;

pub(crate) fn error_message_from_ptr<'a>(ptr: *const c_char) -> &'a str {
    unsafe {
        if !ptr.is_null() {
            CStr::from_ptr(ptr)
                .to_str()
                .unwrap_or("Unknown error (the error message was not a valid C string)")
        } else {
            "Unknown error (could not extract the error message)"
        }
    }
}
