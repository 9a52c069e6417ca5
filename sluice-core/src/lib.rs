mod as_value;
mod bindings;
mod connection;
mod driver;
mod grammar;
mod handle;
mod query;
mod transaction;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use bindings::*;
pub use connection::*;
pub use driver::*;
pub use grammar::*;
pub use handle::*;
pub use query::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
