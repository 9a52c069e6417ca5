use crate::{Bindings, Result, RowLabeled};

/// The native connection a [`Connection`](crate::Connection) wraps.
///
/// Implemented by drivers on top of the database client library, and by test doubles.
/// Every method blocks until the database answers and raises on failure.
pub trait Handle {
    type Prepared<'h>: Prepared
    where
        Self: 'h;

    /// Prepare one statement, failing on malformed SQL.
    fn prepare(&mut self, query: &str) -> Result<Self::Prepared<'_>>;
    fn begin_transaction(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn roll_back(&mut self) -> Result<()>;
}

/// A statement prepared by a [`Handle`].
///
/// # Contract
/// * `execute` binds the values and runs the statement, returning the driver's success flag.
/// * `fetch_all` returns the rows produced by the last `execute`, in order.
/// * `row_count` returns the rows affected by the last `execute`.
pub trait Prepared {
    fn execute(&mut self, bindings: &Bindings) -> Result<bool>;
    fn fetch_all(&mut self) -> Result<Vec<RowLabeled>>;
    fn row_count(&self) -> Result<u64>;
}
