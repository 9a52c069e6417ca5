use crate::{Connection, Driver, Handle, Result};
use std::panic::{self, AssertUnwindSafe};

impl<D: Driver> Connection<D> {
    /// Run `work` inside a transaction.
    ///
    /// Commits when `work` returns `Ok` and hands back its value. When `work` fails the
    /// transaction is rolled back and the very same error is returned, commit is never
    /// attempted. A panic inside `work` is rolled back as well, then resumed.
    ///
    /// If the rollback itself fails, that error is returned with the failure of `work`
    /// attached as context. While pretending, the handle is not asked to begin, commit or
    /// roll back.
    pub fn transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.control(<D::Handle as Handle>::begin_transaction)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(self)));
        match outcome {
            Ok(Ok(value)) => {
                self.control(<D::Handle as Handle>::commit)?;
                Ok(value)
            }
            Ok(Err(error)) => {
                log::error!("Rolling back the transaction: {:#}", error);
                if let Err(rollback) = self.control(<D::Handle as Handle>::roll_back) {
                    return Err(rollback.context(format!(
                        "Could not roll back the transaction after the failure: {:#}",
                        error
                    )));
                }
                Err(error)
            }
            Err(payload) => {
                log::error!("Rolling back the transaction after a panic");
                let _ = self.control(<D::Handle as Handle>::roll_back);
                panic::resume_unwind(payload)
            }
        }
    }

    fn control(&mut self, f: fn(&mut D::Handle) -> Result<()>) -> Result<()> {
        if self.pretending() {
            return Ok(());
        }
        f(self.handle_mut()).map_err(|e| {
            log::error!("{:#}", e);
            e
        })
    }
}
