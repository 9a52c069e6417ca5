use crate::{Connection, Grammar, Handle, Result};

pub trait Driver: Sized {
    type Handle: Handle;
    type Grammar: Grammar + 'static;

    const NAME: &'static str;

    /// Default query grammar for this driver.
    fn grammar(&self) -> Self::Grammar;

    /// Open a native handle to the database at `url` (`<NAME>://...`).
    fn open(&self, url: &str) -> Result<Self::Handle>;

    /// Open a handle and wrap it into a [`Connection`].
    fn connect(self, url: &str) -> Result<Connection<Self>> {
        let handle = self.open(url)?;
        Ok(Connection::new(self, handle))
    }
}
