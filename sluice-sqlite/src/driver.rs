use crate::{SqliteGrammar, SqliteHandle};
use sluice_core::{Driver, Result};

#[derive(Default, Clone, Copy, Debug)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    type Handle = SqliteHandle;
    type Grammar = SqliteGrammar;

    const NAME: &'static str = "sqlite";

    fn grammar(&self) -> SqliteGrammar {
        SqliteGrammar::new()
    }

    fn open(&self, url: &str) -> Result<SqliteHandle> {
        SqliteHandle::open(url)
    }
}
