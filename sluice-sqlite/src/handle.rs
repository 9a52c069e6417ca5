use crate::{CBox, SqliteDriver, SqliteGrammar, SqlitePrepared, error_message_from_ptr};
use libsqlite3_sys::{
    SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE, SQLITE_OPEN_URI, sqlite3, sqlite3_close,
    sqlite3_errmsg, sqlite3_exec, sqlite3_finalize, sqlite3_get_autocommit, sqlite3_open_v2,
    sqlite3_prepare_v2, sqlite3_stmt,
};
use sluice_core::{Context, Driver, Error, Grammar, Handle, Result, truncate_long};
use std::{
    ffi::{CString, c_int},
    ptr,
};

/// Native SQLite connection, closed on drop.
pub struct SqliteHandle {
    pub(crate) connection: CBox<*mut sqlite3>,
}

impl SqliteHandle {
    /// Open `sqlite://<path>`, where `<path>` is a file path or `:memory:` optionally
    /// followed by SQLite URI parameters (`?mode=ro`, `?mode=rwc`, ...).
    pub fn open(url: &str) -> Result<Self> {
        let prefix = format!("{}://", SqliteDriver::NAME);
        let Some(location) = url.strip_prefix(&prefix) else {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                &prefix
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let filename = CString::new(format!("file:{}", location)).with_context(context)?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        let rc = unsafe {
            sqlite3_open_v2(
                filename.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                ptr::null(),
            )
        };
        if rc != SQLITE_OK {
            let error = Error::msg(
                error_message_from_ptr(unsafe { sqlite3_errmsg(*connection) }).to_string(),
            )
            .context(format!("Could not open the database `{}`", url));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(Self { connection })
    }

    /// True between `begin_transaction` and `commit` or `roll_back`.
    pub fn in_transaction(&self) -> bool {
        unsafe { sqlite3_get_autocommit(*self.connection) == 0 }
    }

    fn last_error(&self) -> Error {
        Error::msg(error_message_from_ptr(unsafe { sqlite3_errmsg(*self.connection) }).to_string())
    }

    fn exec(&mut self, sql: &str) -> Result<()> {
        let c_sql = CString::new(sql)?;
        let rc = unsafe {
            sqlite3_exec(
                *self.connection,
                c_sql.as_ptr(),
                None,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        if rc != SQLITE_OK {
            let error = self
                .last_error()
                .context(format!("While executing:\n{}", truncate_long!(sql)));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }

    fn exec_transaction_sql(&mut self, write: fn(&SqliteGrammar, &mut String)) -> Result<()> {
        let mut sql = String::new();
        write(&SqliteGrammar::new(), &mut sql);
        self.exec(&sql)
    }
}

impl Handle for SqliteHandle {
    type Prepared<'h> = SqlitePrepared<'h>;

    fn prepare(&mut self, query: &str) -> Result<SqlitePrepared<'_>> {
        let context = || format!("While preparing the query:\n{}", truncate_long!(query));
        let sql = match CString::new(query) {
            Ok(sql) => sql,
            Err(e) => {
                let error = Error::new(e)
                    .context("Could not create a CString from the query String")
                    .context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
        };
        let mut statement = CBox::new(ptr::null_mut(), |p: *mut sqlite3_stmt| unsafe {
            sqlite3_finalize(p);
        });
        let mut tail = ptr::null();
        let rc = unsafe {
            sqlite3_prepare_v2(
                *self.connection,
                sql.as_ptr(),
                query.len() as c_int + 1,
                &mut *statement,
                &mut tail,
            )
        };
        if rc != SQLITE_OK {
            let error = self.last_error().context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        if statement.is_null() {
            let error = Error::msg("The query does not contain any statement").context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        // Only comments and empty statements may follow
        while !tail.is_null() && unsafe { *tail } != 0 {
            let mut extra = CBox::new(ptr::null_mut(), |p: *mut sqlite3_stmt| unsafe {
                sqlite3_finalize(p);
            });
            let mut next = ptr::null();
            let rc = unsafe {
                sqlite3_prepare_v2(*self.connection, tail, -1, &mut *extra, &mut next)
            };
            if rc != SQLITE_OK {
                let error = self.last_error().context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            if !extra.is_null() {
                let error = Error::msg("Cannot prepare more than one statement at a time")
                    .context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            if next == tail {
                break;
            }
            tail = next;
        }
        Ok(SqlitePrepared::new(statement, query.into()))
    }

    fn begin_transaction(&mut self) -> Result<()> {
        self.exec_transaction_sql(SqliteGrammar::write_transaction_begin)
    }

    fn commit(&mut self) -> Result<()> {
        self.exec_transaction_sql(SqliteGrammar::write_transaction_commit)
    }

    fn roll_back(&mut self) -> Result<()> {
        self.exec_transaction_sql(SqliteGrammar::write_transaction_rollback)
    }
}
