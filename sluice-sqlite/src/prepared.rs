use crate::{
    CBox, SqliteHandle, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::*;
use sluice_core::{
    Binding, Bindings, Error, Prepared, Result, RowLabeled, RowNames, Value, truncate_long,
};
use std::{
    ffi::{CStr, CString, c_char, c_int, c_void},
    fmt::{self, Display},
    marker::PhantomData,
    mem,
};

/// A statement prepared on a [`SqliteHandle`], finalized on drop.
///
/// `execute` steps the statement to completion: produced rows are buffered for
/// `fetch_all`, the number of changed rows for `row_count`.
pub struct SqlitePrepared<'h> {
    pub(crate) statement: CBox<*mut sqlite3_stmt>,
    query: String,
    rows: Vec<RowLabeled>,
    changes: u64,
    _handle: PhantomData<&'h mut SqliteHandle>,
}

impl<'h> SqlitePrepared<'h> {
    pub(crate) fn new(statement: CBox<*mut sqlite3_stmt>, query: String) -> Self {
        Self {
            statement,
            query,
            rows: Vec::new(),
            changes: 0,
            _handle: PhantomData,
        }
    }

    fn db(&self) -> *mut sqlite3 {
        unsafe { sqlite3_db_handle(*self.statement) }
    }

    fn last_error(&self) -> Error {
        Error::msg(error_message_from_ptr(unsafe { sqlite3_errmsg(self.db()) }).to_string())
    }

    fn parameter_index(&self, name: &str) -> Result<c_int> {
        let candidates = if name.starts_with([':', '@', '$']) {
            vec![name.to_string()]
        } else {
            vec![format!(":{}", name), format!("@{}", name), format!("${}", name)]
        };
        for candidate in candidates {
            let candidate = CString::new(candidate)?;
            let index = unsafe { sqlite3_bind_parameter_index(*self.statement, candidate.as_ptr()) };
            if index > 0 {
                return Ok(index);
            }
        }
        Err(Error::msg(format!(
            "The query does not have a parameter named `{}`:\n{}",
            name,
            truncate_long!(self.query)
        )))
    }

    fn bind(&mut self, bindings: &Bindings) -> Result<()> {
        let expected = unsafe { sqlite3_bind_parameter_count(*self.statement) } as usize;
        if !bindings.is_named() && bindings.len() != expected {
            return Err(Error::msg(format!(
                "The query expects {} parameters but {} were provided:\n{}",
                expected,
                bindings.len(),
                truncate_long!(self.query)
            )));
        }
        if bindings.is_named() {
            for index in 1..=expected as c_int {
                let name = unsafe { sqlite3_bind_parameter_name(*self.statement, index) };
                if name.is_null() {
                    return Err(Error::msg(format!(
                        "Parameter {} is positional, it cannot receive a named binding:\n{}",
                        index,
                        truncate_long!(self.query)
                    )));
                }
                let name = unsafe { CStr::from_ptr(name) }.to_str()?;
                if bindings.get(name).is_none() {
                    return Err(Error::msg(format!(
                        "The parameter `{}` has no binding:\n{}",
                        name,
                        truncate_long!(self.query)
                    )));
                }
            }
        }
        for binding in bindings.iter() {
            let (index, value) = match binding {
                Binding::Position(i, value) => (i as c_int + 1, value),
                Binding::Name(name, value) => (self.parameter_index(name)?, value),
            };
            self.bind_index(value, index)?;
        }
        Ok(())
    }

    fn bind_index(&mut self, value: &Value, index: c_int) -> Result<()> {
        let statement = *self.statement;
        let rc = unsafe {
            match value {
                v if v.is_null() => sqlite3_bind_null(statement, index),
                Value::Boolean(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int32(Some(v)) => sqlite3_bind_int(statement, index, *v),
                Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
                Value::UInt64(Some(v)) => {
                    let Ok(v) = sqlite3_int64::try_from(*v) else {
                        return Err(Error::msg(format!(
                            "Cannot bind u64 value `{}` into sqlite integer because it's out of bounds",
                            v
                        )));
                    };
                    sqlite3_bind_int64(statement, index, v)
                }
                Value::Float32(Some(v)) => sqlite3_bind_double(statement, index, *v as f64),
                Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
                Value::Blob(Some(v)) => sqlite3_bind_blob(
                    statement,
                    index,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                _ => {
                    let Some(text) = value.as_text() else {
                        let error =
                            Error::msg(format!("Cannot use a {:?} as a query parameter", value));
                        log::error!("{:#}", error);
                        return Err(error);
                    };
                    sqlite3_bind_text(
                        statement,
                        index,
                        text.as_ptr() as *const c_char,
                        text.len() as c_int,
                        SQLITE_TRANSIENT(),
                    )
                }
            }
        };
        if rc != SQLITE_OK {
            let error = self.last_error().context(format!(
                "Cannot bind parameter {} to query:\n{}",
                index,
                truncate_long!(self.query)
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }
}

impl<'h> Prepared for SqlitePrepared<'h> {
    fn execute(&mut self, bindings: &Bindings) -> Result<bool> {
        let statement = *self.statement;
        unsafe {
            sqlite3_reset(statement);
            sqlite3_clear_bindings(statement);
        }
        self.rows.clear();
        self.changes = 0;
        self.bind(bindings)?;
        let count = unsafe { sqlite3_column_count(statement) };
        let labels = (0..count)
            .map(|i| extract_name(statement, i))
            .collect::<Result<RowNames>>()?;
        let total_changes = unsafe { sqlite3_total_changes(self.db()) };
        loop {
            match unsafe { sqlite3_step(statement) } {
                SQLITE_DONE => break,
                SQLITE_ROW => {
                    let values = (0..count)
                        .map(|i| extract_value(statement, i))
                        .collect::<Result<_>>()?;
                    self.rows.push(RowLabeled::new(labels.clone(), values));
                }
                _ => {
                    let error = self.last_error().context(format!(
                        "While executing the query:\n{}",
                        truncate_long!(self.query)
                    ));
                    log::error!("{:#}", error);
                    unsafe {
                        sqlite3_reset(statement);
                    }
                    return Err(error);
                }
            }
        }
        if unsafe { sqlite3_total_changes(self.db()) } != total_changes {
            self.changes = unsafe { sqlite3_changes(self.db()) } as u64;
        }
        Ok(true)
    }

    fn fetch_all(&mut self) -> Result<Vec<RowLabeled>> {
        Ok(mem::take(&mut self.rows))
    }

    fn row_count(&self) -> Result<u64> {
        Ok(self.changes)
    }
}

impl<'h> Display for SqlitePrepared<'h> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.query))
    }
}
