use crate::{
    Bindings, Driver, Grammar, Handle, Prepared, QueryLogEntry, Result, RowLabeled, elapsed_ms,
    truncate_long,
};
use std::{cell::OnceCell, mem, time::Instant};

/// A logged, transactional session over one native driver handle.
///
/// Every execution primitive is timed and recorded in the query log, then its result is
/// shaped to the caller's intent: rows for [`select`](Self::select), a success flag for
/// [`statement`](Self::statement), an affected row count for
/// [`affecting_statement`](Self::affecting_statement).
///
/// Driver errors are returned unchanged. The connection is meant for sequential use by a
/// single owner, which `&mut self` on every primitive enforces.
pub struct Connection<D: Driver> {
    driver: D,
    handle: D::Handle,
    grammar: OnceCell<Box<dyn Grammar>>,
    database: Option<String>,
    table_prefix: String,
    query_log: Vec<QueryLogEntry>,
    logging: bool,
    pretending: bool,
}

impl<D: Driver> Connection<D> {
    pub fn new(driver: D, handle: D::Handle) -> Self {
        Self {
            driver,
            handle,
            grammar: OnceCell::new(),
            database: None,
            table_prefix: String::new(),
            query_log: Vec::new(),
            logging: true,
            pretending: false,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.set_table_prefix(prefix);
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn handle(&self) -> &D::Handle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut D::Handle {
        &mut self.handle
    }

    /// Release the native handle, its disposal is up to the caller.
    pub fn into_handle(self) -> D::Handle {
        self.handle
    }

    pub fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    pub fn set_table_prefix(&mut self, prefix: impl Into<String>) {
        self.table_prefix = prefix.into();
        if let Some(grammar) = self.grammar.get_mut() {
            grammar.set_table_prefix(&self.table_prefix);
        }
    }

    /// Run a select and return its first row, `None` when the result is empty.
    pub fn select_one(&mut self, query: &str, bindings: Bindings) -> Result<Option<RowLabeled>> {
        Ok(self.select(query, bindings)?.into_iter().next())
    }

    /// Run a select and return all its rows.
    pub fn select(&mut self, query: &str, bindings: Bindings) -> Result<Vec<RowLabeled>> {
        self.run(query, bindings, Vec::new(), |handle, query, bindings| {
            let mut prepared = handle.prepare(query)?;
            prepared.execute(bindings)?;
            prepared.fetch_all()
        })
    }

    pub fn insert(&mut self, query: &str, bindings: Bindings) -> Result<bool> {
        self.statement(query, bindings)
    }

    pub fn update(&mut self, query: &str, bindings: Bindings) -> Result<u64> {
        self.affecting_statement(query, bindings)
    }

    pub fn delete(&mut self, query: &str, bindings: Bindings) -> Result<u64> {
        self.affecting_statement(query, bindings)
    }

    /// Execute a statement and return the driver's success flag.
    pub fn statement(&mut self, query: &str, bindings: Bindings) -> Result<bool> {
        self.run(query, bindings, true, |handle, query, bindings| {
            handle.prepare(query)?.execute(bindings)
        })
    }

    /// Execute a statement and return the number of rows it affected.
    pub fn affecting_statement(&mut self, query: &str, bindings: Bindings) -> Result<u64> {
        self.run(query, bindings, 0, |handle, query, bindings| {
            let mut prepared = handle.prepare(query)?;
            prepared.execute(bindings)?;
            prepared.row_count()
        })
    }

    fn run<T, F>(&mut self, query: &str, bindings: Bindings, pretended: T, f: F) -> Result<T>
    where
        F: FnOnce(&mut D::Handle, &str, &Bindings) -> Result<T>,
    {
        let start = Instant::now();
        let result = if self.pretending {
            Ok(pretended)
        } else {
            f(&mut self.handle, query, &bindings)
        };
        let time = elapsed_ms(start);
        match &result {
            Ok(..) => log::debug!("[{:.3}ms] {}", time, truncate_long!(query)),
            Err(e) => log::error!("{:#}", e),
        }
        self.log_query(query, bindings, time);
        result
    }

    fn log_query(&mut self, query: &str, bindings: Bindings, time: f64) {
        if self.logging {
            self.query_log.push(QueryLogEntry {
                query: query.into(),
                bindings,
                time,
            });
        }
    }

    /// Statements executed so far, in execution order.
    pub fn query_log(&self) -> &[QueryLogEntry] {
        &self.query_log
    }

    pub fn flush_query_log(&mut self) {
        self.query_log.clear();
    }

    pub fn enable_query_log(&mut self) {
        self.logging = true;
    }

    pub fn disable_query_log(&mut self) {
        self.logging = false;
    }

    pub fn logging(&self) -> bool {
        self.logging
    }

    pub fn pretending(&self) -> bool {
        self.pretending
    }

    /// Run `work` without touching the database and return the statements it would execute.
    ///
    /// While pretending, selects return no rows, statements succeed and affect no rows.
    pub fn pretend<F>(&mut self, work: F) -> Result<Vec<QueryLogEntry>>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let logging = mem::replace(&mut self.logging, true);
        let pretending = mem::replace(&mut self.pretending, true);
        let saved = mem::take(&mut self.query_log);
        let result = work(self);
        let pretended = mem::replace(&mut self.query_log, saved);
        self.logging = logging;
        self.pretending = pretending;
        result.map(|_| pretended)
    }

    /// The active query grammar, resolving the driver default if none was set.
    pub fn query_grammar(&self) -> &dyn Grammar {
        self.grammar
            .get_or_init(|| self.prefixed(Box::new(self.driver.grammar())))
            .as_ref()
    }

    pub fn set_query_grammar(&mut self, grammar: impl Grammar + 'static) {
        self.grammar = OnceCell::from(self.prefixed(Box::new(grammar)));
    }

    /// Make the driver default grammar the active one.
    pub fn use_default_query_grammar(&mut self) {
        self.grammar = OnceCell::from(self.prefixed(Box::new(self.driver.grammar())));
    }

    fn prefixed(&self, mut grammar: Box<dyn Grammar>) -> Box<dyn Grammar> {
        grammar.set_table_prefix(&self.table_prefix);
        grammar
    }
}
