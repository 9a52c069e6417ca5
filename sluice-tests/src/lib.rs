mod log_and_pretend;
mod simple;
mod transaction1;
mod values;

use log::LevelFilter;
use log_and_pretend::log_and_pretend;
use simple::simple;
use sluice::{Connection, Driver};
use std::{
    env,
    sync::{Mutex, PoisonError},
};
#[cfg(not(feature = "disable-transactions"))]
use transaction1::transaction1;
use values::values;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the driver agnostic suite against a live connection.
pub fn execute_tests<D: Driver>(connection: &mut Connection<D>) {
    simple(connection);
    values(connection);
    #[cfg(not(feature = "disable-transactions"))]
    transaction1(connection);
    log_and_pretend(connection);
}

/// Keeps the logger muted while alive. Nested and concurrent guards share a counter, the
/// level seen by the first one is restored when the last one drops, also while unwinding.
pub struct SilentLogs(());

static SILENCED: Mutex<(usize, LevelFilter)> = Mutex::new((0, LevelFilter::Off));

impl SilentLogs {
    pub fn new() -> Self {
        let mut silenced = SILENCED.lock().unwrap_or_else(PoisonError::into_inner);
        if silenced.0 == 0 {
            silenced.1 = log::max_level();
            log::set_max_level(LevelFilter::Off);
        }
        silenced.0 += 1;
        SilentLogs(())
    }
}

impl Drop for SilentLogs {
    fn drop(&mut self) {
        let mut silenced = SILENCED.lock().unwrap_or_else(PoisonError::into_inner);
        silenced.0 -= 1;
        if silenced.0 == 0 {
            log::set_max_level(silenced.1);
        }
    }
}

/// Mute the logger while running the block, for tests that expect failures.
#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let _silent = $crate::SilentLogs::new();
        $($code)+
    }};
}

/// Comma separated placeholders for `count` parameters, in the connection's grammar.
pub fn placeholders<D: Driver>(connection: &Connection<D>, count: usize) -> String {
    let grammar = connection.query_grammar();
    let mut out = String::new();
    for i in 0..count {
        if i > 0 {
            out.push_str(", ");
        }
        grammar.write_placeholder(&mut out, i);
    }
    out
}

/// Quoted and prefixed table name, in the connection's grammar.
pub fn table<D: Driver>(connection: &Connection<D>, name: &str) -> String {
    let mut out = String::new();
    connection.query_grammar().write_table_name(&mut out, name);
    out
}
