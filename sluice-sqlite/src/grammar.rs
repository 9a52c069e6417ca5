use sluice_core::{Grammar, Value};
use std::fmt::Write;

#[derive(Default, Debug, Clone)]
pub struct SqliteGrammar {
    table_prefix: String,
}

impl SqliteGrammar {
    pub const fn new() -> Self {
        Self {
            table_prefix: String::new(),
        }
    }
}

impl Grammar for SqliteGrammar {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn set_table_prefix(&mut self, prefix: &str) {
        self.table_prefix = prefix.into();
    }

    fn write_value(&self, out: &mut String, value: &Value) {
        let _ = match value {
            Value::Boolean(Some(v)) => out.write_char(if *v { '1' } else { '0' }),
            Value::Float32(Some(v)) if v.is_infinite() => {
                out.write_str(if *v > 0.0 { "1.0e+10000" } else { "-1.0e+10000" })
            }
            Value::Float64(Some(v)) if v.is_infinite() => {
                out.write_str(if *v > 0.0 { "1.0e+10000" } else { "-1.0e+10000" })
            }
            _ => write!(out, "{}", value),
        };
    }

    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("BEGIN;");
    }
}
