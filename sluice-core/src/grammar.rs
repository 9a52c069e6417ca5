use crate::Value;
use std::fmt::Write;

/// Dialect strategy used by the layers that build SQL on top of a [`Connection`](crate::Connection).
///
/// A connection holds exactly one active grammar. Drivers supply their default through
/// [`Driver::grammar`](crate::Driver::grammar); callers may replace it at any time.
/// Only the table prefix is state, everything else has an ANSI leaning default.
pub trait Grammar: Send {
    fn name(&self) -> &str;
    fn table_prefix(&self) -> &str;
    fn set_table_prefix(&mut self, prefix: &str);

    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        if value == "*" {
            out.push('*');
            return;
        }
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    /// Write a table reference applying the table prefix.
    ///
    /// Accepts `table`, `schema.table` and an optional `AS alias` suffix.
    fn write_table_name(&self, out: &mut String, table: &str) {
        let (table, alias) = split_alias(table);
        let (schema, name) = match table.rsplit_once('.') {
            Some((schema, name)) => (Some(schema), name),
            None => (None, table),
        };
        if let Some(schema) = schema {
            self.write_identifier_quoted(out, schema);
            out.push('.');
        }
        let prefixed = format!("{}{}", self.table_prefix(), name);
        self.write_identifier_quoted(out, &prefixed);
        if let Some(alias) = alias {
            out.push_str(" AS ");
            self.write_identifier_quoted(out, &format!("{}{}", self.table_prefix(), alias));
        }
    }

    /// Write the placeholder of the parameter at `index` (from 0).
    fn write_placeholder(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    /// Write `value` as an inline SQL literal.
    fn write_value(&self, out: &mut String, value: &Value) {
        let _ = match value {
            Value::Boolean(Some(v)) => out.write_str(if *v { "TRUE" } else { "FALSE" }),
            _ => write!(out, "{}", value),
        };
    }

    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("BEGIN TRANSACTION;");
    }

    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT;");
    }

    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK;");
    }
}

fn split_alias(value: &str) -> (&str, Option<&str>) {
    let lower = value.to_ascii_lowercase();
    match lower.find(" as ") {
        Some(i) => (value[..i].trim(), Some(value[i + 4..].trim())),
        None => (value.trim(), None),
    }
}
