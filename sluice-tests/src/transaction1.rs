use crate::{placeholders, silent_logs, table};
use sluice::{Connection, Driver, Error, bindings};

pub fn transaction1<D: Driver>(connection: &mut Connection<D>) {
    let accounts = table(connection, "accounts");
    connection
        .statement(&format!("DROP TABLE IF EXISTS {accounts}"), bindings![])
        .expect("Failed to drop the accounts table");
    connection
        .statement(
            &format!("CREATE TABLE {accounts} (name TEXT PRIMARY KEY, balance INTEGER NOT NULL)"),
            bindings![],
        )
        .expect("Failed to create the accounts table");
    let insert = format!(
        "INSERT INTO {accounts} (name, balance) VALUES ({})",
        placeholders(connection, 2)
    );
    let count = format!("SELECT COUNT(*) AS total FROM {accounts}");

    // Commit
    let result = connection
        .transaction(|connection| {
            connection.insert(&insert, bindings!["alice", 100])?;
            connection.insert(&insert, bindings!["bob", 50])?;
            Ok("committed")
        })
        .expect("Failed to run the committed transaction");
    assert_eq!(result, "committed");
    let total = connection
        .select_one(&count, bindings![])
        .expect("Failed to count the accounts")
        .expect("Expected a count row");
    assert_eq!(total.get::<i64>("total").unwrap(), 2);

    // Rollback on a failure raised by the work
    let result: sluice::Result<()> = silent_logs! {
        connection.transaction(|connection| {
            connection.insert(&insert, bindings!["carol", 10])?;
            Err(Error::msg("insufficient funds"))
        })
    };
    let error = result.expect_err("The transaction should have failed");
    assert_eq!(error.to_string(), "insufficient funds");

    // Rollback on a failure raised by the driver
    let result = silent_logs! {
        connection.transaction(|connection| {
            connection.insert(&insert, bindings!["dave", 10])?;
            connection.insert(&insert, bindings!["alice", 10])
        })
    };
    assert!(result.is_err(), "Duplicate primary key should fail the transaction");

    let total = connection
        .select_one(&count, bindings![])
        .expect("Failed to count the accounts")
        .expect("Expected a count row");
    assert_eq!(total.get::<i64>("total").unwrap(), 2);
}
