use crate::{placeholders, table};
use sluice::{Connection, Driver, bindings};

pub fn log_and_pretend<D: Driver>(connection: &mut Connection<D>) {
    let notes = table(connection, "notes");
    connection
        .statement(&format!("DROP TABLE IF EXISTS {notes}"), bindings![])
        .expect("Failed to drop the notes table");
    connection
        .statement(&format!("CREATE TABLE {notes} (body TEXT)"), bindings![])
        .expect("Failed to create the notes table");
    let insert = format!(
        "INSERT INTO {notes} (body) VALUES ({})",
        placeholders(connection, 1)
    );
    let select = format!("SELECT body FROM {notes}");

    // Every call is logged once, in order
    connection.flush_query_log();
    assert!(connection.query_log().is_empty());
    connection
        .insert(&insert, bindings!["first"])
        .expect("Failed to insert a note");
    connection
        .select_one(&select, bindings![])
        .expect("Failed to select a note");
    let log = connection.query_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].query, insert);
    assert_eq!(log[0].bindings, bindings!["first"]);
    assert!(log[0].time >= 0.0);
    assert_eq!(log[1].query, select);
    assert!(log[1].bindings.is_empty());

    // Disabled logging records nothing
    connection.disable_query_log();
    connection
        .insert(&insert, bindings!["second"])
        .expect("Failed to insert a note");
    assert_eq!(connection.query_log().len(), 2);
    connection.enable_query_log();

    // Pretending logs the statements without running them
    let pretended = connection
        .pretend(|connection| {
            assert!(connection.insert(&insert, bindings!["ghost"])?);
            assert_eq!(connection.update(&format!("DELETE FROM {notes}"), bindings![])?, 0);
            assert!(connection.select(&select, bindings![])?.is_empty());
            Ok(())
        })
        .expect("Failed to pretend");
    assert_eq!(pretended.len(), 3);
    assert_eq!(pretended[0].bindings, bindings!["ghost"]);
    assert_eq!(connection.query_log().len(), 2);
    assert!(!connection.pretending());
    let rows = connection
        .select(&select, bindings![])
        .expect("Failed to select the notes");
    assert_eq!(rows.len(), 2);
}
