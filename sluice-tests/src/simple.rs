use crate::{placeholders, silent_logs, table};
use indoc::formatdoc;
use sluice::{Connection, Driver, bindings};

pub fn simple<D: Driver>(connection: &mut Connection<D>) {
    let users = table(connection, "users");

    // Setup
    connection
        .statement(&format!("DROP TABLE IF EXISTS {users}"), bindings![])
        .expect("Failed to drop the users table");
    connection
        .statement(
            &formatdoc! {"
                    CREATE TABLE {} (
                        id INTEGER PRIMARY KEY,
                        name TEXT NOT NULL,
                        votes INTEGER NOT NULL
                    )
                ",
                users
            },
            bindings![],
        )
        .expect("Failed to create the users table");

    // Insert
    let insert = format!(
        "INSERT INTO {users} (id, name, votes) VALUES ({})",
        placeholders(connection, 3)
    );
    for (id, name, votes) in [(1, "taylor", 10), (2, "dayle", 3), (3, "shawn", 0)] {
        let inserted = connection
            .insert(&insert, bindings![id, name, votes])
            .expect("Failed to insert a user");
        assert!(inserted);
    }

    // Select
    let rows = connection
        .select(
            &format!("SELECT id, name, votes FROM {users} ORDER BY id"),
            bindings![],
        )
        .expect("Failed to select the users");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].names(), ["id", "name", "votes"]);
    assert_eq!(rows[0].get::<String>("name").unwrap(), "taylor");
    assert_eq!(rows[1].get::<i64>("votes").unwrap(), 3);
    assert_eq!(rows[2].get::<i32>("id").unwrap(), 3);

    // Select one
    let row = connection
        .select_one(
            &format!(
                "SELECT name FROM {users} WHERE votes > {}",
                placeholders(connection, 1)
            ),
            bindings![5],
        )
        .expect("Failed to select one user")
        .expect("Expected to find a user with more than 5 votes");
    assert_eq!(row.get::<String>("name").unwrap(), "taylor");
    let missing = connection
        .select_one(
            &format!(
                "SELECT name FROM {users} WHERE votes > {}",
                placeholders(connection, 1)
            ),
            bindings![100],
        )
        .expect("Failed to select one user");
    assert!(missing.is_none());

    // Update
    let updated = connection
        .update(
            &format!(
                "UPDATE {users} SET votes = votes + 1 WHERE votes < {}",
                placeholders(connection, 1)
            ),
            bindings![5],
        )
        .expect("Failed to update the users");
    assert_eq!(updated, 2);
    let updated = connection
        .update(
            &format!(
                "UPDATE {users} SET votes = 0 WHERE name = {}",
                placeholders(connection, 1)
            ),
            bindings!["nobody"],
        )
        .expect("Failed to update the users");
    assert_eq!(updated, 0);

    // Delete
    let deleted = connection
        .delete(
            &format!("DELETE FROM {users} WHERE id = {}", placeholders(connection, 1)),
            bindings![2],
        )
        .expect("Failed to delete a user");
    assert_eq!(deleted, 1);
    let remaining = connection
        .select(&format!("SELECT id FROM {users}"), bindings![])
        .expect("Failed to select the users");
    assert_eq!(remaining.len(), 2);

    // Driver errors come back as errors, and are logged
    let before = connection.query_log().len();
    silent_logs! {
        assert!(
            connection
                .select("SELECT FROM WHERE", bindings![])
                .is_err()
        );
        assert!(
            connection
                .statement(&format!("INSERT INTO {users} (id) VALUES (NULL)"), bindings![])
                .is_err()
        );
    }
    assert_eq!(connection.query_log().len(), before + 2);
}
