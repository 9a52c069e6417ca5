#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{Bindings, Driver, Handle, Prepared, bindings};
    use sluice_sqlite::{SqliteDriver, SqliteHandle};
    use sluice_tests::{init_logs, silent_logs};
    use std::{fs, path::Path, sync::Mutex};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn create_database() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        SqliteHandle::open(&format!("sqlite://{}?mode=rwc", DB_PATH))
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        SqliteHandle::open(&format!("sqlite://{}?mode=ro", DB_PATH))
            .expect("Could not open the database");
        fs::remove_file(DB_PATH)
            .expect(format!("Failed to remove existing test database file {}", DB_PATH).as_str());
        silent_logs! {
            assert!(
                SqliteHandle::open(&format!("sqlite://{}?mode=ro", DB_PATH)).is_err(),
                "Should not be able to open in read only unexisting database"
            );
        }
    }

    #[test]
    fn wrong_url() {
        init_logs();
        silent_logs! {
            assert!(SqliteDriver::new().connect("duckdb://some_value").is_err());
        }
    }

    #[test]
    fn default_grammar() {
        let connection = SqliteDriver::new()
            .connect("sqlite://:memory:")
            .expect("Could not open the in memory database");
        assert_eq!(connection.query_grammar().name(), "sqlite");
    }

    #[test]
    fn prepare_errors() {
        init_logs();
        let mut handle = SqliteHandle::open("sqlite://:memory:").expect("Could not open");
        silent_logs! {
            assert!(handle.prepare("SELEC 1").is_err());
            assert!(handle.prepare("SELECT 1; SELECT 2").is_err());
            assert!(handle.prepare("   ").is_err());
            assert!(handle.prepare("SELECT 1 /* nul \0 */").is_err());
        }
        assert!(handle.prepare("SELECT 1;").is_ok());
        assert!(handle.prepare("SELECT 1;  \n").is_ok());
        assert!(handle.prepare("SELECT 1; -- trailing note").is_ok());
        assert!(handle.prepare("SELECT 1 /* a */; ; /* b */\n").is_ok());
        silent_logs! {
            assert!(handle.prepare("SELECT 1; -- note\nSELECT 2").is_err());
            assert!(handle.prepare("SELECT 1; SELEC 2").is_err());
        }
    }

    #[test]
    fn binding_errors() {
        init_logs();
        let mut handle = SqliteHandle::open("sqlite://:memory:").expect("Could not open");
        silent_logs! {
            {
                let mut prepared = handle.prepare("SELECT ? + ?").unwrap();
                assert!(prepared.execute(&bindings![1]).is_err());
                assert!(prepared.execute(&bindings![1, 2, 3]).is_err());
                assert!(prepared.execute(&bindings![1, 2]).is_ok());
            }
            {
                let mut prepared = handle.prepare("SELECT :a").unwrap();
                assert!(prepared.execute(&bindings! { "b" => 1 }).is_err());
            }
            {
                let mut prepared = handle.prepare("SELECT :a AS x, :b AS y").unwrap();
                assert!(prepared.execute(&bindings! { "a" => 1 }).is_err());
                assert!(prepared.execute(&bindings! { "a" => 1, "b" => 2 }).is_ok());
            }
            {
                let mut prepared = handle.prepare("SELECT :a, ?").unwrap();
                assert!(prepared.execute(&bindings! { "a" => 1 }).is_err());
            }
            {
                let mut prepared = handle.prepare("SELECT ?").unwrap();
                assert!(prepared.execute(&bindings![u64::MAX]).is_err());
            }
        }
    }

    #[test]
    fn trailing_comment() {
        init_logs();
        let mut connection = SqliteDriver::new()
            .connect("sqlite://:memory:")
            .expect("Could not open the in memory database");
        let rows = connection
            .select("SELECT 1 AS x; -- trailing note", bindings![])
            .expect("A trailing comment is not a statement");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<i64>("x").unwrap(), 1);
        let row = connection
            .select_one("SELECT :a AS x, :b AS y", bindings! { "a" => 1, "b" => "two" })
            .unwrap()
            .unwrap();
        assert_eq!(row.get::<String>("y").unwrap(), "two");
        silent_logs! {
            assert!(
                connection
                    .select("SELECT :a AS x, :b AS y", bindings! { "a" => 1 })
                    .is_err()
            );
        }
    }

    #[test]
    fn reuse_prepared() {
        init_logs();
        let mut handle = SqliteHandle::open("sqlite://:memory:").expect("Could not open");
        let mut prepared = handle
            .prepare("SELECT :value * 2 AS doubled, @other AS other")
            .expect("Could not prepare");
        for i in 0..3i64 {
            assert!(
                prepared
                    .execute(&bindings! { "value" => i, "@other" => "x" })
                    .expect("Could not execute")
            );
            let rows = prepared.fetch_all().expect("Could not fetch");
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].get::<i64>("doubled").unwrap(), i * 2);
            assert_eq!(rows[0].get::<String>("other").unwrap(), "x");
            assert_eq!(prepared.row_count().unwrap(), 0);
            assert!(prepared.fetch_all().unwrap().is_empty());
        }
    }

    #[test]
    fn row_count() {
        init_logs();
        let mut handle = SqliteHandle::open("sqlite://:memory:").expect("Could not open");
        handle
            .prepare("CREATE TABLE t (v INTEGER)")
            .unwrap()
            .execute(&Bindings::default())
            .unwrap();
        let mut insert = handle
            .prepare(indoc! {"
                INSERT INTO t (v)
                VALUES (1), (2), (3)
            "})
            .unwrap();
        insert.execute(&Bindings::default()).unwrap();
        assert_eq!(insert.row_count().unwrap(), 3);
        drop(insert);
        let mut select = handle.prepare("SELECT v FROM t").unwrap();
        select.execute(&Bindings::default()).unwrap();
        assert_eq!(select.row_count().unwrap(), 0);
        assert_eq!(select.fetch_all().unwrap().len(), 3);
        drop(select);
        let mut create = handle.prepare("CREATE TABLE u (v INTEGER)").unwrap();
        create.execute(&Bindings::default()).unwrap();
        assert_eq!(create.row_count().unwrap(), 0);
    }

    #[test]
    fn transactions() {
        init_logs();
        let mut handle = SqliteHandle::open("sqlite://:memory:").expect("Could not open");
        assert!(!handle.in_transaction());
        handle.begin_transaction().expect("Could not begin");
        assert!(handle.in_transaction());
        handle.roll_back().expect("Could not roll back");
        assert!(!handle.in_transaction());
        silent_logs! {
            assert!(handle.commit().is_err(), "Commit without a transaction should fail");
        }
    }
}
