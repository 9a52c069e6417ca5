mod mock;

#[cfg(test)]
mod tests {
    use crate::mock::{MockError, connection};
    use sluice_core::{Error, bindings};
    use sluice_tests::{init_logs, silent_logs};
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn transaction_method_runs_successfully() {
        init_logs();
        let (mut connection, state) = connection();
        let result = connection
            .transaction(|_| Ok("foo"))
            .expect("Transaction should commit");
        assert_eq!(result, "foo");
        let state = state.borrow();
        assert_eq!(state.begins, 1);
        assert_eq!(state.commits, 1);
        assert_eq!(state.rollbacks, 0);
    }

    #[test]
    fn transaction_method_rolls_back_and_propagates() {
        init_logs();
        let (mut connection, state) = connection();
        let error = silent_logs! {
            connection.transaction(|_| -> sluice_core::Result<()> {
                Err(Error::new(MockError("foo".into())))
            })
        }
        .expect_err("Transaction should fail");
        assert_eq!(error.to_string(), "foo");
        assert_eq!(
            error.downcast_ref::<MockError>(),
            Some(&MockError("foo".into()))
        );
        let state = state.borrow();
        assert_eq!(state.begins, 1);
        assert_eq!(state.commits, 0);
        assert_eq!(state.rollbacks, 1);
    }

    #[test]
    fn transaction_work_uses_the_connection() {
        let (mut connection, state) = connection();
        state.borrow_mut().row_count = 1;
        let updated = connection
            .transaction(|connection| {
                connection.insert("insert", bindings![1])?;
                connection.update("update", bindings![2])
            })
            .expect("Transaction should commit");
        assert_eq!(updated, 1);
        assert_eq!(state.borrow().prepared, ["insert", "update"]);
        assert_eq!(state.borrow().commits, 1);
        assert_eq!(connection.query_log().len(), 2);
    }

    #[test]
    fn transaction_driver_failure_rolls_back() {
        init_logs();
        let (mut connection, state) = connection();
        state.borrow_mut().fail_execute = Some(MockError("UNIQUE constraint failed".into()));
        let error = silent_logs! {
            connection.transaction(|connection| connection.statement("insert", bindings![1]))
        }
        .expect_err("Transaction should fail");
        assert!(error.downcast_ref::<MockError>().is_some());
        let state = state.borrow();
        assert_eq!(state.commits, 0);
        assert_eq!(state.rollbacks, 1);
    }

    #[test]
    fn transaction_rollback_failure_keeps_both_errors() {
        init_logs();
        let (mut connection, state) = connection();
        state.borrow_mut().fail_rollback = Some(MockError("connection lost".into()));
        let error = silent_logs! {
            connection.transaction(|_| -> sluice_core::Result<()> { Err(Error::msg("foo")) })
        }
        .expect_err("Transaction should fail");
        let message = format!("{:#}", error);
        assert!(message.contains("foo"), "{}", message);
        assert!(message.contains("connection lost"), "{}", message);
        assert!(error.downcast_ref::<MockError>().is_some());
        assert_eq!(state.borrow().rollbacks, 1);
        assert_eq!(state.borrow().commits, 0);
    }

    #[test]
    fn transaction_begin_failure_skips_the_work() {
        init_logs();
        let (mut connection, state) = connection();
        state.borrow_mut().fail_begin = Some(MockError("database is locked".into()));
        let mut invoked = false;
        let error = silent_logs! {
            connection.transaction(|_| {
                invoked = true;
                Ok(())
            })
        }
        .expect_err("Transaction should fail");
        assert!(!invoked);
        assert_eq!(error.to_string(), "database is locked");
        let state = state.borrow();
        assert_eq!(state.begins, 1);
        assert_eq!(state.commits, 0);
        assert_eq!(state.rollbacks, 0);
    }

    #[test]
    fn transaction_panic_rolls_back_and_resumes() {
        init_logs();
        let (mut connection, state) = connection();
        let hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let outcome = silent_logs! {
            panic::catch_unwind(AssertUnwindSafe(|| {
                let _ = connection.transaction(|_| -> sluice_core::Result<()> { panic!("boom") });
            }))
        };
        panic::set_hook(hook);
        let payload = outcome.expect_err("The panic should be resumed");
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
        let state = state.borrow();
        assert_eq!(state.commits, 0);
        assert_eq!(state.rollbacks, 1);
    }

    #[test]
    fn pretended_transaction_leaves_the_handle_alone() {
        let (mut connection, state) = connection();
        let pretended = connection
            .pretend(|connection| {
                let inserted = connection
                    .transaction(|connection| connection.statement("insert", bindings![1]))?;
                assert!(inserted);
                let failed = connection.transaction(|connection| -> sluice_core::Result<()> {
                    connection.statement("update", bindings![2])?;
                    Err(Error::msg("foo"))
                });
                assert!(failed.is_err());
                Ok(())
            })
            .expect("Pretend should succeed");
        assert_eq!(pretended.len(), 2);
        let state = state.borrow();
        assert_eq!(state.begins, 0);
        assert_eq!(state.commits, 0);
        assert_eq!(state.rollbacks, 0);
        assert!(state.prepared.is_empty());
    }
}
