#![allow(dead_code)]

use sluice_core::{Bindings, Driver, Error, Grammar, Handle, Prepared, Result, RowLabeled, Value};
use std::{cell::RefCell, fmt, rc::Rc};

/// Error type raised by the mock driver, to check that errors come back untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MockError {}

#[derive(Default, Debug)]
pub struct MockState {
    pub prepared: Vec<String>,
    pub executed: Vec<Bindings>,
    pub fetched: usize,
    pub row_counted: usize,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub grammars: usize,
    pub rows: Vec<RowLabeled>,
    pub execute_result: bool,
    pub row_count: u64,
    pub fail_prepare: Option<MockError>,
    pub fail_execute: Option<MockError>,
    pub fail_begin: Option<MockError>,
    pub fail_rollback: Option<MockError>,
}

pub type Shared = Rc<RefCell<MockState>>;

pub struct MockDriver {
    pub state: Shared,
}

pub struct MockHandle {
    pub state: Shared,
}

pub struct MockPrepared {
    state: Shared,
}

#[derive(Debug, Default)]
pub struct MockGrammar {
    pub tag: String,
    pub prefix: String,
}

pub fn row(name: &str, value: impl Into<Value>) -> RowLabeled {
    let value: Value = value.into();
    RowLabeled::new([name.to_string()].into(), [value].into())
}

/// A connection over a mock handle, along with the state the mock records.
pub fn connection() -> (sluice_core::Connection<MockDriver>, Shared) {
    let state = Shared::default();
    state.borrow_mut().execute_result = true;
    let driver = MockDriver {
        state: state.clone(),
    };
    let handle = MockHandle {
        state: state.clone(),
    };
    (sluice_core::Connection::new(driver, handle), state)
}

fn fail(error: &Option<MockError>) -> Result<()> {
    match error {
        Some(e) => Err(Error::new(e.clone())),
        None => Ok(()),
    }
}

impl Driver for MockDriver {
    type Handle = MockHandle;
    type Grammar = MockGrammar;

    const NAME: &'static str = "mock";

    fn grammar(&self) -> MockGrammar {
        let mut state = self.state.borrow_mut();
        state.grammars += 1;
        MockGrammar {
            tag: format!("mock-{}", state.grammars),
            prefix: String::new(),
        }
    }

    fn open(&self, _url: &str) -> Result<MockHandle> {
        Ok(MockHandle {
            state: self.state.clone(),
        })
    }
}

impl Handle for MockHandle {
    type Prepared<'h> = MockPrepared;

    fn prepare(&mut self, query: &str) -> Result<MockPrepared> {
        let mut state = self.state.borrow_mut();
        state.prepared.push(query.into());
        fail(&state.fail_prepare)?;
        Ok(MockPrepared {
            state: self.state.clone(),
        })
    }

    fn begin_transaction(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.begins += 1;
        fail(&state.fail_begin)
    }

    fn commit(&mut self) -> Result<()> {
        self.state.borrow_mut().commits += 1;
        Ok(())
    }

    fn roll_back(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.rollbacks += 1;
        fail(&state.fail_rollback)
    }
}

impl Prepared for MockPrepared {
    fn execute(&mut self, bindings: &Bindings) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        state.executed.push(bindings.clone());
        fail(&state.fail_execute)?;
        Ok(state.execute_result)
    }

    fn fetch_all(&mut self) -> Result<Vec<RowLabeled>> {
        let mut state = self.state.borrow_mut();
        state.fetched += 1;
        Ok(state.rows.clone())
    }

    fn row_count(&self) -> Result<u64> {
        let mut state = self.state.borrow_mut();
        state.row_counted += 1;
        Ok(state.row_count)
    }
}

impl Grammar for MockGrammar {
    fn name(&self) -> &str {
        &self.tag
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn set_table_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.into();
    }
}
