//! Scripted management client for tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use dmr::{CmdResult, ManagementClient, Result};

/// A client scripted with the exact command sequence a test expects.
///
/// Each executed command is matched against the next scripted step;
/// any deviation fails the test immediately. [`ScriptedClient::assert_done`]
/// verifies the script ran to completion.
pub struct ScriptedClient {
    steps: RefCell<VecDeque<(String, CmdResult)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            steps: RefCell::new(VecDeque::new()),
        }
    }

    pub fn expect(self, command: &str, result: CmdResult) -> Self {
        self.steps
            .borrow_mut()
            .push_back((command.to_string(), result));
        self
    }

    pub fn assert_done(&self) {
        let remaining = self.steps.borrow();
        assert!(
            remaining.is_empty(),
            "expected {} more command(s), next: {:?}",
            remaining.len(),
            remaining.front().map(|(cmd, _)| cmd)
        );
    }
}

impl ManagementClient for ScriptedClient {
    fn execute(&self, command: &str) -> Result<CmdResult> {
        let (expected, result) = self
            .steps
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command: {command}"));
        assert_eq!(command, expected, "command out of script order");
        Ok(result)
    }
}
