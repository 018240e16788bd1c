//! Scripted [`TerminalSessions`] double for tests.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;

use crate::terminal::client::TerminalSessions;
use crate::terminal::errors::TerminalError;
use crate::terminal::types::{SessionPair, SessionVariant};

#[derive(Debug, Default)]
pub struct MockTerminal {
    /// Window ids considered alive.
    pub alive: RefCell<HashSet<String>>,
    pub created: RefCell<Vec<String>>,
    pub focused: RefCell<Vec<String>>,
    pub closed: RefCell<Vec<String>>,
    pub fail_create: bool,
    pub fail_close: bool,
    pub next_id: RefCell<u32>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a live window id.
    pub fn with_alive(self, id: &str) -> Self {
        self.alive.borrow_mut().insert(id.to_string());
        self
    }
}

impl TerminalSessions for MockTerminal {
    fn is_running(&self) -> bool {
        true
    }

    fn ensure_running(&self) -> Result<(), TerminalError> {
        Ok(())
    }

    fn create_session(
        &self,
        _path: &Path,
        name: &str,
        _variant: &SessionVariant,
    ) -> Result<SessionPair, TerminalError> {
        if self.fail_create {
            return Err(TerminalError::CommandFailed {
                command: "new-window".to_string(),
                message: "no server running".to_string(),
            });
        }

        let mut next = self.next_id.borrow_mut();
        let primary_id = format!("@{}", *next);
        let secondary_id = format!("@{}", *next + 1);
        *next += 2;

        self.alive.borrow_mut().insert(primary_id.clone());
        self.alive.borrow_mut().insert(secondary_id.clone());
        self.created.borrow_mut().push(name.to_string());

        Ok(SessionPair {
            primary_id,
            secondary_id,
        })
    }

    fn session_exists(&self, id: &str) -> Result<bool, TerminalError> {
        Ok(self.alive.borrow().contains(id))
    }

    fn focus_window(&self, id: &str) -> Result<(), TerminalError> {
        self.focused.borrow_mut().push(id.to_string());
        Ok(())
    }

    fn close_window(&self, id: &str) -> Result<(), TerminalError> {
        self.closed.borrow_mut().push(id.to_string());
        if self.fail_close {
            return Err(TerminalError::CommandFailed {
                command: "kill-window".to_string(),
                message: "window not found".to_string(),
            });
        }
        self.alive.borrow_mut().remove(id);
        Ok(())
    }
}
