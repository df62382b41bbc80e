//! Inline edit sessions.
//!
//! An [`EditSession`] holds one row while it is edited. Keystrokes only fill the
//! buffer; the diff runs once, when the edit is committed.
//!
//! ```text
//!  Idle --begin--> Editing --commit--> Committing --complete--> Idle
//!                     |                     (no-op plans skip Committing)
//!                     +-------cancel------> Idle
//! ```

use std::fmt;

use serde_json::Value;

use crate::diff::{DiffEngine, Record, UpdatePlan};
use crate::error::{QueryError, QueryResult};

/// Where an edit session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    /// No edit in progress.
    #[default]
    Idle,
    /// Accumulating proposed values.
    Editing,
    /// A plan was handed out and its write is in flight.
    Committing,
}

impl fmt::Display for EditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Editing => "editing",
            Self::Committing => "committing",
        })
    }
}

/// Edit state for a single row.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    state: EditState,
    original: Record,
    buffer: Record,
}

impl EditSession {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> EditState {
        self.state
    }

    /// Snapshot taken when the edit began.
    pub fn original(&self) -> &Record {
        &self.original
    }

    /// Values proposed so far.
    pub fn proposed(&self) -> &Record {
        &self.buffer
    }

    /// Start editing `original`.
    pub fn begin(&mut self, original: Record) -> QueryResult<()> {
        self.require_state(EditState::Idle, "begin an edit")?;
        self.original = original;
        self.buffer.clear();
        self.state = EditState::Editing;
        Ok(())
    }

    /// Record a proposed value. Does not diff.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> QueryResult<()> {
        self.require_state(EditState::Editing, "set a value")?;
        self.buffer.insert(key.into(), value.into());
        Ok(())
    }

    /// Discard the edit. Always allowed.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Diff the buffer against the snapshot.
    ///
    /// A no-op plan ends the session right away. Otherwise the session waits in
    /// [`EditState::Committing`] until [`EditSession::complete`] is called. A failed diff
    /// also ends the session.
    pub fn commit(&mut self, engine: &DiffEngine<'_>) -> QueryResult<UpdatePlan> {
        self.require_state(EditState::Editing, "commit")?;
        match engine.compute(&self.original, &self.buffer) {
            Ok(plan) if plan.is_noop() => {
                self.reset();
                Ok(plan)
            }
            Ok(plan) => {
                self.state = EditState::Committing;
                Ok(plan)
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Mark the write as finished, successfully or not.
    pub fn complete(&mut self) -> QueryResult<()> {
        self.require_state(EditState::Committing, "complete a commit")?;
        self.reset();
        Ok(())
    }

    fn require_state(&self, state: EditState, operation: &str) -> QueryResult<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(QueryError::invalid_session_state(operation, self.state))
        }
    }

    fn reset(&mut self) {
        self.state = EditState::Idle;
        self.original.clear();
        self.buffer.clear();
    }
}
