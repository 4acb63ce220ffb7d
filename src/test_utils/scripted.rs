//! In-memory [`Link`] that replays queued responses and records every call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::LinkError;
use crate::link::{Connector, Link};
use crate::postgres::{ConnectionOptions, DecodePolicy};
use crate::results::ResultSet;
use crate::types::RowValues;

/// One `Link::query` call as the link received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub sql: String,
    pub values: Option<Vec<RowValues>>,
}

#[derive(Default)]
struct ScriptState {
    calls: Vec<RecordedCall>,
    responses: VecDeque<Result<ResultSet, String>>,
    end_failures: VecDeque<String>,
    end_calls: usize,
}

/// Shared script behind every link opened by a [`ScriptedConnector`].
///
/// Queries pop queued responses in order; with nothing queued a query succeeds with no row
/// sequence.
#[derive(Clone, Default)]
pub struct Script {
    state: Arc<Mutex<ScriptState>>,
}

impl Script {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_result(&self, result: ResultSet) -> &Self {
        self.state().responses.push_back(Ok(result));
        self
    }

    /// Queue a row-bearing result.
    pub fn push_rows(&self, columns: &[&str], rows: Vec<Vec<RowValues>>) -> &Self {
        let columns = columns.iter().map(ToString::to_string).collect();
        self.push_result(ResultSet::from_values(columns, rows))
    }

    /// Queue a failure for the next query.
    pub fn push_error(&self, message: impl Into<String>) -> &Self {
        self.state().responses.push_back(Err(message.into()));
        self
    }

    /// Make the next `end` fail with `message`.
    pub fn fail_next_end(&self, message: impl Into<String>) -> &Self {
        self.state().end_failures.push_back(message.into());
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    #[must_use]
    pub fn end_calls(&self) -> usize {
        self.state().end_calls
    }

    #[must_use]
    pub fn link(&self) -> ScriptedLink {
        ScriptedLink {
            script: self.clone(),
        }
    }
}

pub struct ScriptedLink {
    script: Script,
}

#[async_trait]
impl Link for ScriptedLink {
    async fn query(&self, sql: &str, values: Option<&[RowValues]>) -> Result<ResultSet, LinkError> {
        let mut state = self.script.state();
        state.calls.push(RecordedCall {
            sql: sql.to_string(),
            values: values.map(<[RowValues]>::to_vec),
        });
        match state.responses.pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(message.into()),
            None => Ok(ResultSet::default()),
        }
    }

    async fn end(&self) -> Result<(), LinkError> {
        let mut state = self.script.state();
        state.end_calls += 1;
        match state.end_failures.pop_front() {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }
}

/// [`Connector`] handing out [`ScriptedLink`]s over one shared [`Script`].
pub struct ScriptedConnector {
    script: Script,
    connect_error: Option<String>,
    attempts: AtomicUsize,
    policies: Mutex<Vec<DecodePolicy>>,
}

impl ScriptedConnector {
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self {
            script,
            connect_error: None,
            attempts: AtomicUsize::new(0),
            policies: Mutex::new(Vec::new()),
        }
    }

    /// A connector whose every connect attempt fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            connect_error: Some(message.into()),
            ..Self::new(Script::new())
        }
    }

    #[must_use]
    pub fn connect_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Decoding policies links were opened with, oldest first.
    #[must_use]
    pub fn policies(&self) -> Vec<DecodePolicy> {
        self.policies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(
        &self,
        _options: &ConnectionOptions,
        policy: DecodePolicy,
    ) -> Result<Box<dyn Link>, LinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.connect_error {
            return Err(message.clone().into());
        }
        self.policies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(policy);
        Ok(Box::new(self.script.link()))
    }
}
