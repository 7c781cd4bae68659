use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use lightsec_core::{CollaboratorError, Row, RowSource, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResultKey {
    query: String,
    params: Vec<Value>,
}

impl ResultKey {
    fn new(query: &str, params: &[Value]) -> Self {
        Self {
            query: query.to_string(),
            params: params.to_vec(),
        }
    }
}

/// In-memory row source answering exact (query text, parameters) matches.
///
/// Unregistered combinations return no rows. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRowSource {
    results: RwLock<HashMap<ResultKey, Vec<Row>>>,
    failures: RwLock<HashMap<String, String>>,
    executed: AtomicUsize,
}

impl InMemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rows returned for `query` with `params`, replacing any
    /// previous registration.
    pub fn insert(
        &self,
        query: &str,
        params: &[Value],
        rows: Vec<Row>,
    ) -> Result<(), CollaboratorError> {
        let mut results = self
            .results
            .write()
            .map_err(|_| CollaboratorError::row_source("lock poisoned"))?;
        results.insert(ResultKey::new(query, params), rows);
        Ok(())
    }

    /// Make every execution of `query` fail with `message`.
    pub fn fail_on(&self, query: &str, message: impl Into<String>) -> Result<(), CollaboratorError> {
        let mut failures = self
            .failures
            .write()
            .map_err(|_| CollaboratorError::row_source("lock poisoned"))?;
        failures.insert(query.to_string(), message.into());
        Ok(())
    }

    /// Number of queries executed so far, failed ones included.
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::Relaxed)
    }
}

impl RowSource for InMemoryRowSource {
    fn query(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, CollaboratorError> {
        self.executed.fetch_add(1, Ordering::Relaxed);

        let failures = self
            .failures
            .read()
            .map_err(|_| CollaboratorError::row_source("lock poisoned"))?;
        if let Some(message) = failures.get(query) {
            return Err(CollaboratorError::row_source(message.clone()));
        }

        let results = self
            .results
            .read()
            .map_err(|_| CollaboratorError::row_source("lock poisoned"))?;
        Ok(results
            .get(&ResultKey::new(query, params))
            .cloned()
            .unwrap_or_default())
    }
}
