use crate::logging_driver::DriverOp;
use std::sync::{Arc, Mutex};
use tabula_core::stmt::Value;

/// A wrapper around the operations log that provides a clean API for tests
#[derive(Clone)]
pub struct ExecLog {
    ops: Arc<Mutex<Vec<DriverOp>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<DriverOp>>>) -> Self {
        Self { ops }
    }

    /// Get the number of logged operations
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Check if any operation matches the given predicate
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&DriverOp) -> bool,
    {
        self.ops.lock().unwrap().iter().any(predicate)
    }

    /// Count operations matching the given predicate
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&DriverOp) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(op))
            .count()
    }

    /// Count executions whose SQL starts with `prefix`
    pub fn count_sql(&self, prefix: &str) -> usize {
        self.count(|op| op.sql().is_some_and(|sql| sql.starts_with(prefix)))
    }

    /// Every execution, as `(sql, binds)` pairs in order
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter_map(|op| match op {
                DriverOp::Execute { sql, binds } => Some((sql.clone(), binds.clone())),
                _ => None,
            })
            .collect()
    }

    /// SQL text of every execution, in order
    pub fn statements(&self) -> Vec<String> {
        self.executed().into_iter().map(|(sql, _)| sql).collect()
    }

    /// The most recent execution
    pub fn last_executed(&self) -> Option<(String, Vec<Value>)> {
        self.executed().pop()
    }

    /// Clear the log
    pub fn clear(&mut self) {
        self.ops.lock().unwrap().clear();
    }

    /// Remove and return the first operation from the log
    /// Returns None if the log is empty
    pub fn pop(&mut self) -> Option<DriverOp> {
        let mut ops = self.ops.lock().unwrap();
        if ops.is_empty() {
            None
        } else {
            Some(ops.remove(0))
        }
    }
}
