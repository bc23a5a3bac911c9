//! Per-request state: the binding table and the error list.

use std::collections::HashMap;

use tracing::warn;

use crate::error::RequestFault;
use crate::value::Value;

/// Named values visible to the rest of the request.
#[derive(Debug, Default)]
pub struct BindingTable {
    values: HashMap<String, Value>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Bind `name`, replacing any earlier binding. Returns the replaced value.
    pub fn set(&mut self, name: &str, value: Value) -> Option<Value> {
        self.values.insert(name.to_string(), value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Append-only fault log for one request.
#[derive(Debug, Default)]
pub struct ErrorList {
    faults: Vec<RequestFault>,
}

impl ErrorList {
    pub fn push(&mut self, fault: RequestFault) {
        warn!(kind = %fault.kind(), "{fault}");
        self.faults.push(fault);
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn faults(&self) -> &[RequestFault] {
        &self.faults
    }
}

/// State threaded through resolver, dispatcher and serializer. Created per
/// request and dropped when the response is built.
#[derive(Debug, Default)]
pub struct RequestContext {
    pub bindings: BindingTable,
    pub errors: ErrorList,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, fault: RequestFault) {
        self.errors.push(fault);
    }
}
