//! Domain library seam.
//!
//! The engine never implements score semantics itself. It parses documents,
//! invokes operations and reads attributes through the [`DomainLibrary`] and
//! [`DomainObject`] traits, and turns any [`LibraryFault`] into a recorded
//! request fault. [`MemoryLibrary`] is a small in-memory implementation for
//! tests and local use.

use std::any::Any;
use std::fmt;

use thiserror::Error;

use crate::allowlist::{Attribute, Callable, DataFormat};
use crate::value::Value;

/// A fault raised by the domain library. Never fatal to a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LibraryFault {
    pub message: String,
}

impl LibraryFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The host namespace a request can reach without a caller.
pub trait DomainLibrary: Send + Sync {
    /// Generic parse-from-string entry point. `format` is the declared tag
    /// and may be ignored by libraries that detect formats themselves.
    fn parse_data(&self, data: &str, format: DataFormat) -> Result<Value, LibraryFault>;

    /// Invoke an allowlisted operation as a free function.
    fn call_free(&self, callable: Callable, args: &[Value]) -> Result<Value, LibraryFault>;
}

/// An opaque object produced by the domain library.
pub trait DomainObject: fmt::Debug + Send + Sync {
    /// Short type name used in fault messages.
    fn type_name(&self) -> &str;

    fn call(&self, callable: Callable, args: &[Value]) -> Result<Value, LibraryFault>;

    fn attribute(&self, attribute: Attribute) -> Result<Value, LibraryFault>;

    fn musicxml(&self) -> Result<String, LibraryFault>;

    fn repr_text(&self) -> Result<String, LibraryFault>;

    /// Generic textual representation.
    fn text(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

mod memory;
pub mod notation;
pub mod stream;

pub use memory::MemoryLibrary;
pub use stream::{Note, Stream, StreamKind};
