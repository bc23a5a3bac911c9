//! # score-rpc
//!
//! Declarative request engine for a music-notation object library. A client
//! sends one JSON document describing input data, an ordered list of
//! operations, and the values it wants back; the engine executes it against
//! a fixed allowlist and answers with either every requested value or every
//! error it found.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use score_rpc::{MemoryLibrary, RequestEngine};
//!
//! let library = MemoryLibrary::new().with_work("bwv7.7", "G4 A4 B4/2\nG3/2 D3/2");
//! let engine = RequestEngine::new(Arc::new(library));
//!
//! let response = engine.process_json(r#"{
//!     "commandList": [
//!         {"function": "corpus.parse", "argList": ["'bwv7.7'"], "resultVariable": "sc"},
//!         {"attribute": "flat", "caller": "sc", "resultVariable": "scFlat"},
//!         {"attribute": "highestOffset", "caller": "scFlat", "resultVariable": "ho"}
//!     ],
//!     "returnDict": {"ho": "int"}
//! }"#);
//! assert_eq!(
//!     response,
//!     r#"{"status":"success","dataDict":{"ho":{"fmt":"int","data":"2.0"}},"errorList":[]}"#
//! );
//! ```
//!
//! ## Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`request`] | Request document model: data, command and return descriptors |
//! | [`engine`] | `RequestEngine` plus the resolver, dispatcher and serializer stages |
//! | [`allowlist`] | Closed sets of formats, callables and attributes |
//! | [`value`] | Runtime values bound by name during a request |
//! | [`library`] | Domain library traits and the in-memory score library |
//! | [`response`] | Response document: `{status, dataDict, errorList}` |
//! | [`config`] | `EngineConfig`: XML header synthesis and command limits |
//! | [`error`] | `RequestFault` taxonomy and crate-level `EngineError` |
//! | [`ordered`] | Insertion-ordered JSON object model |
//!
//! ## Safety Model
//!
//! No name in a request is ever evaluated. Format tags, function names and
//! attribute names are looked up in the [`allowlist`] and mapped to enum
//! handles; anything else is rejected before a binding is even consulted.
//! Literal arguments go through a fixed inference chain (binding, integer,
//! float, boolean, quoted string) instead of an expression evaluator.

pub mod allowlist;
pub mod config;
pub mod engine;
pub mod error;
pub mod library;
pub mod ordered;
pub mod request;
pub mod response;
pub mod value;

pub use allowlist::{Attribute, Callable, DataFormat};
pub use config::EngineConfig;
pub use engine::RequestEngine;
pub use error::{EngineError, EngineResult, FaultKind, RequestFault};
pub use library::{DomainLibrary, DomainObject, LibraryFault, MemoryLibrary};
pub use request::RequestDocument;
pub use response::{Response, Status};
pub use value::Value;
