//! In-memory domain library for testing and local use.

use std::collections::BTreeMap;

use crate::allowlist::{Callable, DataFormat};
use crate::value::Value;

use super::stream::{interval_arg, Stream};
use super::{DomainLibrary, DomainObject, LibraryFault};

/// Domain library backed by the compact notation parser and a named corpus.
///
/// The corpus is fixed when the library is built; the library is shared
/// read-only across requests.
///
/// Only compact notation can be imported. Any payload carrying an XML
/// declaration or doctype is rejected, and the engine always adds both to
/// `xml`/`musicxml` data, so those two import formats fail with this
/// library. Use a library with a MusicXML reader for them; `musicxml` stays
/// available as a return format.
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    corpus: BTreeMap<String, String>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a corpus work reachable through `corpus.parse`.
    pub fn with_work(mut self, name: impl Into<String>, notation: impl Into<String>) -> Self {
        self.corpus.insert(name.into(), notation.into());
        self
    }

    fn parse_notation(&self, data: &str) -> Result<Value, LibraryFault> {
        Stream::parse(data)
            .map(Value::object)
            .map_err(|e| LibraryFault::new(format!("cannot parse data: {e}")))
    }
}

impl DomainLibrary for MemoryLibrary {
    fn parse_data(&self, data: &str, format: DataFormat) -> Result<Value, LibraryFault> {
        if data.contains("<?xml") || data.contains("<!DOCTYPE") {
            return Err(LibraryFault::new(format!(
                "{format} documents are not supported by the in-memory library"
            )));
        }
        self.parse_notation(data)
    }

    fn call_free(&self, callable: Callable, args: &[Value]) -> Result<Value, LibraryFault> {
        match callable {
            Callable::CorpusParse => {
                let name = match args {
                    [Value::Str(name)] => name,
                    _ => {
                        return Err(LibraryFault::new(
                            "corpus.parse() takes exactly one work name",
                        ))
                    }
                };
                let notation = self.corpus.get(name).ok_or_else(|| {
                    LibraryFault::new(format!(
                        "Could not find a work that met this criterion: {name}"
                    ))
                })?;
                self.parse_notation(notation)
            }
            Callable::StreamTranspose => match args {
                [Value::Object(object), interval] => {
                    let stream = object.as_any().downcast_ref::<Stream>().ok_or_else(|| {
                        LibraryFault::new(format!(
                            "stream.transpose() requires a stream, not {}",
                            object.type_name()
                        ))
                    })?;
                    let transposed = stream
                        .transpose(interval_arg(interval)?)
                        .map_err(LibraryFault::new)?;
                    Ok(Value::object(transposed))
                }
                _ => Err(LibraryFault::new(
                    "stream.transpose() takes a stream and an interval",
                )),
            },
            Callable::Transpose | Callable::AugmentOrDiminish => Err(LibraryFault::new(format!(
                "name '{}' is not defined",
                callable.name()
            ))),
        }
    }
}
