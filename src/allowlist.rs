//! Allowlist Registry: the closed sets of names a request may use.
//!
//! Every format tag, callable and attribute a request names is looked up
//! here and mapped to an enum handle. Anything not listed has no handle and
//! therefore cannot be dispatched. The sets are fixed at build time.

use serde::{Deserialize, Serialize};

/// A data format tag accepted in `dataDict` and `returnDict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    Xml,
    MusicXml,
    Abc,
    Str,
    String,
    Bool,
    Boolean,
    Int,
    ReprText,
}

impl DataFormat {
    pub const ALL: [DataFormat; 9] = [
        DataFormat::Xml,
        DataFormat::MusicXml,
        DataFormat::Abc,
        DataFormat::Str,
        DataFormat::String,
        DataFormat::Bool,
        DataFormat::Boolean,
        DataFormat::Int,
        DataFormat::ReprText,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            DataFormat::Xml => "xml",
            DataFormat::MusicXml => "musicxml",
            DataFormat::Abc => "abc",
            DataFormat::Str => "str",
            DataFormat::String => "string",
            DataFormat::Bool => "bool",
            DataFormat::Boolean => "boolean",
            DataFormat::Int => "int",
            DataFormat::ReprText => "reprtext",
        }
    }

    pub fn is_xml(self) -> bool {
        matches!(self, DataFormat::Xml | DataFormat::MusicXml)
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// An operation a command may invoke, either on a caller or as a free
/// operation of the domain library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Callable {
    StreamTranspose,
    CorpusParse,
    Transpose,
    AugmentOrDiminish,
}

impl Callable {
    pub const ALL: [Callable; 4] = [
        Callable::StreamTranspose,
        Callable::CorpusParse,
        Callable::Transpose,
        Callable::AugmentOrDiminish,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Callable::StreamTranspose => "stream.transpose",
            Callable::CorpusParse => "corpus.parse",
            Callable::Transpose => "transpose",
            Callable::AugmentOrDiminish => "augmentOrDiminish",
        }
    }
}

impl std::fmt::Display for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A read-only attribute a command may read off a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    HighestOffset,
    Flat,
}

impl Attribute {
    pub const ALL: [Attribute; 2] = [Attribute::HighestOffset, Attribute::Flat];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Attribute::HighestOffset => "highestOffset",
            Attribute::Flat => "flat",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
