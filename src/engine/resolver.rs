//! Data Binding Resolver: turns `dataDict` entries into bindings, and the
//! literal inference chain shared with command arguments.

use serde_json::Value as Json;
use tracing::debug;

use crate::allowlist::DataFormat;
use crate::config::EngineConfig;
use crate::error::RequestFault;
use crate::library::DomainLibrary;
use crate::request::DataDescriptor;
use crate::value::Value;

use super::context::{BindingTable, RequestContext};

type Attempt = fn(&str, &BindingTable) -> Option<Value>;

/// Ordered attempts for untyped tokens; the first that succeeds wins.
const INFERENCE_CHAIN: [Attempt; 5] = [
    lookup_binding,
    |token, _| parse_int(token).map(Value::Int),
    |token, _| parse_float(token).map(Value::Float),
    |token, _| parse_bool_literal(token).map(Value::Bool),
    |token, _| unquote(token).map(Value::Str),
];

/// Resolve an untyped token: existing binding, int, float, `True`/`False`,
/// then quoted string.
pub fn infer_literal(token: &str, bindings: &BindingTable) -> Option<Value> {
    INFERENCE_CHAIN
        .iter()
        .find_map(|attempt| attempt(token, bindings))
}

/// Resolve a command argument. Strings go through [`infer_literal`]; JSON
/// numbers and booleans are taken as they are.
pub fn resolve_argument(token: &Json, bindings: &BindingTable) -> Option<Value> {
    match token {
        Json::String(s) => infer_literal(s, bindings),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float)),
        Json::Bool(b) => Some(Value::Bool(*b)),
        _ => None,
    }
}

fn lookup_binding(token: &str, bindings: &BindingTable) -> Option<Value> {
    bindings.get(token).cloned()
}

pub fn parse_int(token: &str) -> Option<i64> {
    token.trim().parse().ok()
}

pub fn parse_float(token: &str) -> Option<f64> {
    token.trim().parse().ok()
}

fn parse_bool_literal(token: &str) -> Option<bool> {
    match token {
        "True" => Some(true),
        "False" => Some(false),
        _ => None,
    }
}

/// Strip a quote pair: exactly two `'`, else exactly two `"`. Any other
/// shape (including an embedded apostrophe) is rejected.
pub fn unquote(token: &str) -> Option<String> {
    ['\'', '"']
        .into_iter()
        .find(|q| token.matches(*q).count() == 2)
        .map(|q| token.replace(q, ""))
}

/// Resolve every data entry, in order, into `ctx.bindings`.
pub fn resolve_data(
    entries: &[DataDescriptor],
    ctx: &mut RequestContext,
    library: &dyn DomainLibrary,
    config: &EngineConfig,
) {
    for entry in entries {
        match resolve_entry(entry, &ctx.bindings, library, config) {
            Ok(value) => {
                debug!(name = %entry.name, kind = value.type_name(), "bound data element");
                ctx.bindings.set(&entry.name, value);
            }
            Err(fault) => ctx.fail(fault),
        }
    }
}

fn resolve_entry(
    entry: &DataDescriptor,
    bindings: &BindingTable,
    library: &dyn DomainLibrary,
    config: &EngineConfig,
) -> Result<Value, RequestFault> {
    let source = &entry.source;
    let data = entry.data.as_deref().ok_or_else(|| {
        RequestFault::MalformedData(format!("no data specified for data element {source}"))
    })?;

    if bindings.contains(&entry.name) {
        return Err(RequestFault::MalformedData(format!(
            "duplicate definition for data named {} {source}",
            entry.name
        )));
    }

    let Some(tag) = entry.format.as_deref() else {
        return infer_literal(data, bindings).ok_or_else(|| {
            RequestFault::MalformedData(format!(
                "format could not be detected for data element {source}"
            ))
        });
    };

    let format = DataFormat::from_tag(tag).ok_or_else(|| {
        RequestFault::UnknownFormat(format!("invalid data format for data element {source}"))
    })?;

    match format {
        DataFormat::Str | DataFormat::String => unquote(data).map(Value::Str).ok_or_else(|| {
            RequestFault::MalformedData(format!(
                "invalid string (not in quotes...) for data element {source}"
            ))
        }),
        DataFormat::Int => parse_int(data).map(Value::Int).ok_or_else(|| {
            RequestFault::MalformedData(format!("invalid integer for data element {source}"))
        }),
        DataFormat::Bool | DataFormat::Boolean => match data {
            "true" | "True" => Ok(Value::Bool(true)),
            "false" | "False" => Ok(Value::Bool(false)),
            _ => Err(RequestFault::MalformedData(format!(
                "invalid boolean for data element {source}"
            ))),
        },
        document => {
            let text = if document.is_xml() {
                config.complete_xml_headers(data)
            } else {
                data.to_string()
            };
            library.parse_data(&text, document).map_err(|fault| {
                RequestFault::MalformedData(format!(
                    "could not parse {document} data for data element {source}: {fault}"
                ))
            })
        }
    }
}
