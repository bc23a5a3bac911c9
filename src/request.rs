//! Request document model.
//!
//! ```json
//! {
//!   "dataDict":    { "myNum": { "fmt": "int", "data": "23" } },
//!   "commandList": [
//!     { "function": "corpus.parse", "argList": ["'bwv7.7'"], "resultVariable": "sc" },
//!     { "function": "transpose", "caller": "sc", "argList": ["'p5'"], "resultVariable": "sc" },
//!     { "attribute": "flat", "caller": "sc", "resultVariable": "scFlat" },
//!     { "attribute": "highestOffset", "caller": "scFlat", "resultVariable": "ho" }
//!   ],
//!   "returnDict":  { "myNum": "int", "ho": "int" }
//! }
//! ```
//!
//! Descriptors keep their raw JSON so fault messages can quote them.

use serde::Deserialize;
use serde_json::Value as Json;

use crate::error::{EngineResult, RequestFault};
use crate::ordered::OrderedMap;

/// One `dataDict` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DataDescriptor {
    pub name: String,
    pub format: Option<String>,
    pub data: Option<String>,
    pub source: Json,
}

impl DataDescriptor {
    fn from_entry(name: String, source: Json) -> Self {
        Self {
            format: source.get("fmt").and_then(scalar_text),
            data: source.get("data").and_then(scalar_text),
            name,
            source,
        }
    }
}

/// One `commandList` entry, as written. Use [`classify`](Self::classify) to
/// get the function-call or attribute-read view.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDescriptor {
    pub function: Option<String>,
    pub attribute: Option<String>,
    pub caller: Option<String>,
    pub args: Option<Json>,
    pub result_var: Option<String>,
    pub source: Json,
}

/// A command descriptor with exactly one of function/attribute set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command<'a> {
    FunctionCall {
        name: &'a str,
        args: Option<&'a Json>,
        caller: Option<&'a str>,
        result_var: Option<&'a str>,
    },
    AttributeRead {
        name: &'a str,
        args: Option<&'a Json>,
        caller: Option<&'a str>,
        result_var: Option<&'a str>,
    },
}

impl CommandDescriptor {
    fn from_json(source: Json) -> Self {
        let text = |key: &str| source.get(key).and_then(scalar_text);
        Self {
            function: text("function"),
            attribute: text("attribute"),
            caller: text("caller"),
            args: source.get("argList").filter(|v| !v.is_null()).cloned(),
            result_var: text("resultVariable").or_else(|| text("resultVar")),
            source,
        }
    }

    pub fn classify(&self) -> Result<Command<'_>, RequestFault> {
        let caller = self.caller.as_deref();
        let result_var = self.result_var.as_deref();
        let args = self.args.as_ref();
        match (&self.function, &self.attribute) {
            (Some(_), Some(_)) => Err(RequestFault::BothOrNeither(format!(
                "cannot specify both function and attribute for: {}",
                self.source
            ))),
            (None, None) => Err(RequestFault::BothOrNeither(format!(
                "must specify function or attribute for: {}",
                self.source
            ))),
            (Some(name), None) => Ok(Command::FunctionCall {
                name,
                args,
                caller,
                result_var,
            }),
            (None, Some(name)) => Ok(Command::AttributeRead {
                name,
                args,
                caller,
                result_var,
            }),
        }
    }
}

/// One `returnDict` entry. `format` is `None` when missing or not a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnDescriptor {
    pub name: String,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDocument {
    pub data: Vec<DataDescriptor>,
    pub commands: Vec<CommandDescriptor>,
    pub returns: Vec<ReturnDescriptor>,
}

#[derive(Deserialize)]
struct RawRequest {
    #[serde(rename = "dataDict", default)]
    data_dict: OrderedMap<Json>,
    #[serde(rename = "commandList", default)]
    command_list: Vec<Json>,
    #[serde(rename = "returnDict", default)]
    return_dict: OrderedMap<Json>,
}

impl RequestDocument {
    pub fn from_json(body: &str) -> EngineResult<Self> {
        let raw: RawRequest = serde_json::from_str(body)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawRequest) -> Self {
        Self {
            data: raw
                .data_dict
                .into_entries()
                .into_iter()
                .map(|(name, source)| DataDescriptor::from_entry(name, source))
                .collect(),
            commands: raw
                .command_list
                .into_iter()
                .map(CommandDescriptor::from_json)
                .collect(),
            returns: raw
                .return_dict
                .into_entries()
                .into_iter()
                .map(|(name, fmt)| ReturnDescriptor {
                    name,
                    format: fmt.as_str().map(str::to_string),
                })
                .collect(),
        }
    }
}

/// Text of a scalar JSON value; `null` counts as absent.
fn scalar_text(value: &Json) -> Option<String> {
    match value {
        Json::Null => None,
        Json::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_full_document() {
        let body = json!({
            "dataDict": {"myNum": {"fmt": "int", "data": "23"}},
            "commandList": [
                {"function": "corpus.parse", "argList": ["'bwv7.7'"], "resultVariable": "sc"},
                {"attribute": "flat", "caller": "sc", "resultVariable": "scFlat"}
            ],
            "returnDict": {"myNum": "int"}
        })
        .to_string();
        let doc = RequestDocument::from_json(&body).unwrap();
        assert_eq!(doc.data.len(), 1);
        assert_eq!(doc.data[0].format.as_deref(), Some("int"));
        assert_eq!(doc.data[0].data.as_deref(), Some("23"));
        assert_eq!(doc.commands.len(), 2);
        assert_eq!(doc.commands[0].result_var.as_deref(), Some("sc"));
        assert_eq!(doc.returns[0].format.as_deref(), Some("int"));
    }

    #[test]
    fn all_sections_optional() {
        let doc = RequestDocument::from_json("{}").unwrap();
        assert_eq!(doc, RequestDocument::default());
    }

    #[test]
    fn malformed_documents_error() {
        assert!(RequestDocument::from_json("not json").is_err());
        assert!(RequestDocument::from_json(r#"{"commandList": {}}"#).is_err());
        assert!(RequestDocument::from_json(r#"{"dataDict": []}"#).is_err());
    }

    #[test]
    fn data_entries_keep_order_and_duplicates() {
        let body = r#"{"dataDict": {"b": {"data": "1"}, "a": {"data": "2"}, "b": {"data": "3"}}}"#;
        let doc = RequestDocument::from_json(body).unwrap();
        let names: Vec<&str> = doc.data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
    }

    #[test]
    fn scalar_data_is_taken_as_text() {
        let body = r#"{"dataDict": {"n": {"fmt": "int", "data": 7}, "m": {"fmt": "int", "data": null}}}"#;
        let doc = RequestDocument::from_json(body).unwrap();
        assert_eq!(doc.data[0].data.as_deref(), Some("7"));
        assert_eq!(doc.data[1].data, None);
    }

    #[test]
    fn result_var_alias() {
        let body = r#"{"commandList": [{"function": "transpose", "resultVar": "t"}]}"#;
        let doc = RequestDocument::from_json(body).unwrap();
        assert_eq!(doc.commands[0].result_var.as_deref(), Some("t"));
    }

    #[test]
    fn non_string_return_format_is_missing() {
        let body = r#"{"returnDict": {"x": null, "y": 3, "z": "str"}}"#;
        let doc = RequestDocument::from_json(body).unwrap();
        assert_eq!(doc.returns[0].format, None);
        assert_eq!(doc.returns[1].format, None);
        assert_eq!(doc.returns[2].format.as_deref(), Some("str"));
    }

    // ─── Classification ─────────────────────────────────────────────────

    fn command(source: Json) -> CommandDescriptor {
        CommandDescriptor::from_json(source)
    }

    #[test]
    fn classify_function_call() {
        let cmd = command(json!({"function": "transpose", "caller": "sc", "argList": ["'p5'"]}));
        assert!(matches!(
            cmd.classify(),
            Ok(Command::FunctionCall { name: "transpose", caller: Some("sc"), args: Some(_), result_var: None })
        ));
    }

    #[test]
    fn classify_attribute_read() {
        let cmd = command(json!({"attribute": "flat", "caller": "sc", "resultVariable": "f"}));
        assert!(matches!(
            cmd.classify(),
            Ok(Command::AttributeRead { name: "flat", caller: Some("sc"), args: None, result_var: Some("f") })
        ));
    }

    #[test]
    fn classify_both_or_neither() {
        let both = command(json!({"function": "transpose", "attribute": "flat"}));
        let err = both.classify().unwrap_err();
        assert!(err.to_string().starts_with("cannot specify both"));

        let neither = command(json!({"caller": "sc"}));
        let err = neither.classify().unwrap_err();
        assert!(err.to_string().starts_with("must specify function or attribute"));
    }
}
