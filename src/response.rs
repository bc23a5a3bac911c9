//! Response document.

use serde::{Deserialize, Serialize};

use crate::error::RequestFault;
use crate::ordered::OrderedMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

/// One serialized return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub fmt: String,
    pub data: String,
}

/// `{status, dataDict, errorList}`. Both collections are always present;
/// `dataDict` is empty on error and `errorList` is empty on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(rename = "dataDict")]
    pub data_dict: OrderedMap<OutputEntry>,
    #[serde(rename = "errorList")]
    pub error_list: Vec<String>,
}

impl Response {
    pub fn success(data_dict: OrderedMap<OutputEntry>) -> Self {
        Self {
            status: Status::Success,
            data_dict,
            error_list: Vec::new(),
        }
    }

    pub fn from_faults(faults: &[RequestFault]) -> Self {
        Self {
            status: Status::Error,
            data_dict: OrderedMap::new(),
            error_list: faults.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// The error list as plain text, one message per line.
    pub fn error_text(&self) -> String {
        self.error_list
            .iter()
            .map(|e| format!("{e}\n"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_shape() {
        let mut data = OrderedMap::new();
        data.insert(
            "x",
            OutputEntry {
                fmt: "int".into(),
                data: "5".into(),
            },
        );
        let json = serde_json::to_string(&Response::success(data)).unwrap();
        assert_eq!(
            json,
            r#"{"status":"success","dataDict":{"x":{"fmt":"int","data":"5"}},"errorList":[]}"#
        );
    }

    #[test]
    fn error_shape() {
        let response = Response::from_faults(&[RequestFault::UnknownFormat("Format midi not available".into())]);
        assert!(!response.is_success());
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"status":"error","dataDict":{},"errorList":["Format midi not available"]}"#
        );
    }

    #[test]
    fn error_text_one_per_line() {
        let response = Response::from_faults(&[
            RequestFault::MalformedData("a".into()),
            RequestFault::Invocation("b".into()),
        ]);
        assert_eq!(response.error_text(), "a\nb\n");
    }

    #[test]
    fn response_round_trips_through_json() {
        let json = r#"{"status":"error","dataDict":{},"errorList":["x not defined"]}"#;
        let response: Response = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, Status::Error);
        assert_eq!(serde_json::to_string(&response).unwrap(), json);
    }
}
