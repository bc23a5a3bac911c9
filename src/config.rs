//! Engine configuration.
//!
//! Only document-handling details are configurable. The allowlist is not:
//! extending it is a code change in [`crate::allowlist`].

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

pub const DEFAULT_MUSICXML_DOCTYPE: &str = r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 1.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#;

pub const DEFAULT_XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prepended to `xml`/`musicxml` data that has no `<!DOCTYPE`.
    pub musicxml_doctype: String,
    /// Prepended to `xml`/`musicxml` data that has no `<?xml` declaration.
    pub xml_declaration: String,
    /// Upper bound on command descriptors executed per request.
    pub max_commands: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            musicxml_doctype: DEFAULT_MUSICXML_DOCTYPE.to_string(),
            xml_declaration: DEFAULT_XML_DECLARATION.to_string(),
            max_commands: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_commands(mut self, max: usize) -> Self {
        self.max_commands = Some(max);
        self
    }

    /// Add any missing doctype and declaration headers to an XML payload.
    pub fn complete_xml_headers(&self, data: &str) -> String {
        let mut text = data.to_string();
        if !text.contains("<!DOCTYPE") {
            text.insert_str(0, &self.musicxml_doctype);
        }
        if !text.contains("<?xml") {
            text.insert_str(0, &self.xml_declaration);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!(config.musicxml_doctype.starts_with("<!DOCTYPE score-partwise"));
        assert!(config.xml_declaration.starts_with("<?xml"));
        assert_eq!(config.max_commands, None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"max_commands": 16}"#).unwrap();
        assert_eq!(config.max_commands, Some(16));
        assert_eq!(config.xml_declaration, DEFAULT_XML_DECLARATION);
    }

    #[test]
    fn invalid_json_errors() {
        assert!(EngineConfig::from_json(r#"{"max_commands": "many"}"#).is_err());
    }

    #[test]
    fn headers_added_declaration_first() {
        let config = EngineConfig::default();
        let text = config.complete_xml_headers("<score-partwise/>");
        assert!(text.starts_with(DEFAULT_XML_DECLARATION));
        let doctype_at = text.find("<!DOCTYPE").unwrap();
        assert_eq!(doctype_at, DEFAULT_XML_DECLARATION.len());
        assert!(text.ends_with("<score-partwise/>"));
    }

    #[test]
    fn existing_headers_kept() {
        let config = EngineConfig::default();
        let full = format!("{DEFAULT_XML_DECLARATION}<!DOCTYPE x><score-partwise/>");
        assert_eq!(config.complete_xml_headers(&full), full);

        let only_doctype = "<!DOCTYPE x><score-partwise/>";
        let text = config.complete_xml_headers(only_doctype);
        assert_eq!(text, format!("{DEFAULT_XML_DECLARATION}{only_doctype}"));
    }
}
