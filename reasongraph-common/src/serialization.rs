use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// On-disk serialization format for project files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON format (human-readable, compatible with the web backend).
    #[default]
    Json,

    /// CBOR format (compact binary).
    Cbor,
}

impl Format {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Cbor => "application/cbor",
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Cbor => "cbor",
        }
    }
}

/// Encode a value to bytes using the specified format.
///
/// JSON output is pretty-printed so project files stay diffable.
pub fn encode<T: Serialize>(value: &T, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Json => serde_json::to_vec_pretty(value).map_err(Error::from),
        Format::Cbor => {
            let mut buf = Vec::new();
            ciborium::into_writer(value, &mut buf)?;
            Ok(buf)
        }
    }
}

/// Decode bytes to a value using the specified format.
pub fn decode<T: DeserializeOwned>(data: &[u8], format: Format) -> Result<T> {
    match format {
        Format::Json => serde_json::from_slice(data).map_err(Error::from),
        Format::Cbor => ciborium::from_reader(data).map_err(|e| Error::Cbor(e.to_string())),
    }
}

/// Try to auto-detect the format from the data.
///
/// Returns `Json` if the first non-whitespace byte is `{` or `[`, otherwise `Cbor`.
pub fn detect_format(data: &[u8]) -> Format {
    match data.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') | Some(b'[') => Format::Json,
        _ => Format::Cbor,
    }
}

/// Decode bytes, auto-detecting the format.
pub fn decode_auto<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    let format = detect_format(data);
    decode(data, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeType, ReasoningNode, ReasoningProject, WorldPoint};

    fn sample_project() -> ReasoningProject {
        let mut project = ReasoningProject::new("Why is the build slow?", None);
        project.nodes.push(
            ReasoningNode::new(NodeType::Question, WorldPoint::new(100.0, 80.0))
                .with_content("Why is the build slow?"),
        );
        project
    }

    #[test]
    fn test_cbor_is_smaller() {
        let project = sample_project();

        let json = encode(&project, Format::Json).unwrap();
        let cbor = encode(&project, Format::Cbor).unwrap();

        assert!(cbor.len() < json.len(), "CBOR should be smaller than JSON");
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(detect_format(b"{\"key\": \"value\"}"), Format::Json);
        assert_eq!(detect_format(b"\n  [1, 2, 3]"), Format::Json);
        assert_eq!(detect_format(b"\xa1\x63key\x65value"), Format::Cbor);
    }

    #[test]
    fn test_auto_decode() {
        let project = sample_project();

        let json = encode(&project, Format::Json).unwrap();
        let decoded: ReasoningProject = decode_auto(&json).unwrap();
        assert_eq!(decoded, project);

        let cbor = encode(&project, Format::Cbor).unwrap();
        let decoded: ReasoningProject = decode_auto(&cbor).unwrap();
        assert_eq!(decoded.nodes[0].content, "Why is the build slow?");
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result: Result<ReasoningProject> = decode(b"{not json", Format::Json);
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
