//! Wire types for the text classification service
//!
//! Request `{ "text": ... }`, success
//! `{ "entities": [..], "relationships": [{ "source", "target", "type" }] }`,
//! failure `{ "error": ..., "details"?: ... }` with a non-2xx status.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use super::error::ClassifierError;

/// Text submitted for classification; never blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyRequest {
    text: String,
}

impl ClassifyRequest {
    /// Validate and wrap the text
    pub fn new(text: impl Into<String>) -> Result<Self, ClassifierError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ClassifierError::MissingText);
        }
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A relationship between two extracted entities, referenced by label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Relationship {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: kind.into(),
        }
    }
}

/// Filtered classification result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub entities: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Error payload returned with a non-2xx status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn string_field<'a>(object: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

/// Keep the well-formed parts of a success payload
///
/// Non-string entities are dropped, as are relationships that are not
/// objects or lack a string `source`, `target` or `type`. A payload without
/// an `entities` array is malformed; a missing `relationships` key is
/// treated as empty.
pub fn filter_payload(payload: &Value) -> Result<Classification, ClassifierError> {
    let object = payload
        .as_object()
        .ok_or_else(|| ClassifierError::malformed("response is not a JSON object"))?;

    let raw_entities = object
        .get("entities")
        .and_then(Value::as_array)
        .ok_or_else(|| ClassifierError::malformed("entities array missing"))?;
    let entities: Vec<String> = raw_entities
        .iter()
        .filter_map(|entity| entity.as_str().map(str::to_string))
        .collect();

    let raw_relationships = match object.get("relationships") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => return Err(ClassifierError::malformed("relationships is not an array")),
    };
    let relationships: Vec<Relationship> = raw_relationships
        .iter()
        .filter_map(|item| {
            let item = item.as_object()?;
            Some(Relationship::new(
                string_field(item, "source")?,
                string_field(item, "target")?,
                string_field(item, "type")?,
            ))
        })
        .collect();

    let dropped_entities = raw_entities.len() - entities.len();
    let dropped_relationships = raw_relationships.len() - relationships.len();
    if dropped_entities > 0 || dropped_relationships > 0 {
        debug!(dropped_entities, dropped_relationships, "Dropped malformed payload items");
    }

    Ok(Classification {
        entities,
        relationships,
    })
}

/// Interpret a raw service response
pub fn process_response(status: u16, body: &str) -> Result<Classification, ClassifierError> {
    trace!(status, body_len = body.len(), "Processing classifier response");

    if (200..300).contains(&status) {
        let payload: Value = serde_json::from_str(body)
            .map_err(|err| ClassifierError::malformed(format!("invalid JSON: {}", err)))?;
        return filter_payload(&payload);
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error_body) => Err(ClassifierError::upstream(
            status,
            error_body.error,
            error_body.details,
        )),
        Err(_) => {
            let trimmed = body.trim();
            Err(ClassifierError::upstream(
                status,
                format!("HTTP {}", status),
                (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ))
        }
    }
}
