//! Gift request parsing and validation.
//!
//! Inbound payloads are validated against `schema/gift_request.schema.json`
//! before deserialization.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Embedded request schema (loaded at compile time).
const REQUEST_SCHEMA_JSON: &str = include_str!("../schema/gift_request.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Message returned to callers for a missing occasion or interests.
pub const MISSING_INPUT_MESSAGE: &str = "Occasion and interests are required";

/// Errors from request parsing and validation.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Occasion and interests are required")]
    MissingInput,

    #[error("Invalid request: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to load schema: {0}")]
    SchemaLoad(String),
}

/// A request for gift ideas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GiftRequest {
    /// The occasion ("Birthday", "Anniversary", ...)
    pub occasion: String,

    /// The recipient's interests, in the order given
    pub interests: Vec<String>,
}

impl GiftRequest {
    /// Create a request. Call [`GiftRequest::validate`] before use.
    pub fn new<I, S>(occasion: impl Into<String>, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            occasion: occasion.into(),
            interests: interests.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse and validate a request from a JSON payload.
    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        validate_request_schema(&value)?;
        let request: GiftRequest = serde_json::from_value(value)?;
        request.validate()?;
        Ok(request)
    }

    /// Check that the occasion and at least one interest are present.
    pub fn validate(&self) -> Result<(), RequestError> {
        let has_interest = self.interests.iter().any(|i| !i.trim().is_empty());
        if self.occasion.trim().is_empty() || !has_interest {
            return Err(RequestError::MissingInput);
        }
        Ok(())
    }

    /// Interests with blank entries removed and whitespace trimmed.
    pub fn clean_interests(&self) -> Vec<String> {
        self.interests
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn get_validator() -> Result<&'static jsonschema::Validator, RequestError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(REQUEST_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;
        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result
        .as_ref()
        .map_err(|e| RequestError::SchemaLoad(e.clone()))
}

/// Validate a request payload against the schema.
pub fn validate_request_schema(value: &serde_json::Value) -> Result<(), RequestError> {
    let validator = get_validator()?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(errors = ?errors, "Request failed schema validation");
        Err(RequestError::SchemaViolation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_request() {
        let request =
            GiftRequest::from_json(r#"{"occasion":"Birthday","interests":["Sports","Cooking"]}"#)
                .unwrap();
        assert_eq!(request.occasion, "Birthday");
        assert_eq!(request.interests, vec!["Sports", "Cooking"]);
    }

    #[test]
    fn test_missing_interests_fails_schema() {
        let result = GiftRequest::from_json(r#"{"occasion":"Birthday"}"#);
        assert!(matches!(result, Err(RequestError::SchemaViolation(_))));
    }

    #[test]
    fn test_empty_interests_fails_schema() {
        let result = GiftRequest::from_json(r#"{"occasion":"Birthday","interests":[]}"#);
        assert!(matches!(result, Err(RequestError::SchemaViolation(_))));
    }

    #[test]
    fn test_blank_occasion_fails() {
        let result = GiftRequest::from_json(r#"{"occasion":"   ","interests":["Art"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_interests_fail_validation() {
        let result = GiftRequest::from_json(r#"{"occasion":"Birthday","interests":["  "]}"#);
        assert!(matches!(result, Err(RequestError::MissingInput)));
    }

    #[test]
    fn test_malformed_json() {
        let result = GiftRequest::from_json("{occasion");
        assert!(matches!(result, Err(RequestError::JsonError(_))));
    }

    #[test]
    fn test_validate_constructed_request() {
        assert!(GiftRequest::new("Birthday", ["Art"]).validate().is_ok());
        assert!(GiftRequest::new("", ["Art"]).validate().is_err());
        assert!(GiftRequest::new("Birthday", Vec::<String>::new()).validate().is_err());
    }

    #[test]
    fn test_missing_input_message() {
        let err = GiftRequest::new("Birthday", Vec::<String>::new())
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), MISSING_INPUT_MESSAGE);
    }

    #[test]
    fn test_clean_interests() {
        let request = GiftRequest::new("Birthday", [" Art ", "", "Music"]);
        assert_eq!(request.clean_interests(), vec!["Art", "Music"]);
    }
}
