//! Request-shape validation.
//!
//! # Responsibilities
//! - Define the `Schema` trait request sections are parsed with
//! - Collect field issues into a structured `ValidationErrors`
//! - Provide the `Validated` extractor that checks params, body and query
//!
//! # Design Decisions
//! - Sections are checked in a fixed order: params, then body, then query
//! - The first failing section aborts; later sections are never inspected
//! - `serde_json::Value` is the pass-through schema (section left unchanged)
//! - Within one section every issue is reported, not just the first
//! - Only `application/json` bodies are decoded; any other body reads as `{}`
//! - An explicit `null` is a type error, never the same as an absent field

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::{header, request::Parts, StatusCode},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::http::error::ApiError;

/// The part of a request a schema applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Params,
    Body,
    Query,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Params => "params",
            Section::Body => "body",
            Section::Query => "query",
        };
        f.write_str(name)
    }
}

/// One constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub section: Section,
    /// Offending field, empty when the section itself has the wrong shape.
    pub field: String,
    pub message: String,
}

/// All issues found in the first failing section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    issues: Vec<FieldIssue>,
}

impl ValidationErrors {
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Whether any issue names `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    fn shape(section: Section, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue {
                section,
                field: String::new(),
                message: message.into(),
            }],
        }
    }
}

impl fmt::Display for ValidationErrors {
    /// JSON text of the issue list, so the detail survives in a plain message.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.issues) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{} validation issue(s)", self.issues.len()),
        }
    }
}

impl std::error::Error for ValidationErrors {}

/// A statically declared shape for one request section.
pub trait Schema: Sized {
    /// Parse and coerce the raw section, or report why it does not conform.
    fn parse(section: Section, raw: Value) -> Result<Self, ValidationErrors>;
}

/// No schema configured: the section flows through untouched.
impl Schema for Value {
    fn parse(_section: Section, raw: Value) -> Result<Self, ValidationErrors> {
        Ok(raw)
    }
}

/// Field-by-field reader over a JSON object, accumulating issues.
pub struct ObjectReader {
    section: Section,
    fields: Map<String, Value>,
    issues: Vec<FieldIssue>,
}

impl ObjectReader {
    /// Start reading a section. Fails immediately if it is not an object.
    pub fn new(section: Section, raw: Value) -> Result<Self, ValidationErrors> {
        match raw {
            Value::Object(fields) => Ok(Self {
                section,
                fields,
                issues: Vec::new(),
            }),
            other => Err(ValidationErrors::shape(
                section,
                format!("Expected object, received {}", json_type(&other)),
            )),
        }
    }

    fn issue(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            section: self.section,
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn take(&mut self, field: &str, required: bool) -> Option<Value> {
        match self.fields.remove(field) {
            None => {
                if required {
                    self.issue(field, "Required");
                }
                None
            }
            Some(value) => Some(value),
        }
    }

    fn string(&mut self, field: &str, min_len: usize, required: bool) -> Option<String> {
        match self.take(field, required)? {
            Value::String(s) if s.chars().count() >= min_len => Some(s),
            Value::String(_) => {
                self.issue(
                    field,
                    format!("String must contain at least {min_len} character(s)"),
                );
                None
            }
            other => {
                self.issue(field, format!("Expected string, received {}", json_type(&other)));
                None
            }
        }
    }

    fn number(&mut self, field: &str, required: bool) -> Option<f64> {
        match self.take(field, required)? {
            Value::Number(n) => match n.as_f64() {
                Some(n) => Some(n),
                None => {
                    self.issue(field, "Expected finite number");
                    None
                }
            },
            other => {
                self.issue(field, format!("Expected number, received {}", json_type(&other)));
                None
            }
        }
    }

    fn one_of<T: FromStr>(&mut self, field: &str, allowed: &[&str], required: bool) -> Option<T> {
        match self.take(field, required)? {
            Value::String(s) => match s.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    self.issue(
                        field,
                        format!(
                            "Invalid enum value. Expected {}, received '{s}'",
                            allowed
                                .iter()
                                .map(|a| format!("'{a}'"))
                                .collect::<Vec<_>>()
                                .join(" | ")
                        ),
                    );
                    None
                }
            },
            other => {
                self.issue(field, format!("Expected string, received {}", json_type(&other)));
                None
            }
        }
    }

    /// Required string with a minimum length in characters.
    pub fn required_string(&mut self, field: &str, min_len: usize) -> Option<String> {
        self.string(field, min_len, true)
    }

    /// Optional string; if present it must satisfy the minimum length.
    pub fn optional_string(&mut self, field: &str, min_len: usize) -> Option<String> {
        self.string(field, min_len, false)
    }

    /// Required JSON number.
    pub fn required_number(&mut self, field: &str) -> Option<f64> {
        self.number(field, true)
    }

    /// Optional JSON number.
    pub fn optional_number(&mut self, field: &str) -> Option<f64> {
        self.number(field, false)
    }

    /// Required string that must be one of `allowed`.
    pub fn required_one_of<T: FromStr>(&mut self, field: &str, allowed: &[&str]) -> Option<T> {
        self.one_of(field, allowed, true)
    }

    /// Optional string that must be one of `allowed` when present.
    pub fn optional_one_of<T: FromStr>(&mut self, field: &str, allowed: &[&str]) -> Option<T> {
        self.one_of(field, allowed, false)
    }

    /// String field that is coerced into a number, as query strings carry text.
    pub fn coerced_u64(&mut self, field: &str, default: u64) -> u64 {
        match self.take(field, false) {
            None => default,
            Some(Value::Number(n)) => match n.as_u64() {
                Some(n) => n,
                None => {
                    self.issue(field, format!("Expected non-negative integer, received {n}"));
                    default
                }
            },
            Some(Value::String(s)) => match s.trim().parse() {
                Ok(n) => n,
                Err(_) => {
                    self.issue(field, format!("Expected non-negative integer, received '{s}'"));
                    default
                }
            },
            Some(other) => {
                self.issue(field, format!("Expected number, received {}", json_type(&other)));
                default
            }
        }
    }

    /// Build the parsed value if no issue was recorded.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.issues.is_empty() {
            return Err(ValidationErrors { issues: self.issues });
        }
        build().ok_or_else(|| ValidationErrors::shape(self.section, "Incomplete value"))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Run the three section schemas in order, stopping at the first failure.
pub fn validate_sections<P, B, Q>(
    params: Value,
    body: Value,
    query: Value,
) -> Result<Validated<P, B, Q>, ValidationErrors>
where
    P: Schema,
    B: Schema,
    Q: Schema,
{
    let params = P::parse(Section::Params, params)?;
    let body = B::parse(Section::Body, body)?;
    let query = Q::parse(Section::Query, query)?;
    Ok(Validated {
        params,
        body,
        query,
    })
}

/// Extractor yielding request sections already checked against their schemas.
///
/// Sections without a schema default to `serde_json::Value`.
#[derive(Debug)]
pub struct Validated<P = Value, B = Value, Q = Value> {
    pub params: P,
    pub body: B,
    pub query: Q,
}

fn string_map(map: HashMap<String, String>) -> Value {
    Value::Object(map.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
}

fn is_json(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

impl<S, P, B, Q> FromRequest<S> for Validated<P, B, Q>
where
    S: Send + Sync,
    P: Schema + Send,
    B: Schema + Send,
    Q: Schema + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let params = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, state).await {
            Ok(Path(map)) => map,
            Err(PathRejection::MissingPathParams(_)) => HashMap::new(),
            Err(e) => return Err(ApiError::MalformedRequest(e.body_text())),
        };
        let query = Query::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Query(map)| map)
            .map_err(|e| ApiError::MalformedRequest(e.body_text()))?;

        let body = if is_json(&parts) {
            let req = Request::from_parts(parts, body);
            let bytes = Bytes::from_request(req, state).await.map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ApiError::PayloadTooLarge(e.body_text())
                } else {
                    ApiError::MalformedRequest(e.body_text())
                }
            })?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                Value::Object(Map::new())
            } else {
                serde_json::from_slice(&bytes)
                    .map_err(|e| ApiError::MalformedRequest(format!("Malformed JSON body: {e}")))?
            }
        } else {
            Value::Object(Map::new())
        };

        validate_sections(string_map(params), body, string_map(query)).map_err(ApiError::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Paging {
        limit: u64,
    }

    impl Schema for Paging {
        fn parse(section: Section, raw: Value) -> Result<Self, ValidationErrors> {
            let mut reader = ObjectReader::new(section, raw)?;
            let limit = reader.coerced_u64("limit", 10);
            reader.finish(|| Some(Paging { limit }))
        }
    }

    #[derive(Debug)]
    struct Named {
        name: String,
    }

    impl Schema for Named {
        fn parse(section: Section, raw: Value) -> Result<Self, ValidationErrors> {
            let mut reader = ObjectReader::new(section, raw)?;
            let name = reader.required_string("name", 1);
            reader.finish(|| Some(Named { name: name? }))
        }
    }

    #[test]
    fn test_unconfigured_sections_pass_through() {
        let v: Validated = validate_sections(json!({"id": "x"}), json!([1, 2]), json!({})).unwrap();
        assert_eq!(v.params, json!({"id": "x"}));
        assert_eq!(v.body, json!([1, 2]));
    }

    #[test]
    fn test_query_coercion_replaces_section() {
        let v: Validated<Value, Value, Paging> =
            validate_sections(json!({}), json!({}), json!({"limit": "25"})).unwrap();
        assert_eq!(v.query.limit, 25);

        let v: Validated<Value, Value, Paging> = validate_sections(json!({}), json!({}), json!({})).unwrap();
        assert_eq!(v.query.limit, 10);
    }

    #[test]
    fn test_first_failing_section_wins() {
        let err = validate_sections::<Named, Named, Paging>(
            json!({"name": ""}),
            json!({}),
            json!({"limit": "abc"}),
        )
        .unwrap_err();

        assert!(err.issues().iter().all(|i| i.section == Section::Params));
        assert!(err.has_field("name"));
    }

    #[test]
    fn test_later_sections_checked_after_success() {
        let err = validate_sections::<Named, Value, Paging>(
            json!({"name": "ok"}),
            json!({}),
            json!({"limit": "-1"}),
        )
        .unwrap_err();
        assert_eq!(err.issues()[0].section, Section::Query);
    }

    #[test]
    fn test_null_is_not_absent() {
        let err = Paging::parse(Section::Query, json!({"limit": null})).unwrap_err();
        assert_eq!(err.issues()[0].message, "Expected number, received null");

        let err = Named::parse(Section::Body, json!({"name": null})).unwrap_err();
        assert_eq!(err.issues()[0].message, "Expected string, received null");
    }

    #[test]
    fn test_non_object_section() {
        let err = Named::parse(Section::Body, json!("text")).unwrap_err();
        assert_eq!(err.issues()[0].field, "");
        assert_eq!(err.issues()[0].message, "Expected object, received string");
    }

    #[test]
    fn test_display_is_issue_json() {
        let err = Named::parse(Section::Body, json!({})).unwrap_err();
        let parsed: Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(
            parsed,
            json!([{"section": "body", "field": "name", "message": "Required"}])
        );
    }
}
