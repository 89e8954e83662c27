//! Typed postback requests and normalized responses

use std::fmt;
use std::time::Duration;

use tracker_core::{AttributionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Value of a single request parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Bool(bool),
    Float(f64),
}

impl ParamValue {
    fn check(&self, name: &str) -> Result<()> {
        match self {
            ParamValue::Float(v) if !v.is_finite() => Err(AttributionError::InvalidParameters(
                format!("parameter `{}` is not a finite number", name),
            )),
            _ => Ok(()),
        }
    }

    /// Text form used in query strings
    pub fn to_query_string(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(v) => v.to_string(),
            ParamValue::UInt(v) => v.to_string(),
            ParamValue::Bool(v) => v.to_string(),
            ParamValue::Float(v) => v.to_string(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Str(s) => serde_json::Value::from(s.as_str()),
            ParamValue::Int(v) => serde_json::Value::from(*v),
            ParamValue::UInt(v) => serde_json::Value::from(*v),
            ParamValue::Bool(v) => serde_json::Value::from(*v),
            ParamValue::Float(v) => serde_json::Value::from(*v),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        ParamValue::UInt(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

/// Outbound postback request.
///
/// Parameters keep insertion order so query strings are reproducible.
#[derive(Debug, Clone)]
pub struct AttributionRequest {
    url: String,
    method: Method,
    params: Vec<(String, ParamValue)>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl AttributionRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            params: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Override one of the transport's default headers or add a new one
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout
    }

    /// First value of the named parameter
    pub fn param_value(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Reject parameters that cannot be serialized faithfully
    pub fn validate_params(&self) -> Result<()> {
        for (name, value) in &self.params {
            if name.is_empty() {
                return Err(AttributionError::InvalidParameters(
                    "parameter name must not be empty".to_string(),
                ));
            }
            value.check(name)?;
        }
        Ok(())
    }

    /// JSON object body for POST requests
    pub fn json_body(&self) -> Result<Vec<u8>> {
        self.validate_params()?;
        let map: serde_json::Map<String, serde_json::Value> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Ok(serde_json::to_vec(&map)?)
    }
}

/// Result of a single transport attempt.
///
/// An error takes precedence over a body. A response carrying neither is a
/// success with an empty payload; several postback endpoints reply with an
/// empty 200.
#[derive(Debug, Default)]
pub struct AttributionResponse {
    pub body: Option<Vec<u8>>,
    pub error: Option<AttributionError>,
}

impl AttributionResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Some(body.into()),
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failed(error: AttributionError) -> Self {
        Self {
            body: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Collapse into a `Result`, dropping empty bodies
    pub fn into_result(self) -> Result<Option<Vec<u8>>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.body.filter(|b| !b.is_empty())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let req = AttributionRequest::get("http://localhost/postback/ios")
            .param("uid", "abc")
            .param("event", "purchase")
            .timeout(Duration::from_secs(3));

        assert_eq!(req.method(), Method::Get);
        let names: Vec<&str> = req.params().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["uid", "event"]);
        assert_eq!(req.param_value("event"), Some(&ParamValue::from("purchase")));
        assert_eq!(req.timeout_duration(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let req = AttributionRequest::post("http://localhost").param("revenue", f64::NAN);
        assert!(matches!(
            req.validate_params(),
            Err(AttributionError::InvalidParameters(_))
        ));
        assert!(req.json_body().is_err());
    }

    #[test]
    fn test_empty_param_name_rejected() {
        let req = AttributionRequest::get("http://localhost").param("", "x");
        assert!(matches!(
            req.validate_params(),
            Err(AttributionError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_json_body_types() {
        let req = AttributionRequest::post("http://localhost")
            .param("uid", "abc")
            .param("count", 3i64)
            .param("first", true)
            .param("revenue", 1.5);

        let body: serde_json::Value = serde_json::from_slice(&req.json_body().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"uid": "abc", "count": 3, "first": true, "revenue": 1.5})
        );
    }

    #[test]
    fn test_query_string_forms() {
        assert_eq!(ParamValue::from(false).to_query_string(), "false");
        assert_eq!(ParamValue::from(42u64).to_query_string(), "42");
        assert_eq!(ParamValue::from(-7i64).to_query_string(), "-7");
    }

    #[test]
    fn test_response_normalization() {
        assert_eq!(AttributionResponse::empty().into_result().unwrap(), None);
        assert_eq!(AttributionResponse::ok("").into_result().unwrap(), None);
        assert_eq!(
            AttributionResponse::ok("true").into_result().unwrap(),
            Some(b"true".to_vec())
        );

        let failed = AttributionResponse {
            body: Some(b"true".to_vec()),
            error: Some(AttributionError::network("timed out")),
        };
        assert!(failed.is_error());
        assert!(matches!(
            failed.into_result(),
            Err(AttributionError::NetworkFailure(_))
        ));
    }
}
