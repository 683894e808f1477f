use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::ScrapeError;

/// Top-level keys of the payload the endpoint returns when it refuses to
/// serve the profile (login wall, rate limiting).
pub const DEFAULT_BLOCK_KEYS: [&str; 3] = ["message", "require_login", "status"];

pub const DEFAULT_PROXY_HOST: &str = "gate.smartproxy.com";
pub const DEFAULT_PROXY_PORT: u16 = 7000;

pub const RAW_JSON_INDENT: usize = 4;
pub const RECORD_JSON_INDENT: usize = 6;

/// A validated account name, safe to use as a URL path segment and file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._]{1,30}$").expect("username pattern compiles"))
}

impl Username {
    /// Input is taken verbatim; surrounding whitespace is rejected, not trimmed.
    pub fn parse(raw: &str) -> Result<Self, ScrapeError> {
        // "." and ".." match the character class but would resolve to a directory.
        if !username_pattern().is_match(raw) || raw.chars().all(|c| c == '.') {
            return Err(ScrapeError::InvalidUsername(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Credentials and address of the forward proxy.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_proxy_host")]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

fn default_proxy_host() -> String {
    DEFAULT_PROXY_HOST.to_string()
}

fn default_proxy_port() -> u16 {
    DEFAULT_PROXY_PORT
}

impl ProxyConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: default_proxy_host(),
            port: DEFAULT_PROXY_PORT,
        }
    }

    pub fn with_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Proxy address without credentials.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:***@{}:{}", self.username, self.host, self.port)
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// The key set that marks a "blocked" response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSignature(BTreeSet<String>);

impl BlockSignature {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// True when the value is an object whose key set equals the signature exactly.
    pub fn matches(&self, value: &Value) -> bool {
        match value.as_object() {
            Some(map) => {
                map.len() == self.0.len() && map.keys().all(|key| self.0.contains(key))
            }
            None => false,
        }
    }
}

impl Default for BlockSignature {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_KEYS)
    }
}

/// The profile payload exactly as the endpoint returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProfileDocument(Value);

impl RawProfileDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ScrapeError> {
        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|e| ScrapeError::Serialization(e.to_string()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn to_pretty_bytes(&self) -> Result<Vec<u8>, ScrapeError> {
        to_indented_json(&self.0, RAW_JSON_INDENT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedProfile {
    pub username: String,
    pub category: Vec<String>,
    pub id: String,
    pub biography: String,
    pub num_followers: u64,
    pub num_followees: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(rename = "imgURL")]
    pub img_url: String,
    pub post_id: String,
    pub is_video: bool,
    pub caption: String,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn to_indented_json<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<Vec<u8>, ScrapeError> {
    let indent = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| ScrapeError::Serialization(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_signature_requires_exact_key_set() {
        let signature = BlockSignature::default();

        assert!(signature.matches(&json!({"message": "", "require_login": true, "status": "fail"})));
        assert!(signature.matches(&json!({"status": "fail", "message": "x", "require_login": false})));
        assert!(!signature.matches(&json!({"message": "", "status": "fail"})));
        assert!(!signature.matches(&json!({
            "message": "", "require_login": true, "status": "fail", "graphql": {}
        })));
        assert!(!signature.matches(&json!(["message", "require_login", "status"])));
    }

    #[test]
    fn username_rejects_path_like_input() {
        assert!(Username::parse("nasa").is_ok());
        assert!(Username::parse("first.last_99").is_ok());

        let too_long = "x".repeat(31);
        for bad in ["", "..", ".", "a/b", "../etc", "with space", "  nasa ", "nasa\n", too_long.as_str()] {
            assert!(
                matches!(Username::parse(bad), Err(ScrapeError::InvalidUsername(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn proxy_endpoint_and_redacted_display() {
        let proxy = ProxyConfig::new("user-1", "s3cret");

        assert_eq!(proxy.endpoint(), "http://gate.smartproxy.com:7000");
        assert!(!proxy.to_string().contains("s3cret"));
        assert!(!format!("{:?}", proxy).contains("s3cret"));

        let custom = proxy.with_endpoint("127.0.0.1", 3128);
        assert_eq!(custom.endpoint(), "http://127.0.0.1:3128");
        assert_eq!(custom.password, "s3cret");
    }

    #[test]
    fn post_record_uses_remote_field_names() {
        let record = PostRecord {
            img_url: "https://cdn.example/p.jpg".into(),
            post_id: "42".into(),
            is_video: false,
            caption: String::new(),
        };

        let bytes = to_indented_json(&record, RECORD_JSON_INDENT).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("{\n      \"imgURL\": "));
        assert!(text.contains("\"caption\": \"\""));
    }

    #[test]
    fn raw_document_keeps_remote_key_order() {
        let doc = RawProfileDocument::from_slice(br#"{"zeta": 1, "alpha": {"b": 2, "a": 3}}"#).unwrap();
        let text = String::from_utf8(doc.to_pretty_bytes().unwrap()).unwrap();

        assert_eq!(
            text,
            "{\n    \"zeta\": 1,\n    \"alpha\": {\n        \"b\": 2,\n        \"a\": 3\n    }\n}"
        );
    }
}
