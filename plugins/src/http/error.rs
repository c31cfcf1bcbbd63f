use std::{error::Error as StdError, fmt};

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalHttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl PortalHttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PortalHttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct PortalHttpError {
    kind: PortalHttpErrorKind,
    status: Option<u16>,
    url: Option<String>,
    detail: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl PortalHttpError {
    pub fn kind(&self) -> PortalHttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Server-provided `detail` from an error payload, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: String) -> Self {
        let kind = if err.is_timeout() {
            PortalHttpErrorKind::Timeout
        } else if err.is_connect() {
            PortalHttpErrorKind::Connect
        } else if err.is_request() || err.is_builder() {
            PortalHttpErrorKind::Request
        } else if err.is_body() {
            PortalHttpErrorKind::Body
        } else if err.is_decode() {
            PortalHttpErrorKind::Decode
        } else {
            PortalHttpErrorKind::Unknown
        };
        let status = err.status().map(|s| s.as_u16());
        let message = err.to_string();
        PortalHttpError {
            kind,
            status,
            url: Some(url),
            detail: None,
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn status_error(status: u16, url: String, body: &str) -> Self {
        PortalHttpError {
            kind: PortalHttpErrorKind::Status,
            status: Some(status),
            url: Some(url),
            detail: extract_detail(body),
            message: preview_body(body),
            source: None,
        }
    }

    pub(crate) fn decode_error(
        status: u16,
        url: String,
        err: serde_json::Error,
        body: &str,
    ) -> Self {
        let message = format!(
            "failed to decode response body: {} | body={}",
            err,
            preview_body(body)
        );
        PortalHttpError {
            kind: PortalHttpErrorKind::Decode,
            status: Some(status),
            url: Some(url),
            detail: None,
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }
}

impl fmt::Display for PortalHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "portal http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for PortalHttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

/// Pulls `detail` out of an error payload. The API sends either a plain string or,
/// for request validation errors, a list of `{loc, msg, type}` objects.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}
