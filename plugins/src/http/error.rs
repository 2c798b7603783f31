use std::{error::Error as StdError, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Status,
    Header,
    Unknown,
}

impl HttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Status => "status",
            Self::Header => "header",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct HttpError {
    kind: HttpErrorKind,
    status: Option<u16>,
    url: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl HttpError {
    pub fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        let kind = if err.is_timeout() {
            HttpErrorKind::Timeout
        } else if err.is_connect() {
            HttpErrorKind::Connect
        } else if err.is_request() || err.is_builder() {
            HttpErrorKind::Request
        } else if err.is_body() || err.is_decode() {
            HttpErrorKind::Body
        } else {
            HttpErrorKind::Unknown
        };
        HttpError {
            kind,
            status: err.status().map(|s| s.as_u16()),
            url: Some(url.to_string()),
            message: err.to_string(),
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn status_error(status: u16, url: &str, preview: String) -> Self {
        HttpError {
            kind: HttpErrorKind::Status,
            status: Some(status),
            url: Some(url.to_string()),
            message: preview,
            source: None,
        }
    }

    pub(crate) fn header_error(name: &str, err: impl Into<anyhow::Error>) -> Self {
        let source = err.into();
        HttpError {
            kind: HttpErrorKind::Header,
            status: None,
            url: None,
            message: format!("invalid header `{}`: {}", name, source),
            source: Some(source),
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for HttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
