//! Error types for fibo

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};

/// Main error type for fibo operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum FiboError {
    /// Post content that is not a block document
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    /// Backend request failure
    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] ClientError),

    /// Bad or missing configuration
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic_source]
    Serde(#[from] SerDeError),
}

/// Parse error with source code location information
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("parse error: {source}")]
#[diagnostic(code(fibo::parse))]
pub struct ParseError {
    source: serde_json::Error,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    err_location: SourceSpan,
    #[help]
    advice: Option<String>,
}

impl ParseError {
    /// Wrap a JSON failure together with the text that produced it.
    pub fn new(name: impl AsRef<str>, text: &str, err: serde_json::Error) -> Self {
        let offset = SourceOffset::from_location(text, err.line(), err.column());
        let advice = if err.is_eof() {
            Some("the content ends early; it may have been truncated".to_string())
        } else if err.is_data() {
            Some("the content is JSON but not a block document".to_string())
        } else {
            None
        };
        Self {
            source: err,
            src: NamedSource::new(name, text.to_string()),
            err_location: SourceSpan::new(offset, 0),
            advice,
        }
    }

    /// Line and column (1-based) reported by the JSON parser.
    pub fn location(&self) -> (usize, usize) {
        (self.source.line(), self.source.column())
    }

    pub fn is_syntax(&self) -> bool {
        self.source.is_syntax() || self.source.is_eof()
    }
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    #[diagnostic(code(fibo::serde::json))]
    Json(#[from] serde_json::Error),
}

/// Backend HTTP errors
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ClientError {
    #[error("request to {url} failed")]
    #[diagnostic(code(fibo::client::request))]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not decode response from {url}")]
    #[diagnostic(code(fibo::client::decode))]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid endpoint path {path}")]
    #[diagnostic(code(fibo::client::url))]
    Url {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("backend replied {status}: {message}")]
    #[diagnostic(code(fibo::client::api))]
    Api { status: i64, message: String },
}

/// Configuration errors
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("missing environment variable {var}")]
    #[diagnostic(code(config::missing_env))]
    MissingEnv { var: &'static str },

    #[error("invalid url {url}: {message}")]
    #[diagnostic(code(config::url_parse))]
    UrlParse { url: String, message: String },
}
