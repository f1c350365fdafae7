use url::Url;

use crate::client::AuthToken;
use crate::error::ConfigError;

/// Backend connection configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the blog API, e.g. `http://localhost:8080`.
    pub backend_url: Url,
    /// Token sent verbatim as the `Authorization` header on write requests.
    pub token: Option<AuthToken>,
}

impl Config {
    /// Default backend URL (local development server)
    pub const DEFAULT_BACKEND: &'static str = "http://localhost:8080";

    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `FIBO_BACKEND_URL`: API base URL (default: http://localhost:8080)
    /// - `FIBO_TOKEN`: auth token for creating and editing posts
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|var| std::env::var(var).ok())
    }

    /// Like [`Config::from_env`], reading variables through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend =
            lookup("FIBO_BACKEND_URL").unwrap_or_else(|| Self::DEFAULT_BACKEND.to_string());
        Self::new(&backend, lookup("FIBO_TOKEN"))
    }

    pub fn new(backend: &str, token: Option<String>) -> Result<Self, ConfigError> {
        let backend_url = parse_backend_url(backend)?;
        let token = token.filter(|t| !t.is_empty()).map(AuthToken::new);
        Ok(Self { backend_url, token })
    }

    /// Apply command line values on top of this config.
    pub fn override_with(
        mut self,
        backend: Option<&str>,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(backend) = backend {
            self.backend_url = parse_backend_url(backend)?;
        }
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.token = Some(AuthToken::new(token));
        }
        Ok(self)
    }

    /// The configured token, or an error naming the variable to set.
    pub fn require_token(&self) -> Result<&AuthToken, ConfigError> {
        self.token
            .as_ref()
            .ok_or(ConfigError::MissingEnv { var: "FIBO_TOKEN" })
    }
}

/// Parse a backend base URL, making sure it ends in `/` so endpoint paths
/// join underneath it instead of replacing its last segment.
pub fn parse_backend_url(backend: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(backend).map_err(|e| ConfigError::UrlParse {
        url: backend.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::UrlParse {
            url: backend.to_string(),
            message: "not a base url".to_string(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_url_gets_trailing_slash() {
        let url = parse_backend_url("https://api.example.com/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/");
        assert_eq!(url.join("posts/3").unwrap().path(), "/v1/posts/3");
    }

    #[test]
    fn rejects_garbage_url() {
        let err = parse_backend_url("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::UrlParse { .. }));
    }

    #[test]
    fn empty_token_is_no_token() {
        let config = Config::new("http://localhost:8080", Some(String::new())).unwrap();
        assert!(config.token.is_none());
        assert!(matches!(
            config.require_token(),
            Err(ConfigError::MissingEnv { var: "FIBO_TOKEN" })
        ));
    }

    #[test]
    fn vars_fill_in_defaults() {
        let config = Config::from_vars(|_| None).unwrap();
        assert_eq!(config.backend_url.as_str(), "http://localhost:8080/");
        assert!(config.token.is_none());

        let config = Config::from_vars(|var| match var {
            "FIBO_BACKEND_URL" => Some("https://blog.example/api".into()),
            "FIBO_TOKEN" => Some("abc".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.backend_url.as_str(), "https://blog.example/api/");
        assert_eq!(config.require_token().unwrap().as_str(), "abc");
    }

    #[test]
    fn reads_process_environment() {
        // Only test in this crate that touches FIBO_* variables
        unsafe {
            std::env::set_var("FIBO_BACKEND_URL", "http://127.0.0.1:9000");
            std::env::set_var("FIBO_TOKEN", "env-token");
        }
        let config = Config::from_env();
        unsafe {
            std::env::remove_var("FIBO_BACKEND_URL");
            std::env::remove_var("FIBO_TOKEN");
        }
        let config = config.unwrap();
        assert_eq!(config.backend_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.token, Some(AuthToken::new("env-token")));
    }

    #[test]
    fn flags_override_environment() {
        let env = Config::new("http://localhost:8080", Some("from-env".into())).unwrap();

        let kept = env.clone().override_with(None, None).unwrap();
        assert_eq!(kept.backend_url, env.backend_url);
        assert_eq!(kept.token, env.token);

        let flagged = env
            .override_with(Some("http://other:1"), Some("from-flag".into()))
            .unwrap();
        assert_eq!(flagged.backend_url.as_str(), "http://other:1/");
        assert_eq!(flagged.token, Some(AuthToken::new("from-flag")));
    }

    #[test]
    fn bad_override_url_fails() {
        let err = Config::new("http://localhost:8080", None)
            .unwrap()
            .override_with(Some("::"), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UrlParse { .. }));
    }
}
