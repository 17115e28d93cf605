use http::{
    HeaderMap, HeaderValue,
    header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN},
};

const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Ordered list of origins allowed to read relay responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    /// Parses a comma-separated list, trimming whitespace around each entry.
    pub fn parse(value: &str) -> Self {
        Self(value.split(',').map(|origin| origin.trim().to_string()).collect())
    }

    /// The origin to announce for a request from `origin`.
    ///
    /// Listed origins are echoed back, anything else gets the first configured entry.
    pub fn resolve<'a>(&'a self, origin: &'a str) -> &'a str {
        if self.0.iter().any(|allowed| allowed == origin) {
            origin
        } else {
            self.0.first().map(String::as_str).unwrap_or_default()
        }
    }
}

/// Cross-origin headers decided once per request and attached to every response.
#[derive(Debug, Clone)]
pub(crate) struct CorsHeaders {
    allow_origin: HeaderValue,
}

impl CorsHeaders {
    pub(crate) fn for_request(headers: &HeaderMap, origins: &AllowedOrigins) -> Self {
        let origin = headers
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed = origins.resolve(origin);

        let allow_origin = HeaderValue::from_str(allowed).unwrap_or_else(|_| {
            log::warn!("Configured origin '{allowed}' is not a valid header value");
            HeaderValue::from_static("")
        });

        Self { allow_origin }
    }

    pub(crate) fn apply(self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    }
}
