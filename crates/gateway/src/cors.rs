//! CORS policy built from `[server.cors]`.
//!
//! Entries ending in `:*` match any numeric port on that host
//! (`http://localhost:*`). A lone `"*"` allows every origin, without
//! credentials.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use ts_domain::config::CorsConfig;

const METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

/// Allowed origins split into exact matches and wildcard-port prefixes.
#[derive(Debug, Clone, Default)]
struct OriginRules {
    exact: Vec<HeaderValue>,
    /// Origin minus the trailing `*`, e.g. `http://localhost:`.
    port_prefixes: Vec<String>,
}

impl OriginRules {
    fn from_config(cors: &CorsConfig) -> Self {
        let mut rules = Self::default();
        for origin in &cors.allowed_origins {
            if let Some(prefix) = origin.strip_suffix('*').filter(|p| p.ends_with(':')) {
                rules.port_prefixes.push(prefix.to_owned());
            } else if let Ok(value) = origin.parse::<HeaderValue>() {
                rules.exact.push(value);
            } else {
                tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
            }
        }
        rules
    }

    fn allows(&self, origin: &HeaderValue) -> bool {
        if self.exact.iter().any(|e| e.as_bytes() == origin.as_bytes()) {
            return true;
        }
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        self.port_prefixes.iter().any(|prefix| {
            origin
                .strip_prefix(prefix.as_str())
                .is_some_and(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
        })
    }
}

fn is_wildcard(cors: &CorsConfig) -> bool {
    matches!(cors.allowed_origins.as_slice(), [only] if only == "*")
}

pub fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Credentials cannot be combined with a wildcard origin.
    if is_wildcard(cors) {
        tracing::warn!("CORS configured with wildcard \"*\": all origins allowed");
        return base.allow_origin(Any);
    }

    let rules = OriginRules::from_config(cors);
    let allow_origin = if rules.port_prefixes.is_empty() {
        AllowOrigin::list(rules.exact)
    } else {
        AllowOrigin::predicate(move |origin, _| rules.allows(origin))
    };
    base.allow_origin(allow_origin).allow_credentials(true)
}
