//! Base URLs for the dashboard backend and per-endpoint routing.
//!
//! Most endpoints are served by the main API function and selected with an
//! `endpoint=<name>` query parameter. A few endpoints live behind their own
//! function URL; requests naming them are redirected there with the query
//! string kept intact.

use std::collections::BTreeMap;

use reqwest::Url;
use tracing::{debug, warn};

/// Base URL of the main API function
pub const API_URL: &str = "https://functions.poehali.dev/3eae2c24-6b31-423b-ab37-dcd66c461749";

/// Base URL of the token refresh function
pub const REFRESH_URL: &str = "https://functions.poehali.dev/597de3a8-5db2-4e46-8835-5a37042b00f1";

/// Endpoints served by a dedicated function instead of `API_URL`
pub const ENDPOINT_ROUTES: &[(&str, &str)] = &[
    (
        "services",
        "https://functions.poehali.dev/2cfd72d5-c228-4dc9-af9b-f592d65be207",
    ),
    (
        "payments",
        "https://functions.poehali.dev/42303a3a-efd9-4863-9d99-b41962f017dc",
    ),
];

/// Query parameter naming the endpoint
const ENDPOINT_PARAM: &str = "endpoint";

/// Base URL for an endpoint using the built-in routing table.
pub fn api_url(endpoint: Option<&str>) -> &'static str {
    endpoint
        .and_then(|name| ENDPOINT_ROUTES.iter().find(|(n, _)| *n == name))
        .map(|(_, url)| *url)
        .unwrap_or(API_URL)
}

/// Endpoint name to base URL table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRoutes {
    routes: BTreeMap<String, String>,
}

impl Default for EndpointRoutes {
    fn default() -> Self {
        Self {
            routes: ENDPOINT_ROUTES
                .iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect(),
        }
    }
}

impl EndpointRoutes {
    /// An empty table: nothing is redirected
    pub fn empty() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Add or replace a route
    pub fn insert(&mut self, endpoint: impl Into<String>, base_url: impl Into<String>) {
        self.routes.insert(endpoint.into(), base_url.into());
    }

    pub fn get(&self, endpoint: &str) -> Option<&str> {
        self.routes.get(endpoint).map(String::as_str)
    }

    /// Base URL for an endpoint, falling back to `default_base`.
    pub fn base_for<'a>(&'a self, endpoint: Option<&str>, default_base: &'a str) -> &'a str {
        endpoint.and_then(|e| self.get(e)).unwrap_or(default_base)
    }

    /// Rewrite `url` when its `endpoint` query parameter names a routed
    /// endpoint: the routed base plus the original query string. Anything
    /// else, including URLs that fail to parse, comes back unchanged.
    pub fn resolve(&self, url: &str) -> String {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url = url, error = %e, "URL parsing error, sending unchanged");
                return url.to_string();
            }
        };

        let endpoint = parsed
            .query_pairs()
            .find(|(key, _)| key == ENDPOINT_PARAM)
            .map(|(_, value)| value.into_owned());

        let Some(endpoint) = endpoint else {
            return url.to_string();
        };
        let Some(base) = self.get(&endpoint) else {
            return url.to_string();
        };

        let routed = match parsed.query() {
            Some(query) => format!("{}?{}", base, query),
            None => base.to_string(),
        };
        debug!(endpoint = %endpoint, from = url, to = %routed, "Redirecting endpoint");
        routed
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EndpointRoutes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_lookup() {
        assert_eq!(api_url(None), API_URL);
        assert_eq!(api_url(Some("tickets")), API_URL);
        assert_eq!(api_url(Some("services")), ENDPOINT_ROUTES[0].1);
        assert_eq!(api_url(Some("payments")), ENDPOINT_ROUTES[1].1);
    }

    #[test]
    fn test_resolve_routed_endpoint_keeps_query() {
        let routes = EndpointRoutes::default();
        let url = format!("{}?endpoint=payments&status=approved", API_URL);
        assert_eq!(
            routes.resolve(&url),
            format!("{}?endpoint=payments&status=approved", ENDPOINT_ROUTES[1].1)
        );
    }

    #[test]
    fn test_resolve_drops_original_path() {
        let routes: EndpointRoutes = [("services", "https://svc.example.com/fn")].into_iter().collect();
        assert_eq!(
            routes.resolve("https://api.example.com/some/path?id=7&endpoint=services"),
            "https://svc.example.com/fn?id=7&endpoint=services"
        );
    }

    #[test]
    fn test_resolve_leaves_other_urls_alone() {
        let routes = EndpointRoutes::default();
        let unrouted = format!("{}?endpoint=tickets", API_URL);
        assert_eq!(routes.resolve(&unrouted), unrouted);
        assert_eq!(routes.resolve(API_URL), API_URL);
        assert_eq!(routes.resolve("not a url"), "not a url");
    }

    #[test]
    fn test_empty_table_never_redirects() {
        let routes = EndpointRoutes::empty();
        let url = format!("{}?endpoint=payments", API_URL);
        assert_eq!(routes.resolve(&url), url);
    }

    #[test]
    fn test_base_for_falls_back() {
        let mut routes = EndpointRoutes::empty();
        routes.insert("reports", "https://reports.example.com");
        assert_eq!(routes.base_for(Some("reports"), API_URL), "https://reports.example.com");
        assert_eq!(routes.base_for(Some("me"), API_URL), API_URL);
        assert_eq!(routes.base_for(None, "https://other"), "https://other");
    }
}
