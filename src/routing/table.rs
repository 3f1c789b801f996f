//! Data-driven routing table: path prefix to service, service to port.

use crate::config::Config;
use crate::error::RouteError;

use super::ServiceKind;

/// A single prefix-to-service routing rule.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Path prefix, matched on path-segment boundaries.
    pub prefix: String,
    /// Service the prefix routes to.
    pub service: ServiceKind,
}

impl RouteRule {
    fn new(prefix: &str, service: ServiceKind) -> Self {
        Self {
            prefix: prefix.to_string(),
            service,
        }
    }

    /// Whether `endpoint` falls under this rule's prefix.
    ///
    /// Matches on segment boundaries so `/api/items`, `/api/items/` and
    /// `/api/items/3` all match the `/api/items` prefix while
    /// `/api/itemsets` does not.
    fn matches(&self, endpoint: &str) -> bool {
        let Some(rest) = endpoint.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        matches!(rest.as_bytes().first(), None | Some(b'/') | Some(b'?'))
    }
}

/// Routing configuration: the prefix table plus per-service ports.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Prefix rules, consulted longest-prefix-first.
    pub rules: Vec<RouteRule>,
    /// URL scheme for both services.
    pub scheme: String,
    /// Auth service port.
    pub auth_port: u16,
    /// Item service port.
    pub item_port: u16,
}

impl RoutingConfig {
    /// Build the routing table from application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            auth_port: config.auth_port,
            item_port: config.item_port,
            ..Self::default()
        }
    }

    /// Port assigned to a service.
    pub fn port(&self, service: ServiceKind) -> u16 {
        match service {
            ServiceKind::Auth => self.auth_port,
            ServiceKind::Items => self.item_port,
        }
    }

    /// Route an endpoint path to a service by longest-prefix match.
    ///
    /// An endpoint that matches no rule is a configuration error, not a
    /// request against an empty base URL.
    pub fn route(&self, endpoint: &str) -> Result<ServiceKind, RouteError> {
        if !endpoint.starts_with('/') {
            return Err(RouteError::RelativeEndpoint {
                endpoint: endpoint.to_string(),
            });
        }

        self.rules
            .iter()
            .filter(|rule| rule.matches(endpoint))
            .max_by_key(|rule| rule.prefix.len())
            .map(|rule| rule.service)
            .ok_or_else(|| RouteError::UnroutedEndpoint {
                endpoint: endpoint.to_string(),
            })
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                RouteRule::new("/api/auth", ServiceKind::Auth),
                RouteRule::new("/api/user", ServiceKind::Auth),
                RouteRule::new("/api/items", ServiceKind::Items),
                RouteRule::new("/api/categories", ServiceKind::Items),
                RouteRule::new("/health", ServiceKind::Items),
            ],
            scheme: "http".to_string(),
            auth_port: 8080,
            item_port: 8000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn auth_prefixes_route_to_auth_service() {
        let table = RoutingConfig::default();
        assert_eq!(table.route("/api/auth/health").unwrap(), ServiceKind::Auth);
        assert_eq!(table.route("/api/auth/login").unwrap(), ServiceKind::Auth);
        assert_eq!(table.route("/api/user").unwrap(), ServiceKind::Auth);
    }

    #[test]
    fn item_prefixes_route_to_item_service() {
        let table = RoutingConfig::default();
        assert_eq!(table.route("/api/items/").unwrap(), ServiceKind::Items);
        assert_eq!(table.route("/api/items/3").unwrap(), ServiceKind::Items);
        assert_eq!(table.route("/api/categories").unwrap(), ServiceKind::Items);
        assert_eq!(table.route("/health").unwrap(), ServiceKind::Items);
    }

    #[test]
    fn bare_collection_path_routes_without_trailing_slash() {
        let table = RoutingConfig::default();
        assert_eq!(table.route("/api/items").unwrap(), ServiceKind::Items);
    }

    #[test]
    fn prefix_match_respects_segment_boundaries() {
        let table = RoutingConfig::default();
        assert!(matches!(
            table.route("/api/itemsets"),
            Err(RouteError::UnroutedEndpoint { .. })
        ));
        assert!(matches!(
            table.route("/healthz"),
            Err(RouteError::UnroutedEndpoint { .. })
        ));
    }

    #[test]
    fn query_string_does_not_defeat_matching() {
        let table = RoutingConfig::default();
        assert_eq!(table.route("/api/items?limit=5").unwrap(), ServiceKind::Items);
    }

    #[test]
    fn unrouted_endpoint_is_an_error() {
        let table = RoutingConfig::default();
        assert!(matches!(
            table.route("/api/orders"),
            Err(RouteError::UnroutedEndpoint { .. })
        ));
    }

    #[test]
    fn relative_endpoint_is_rejected() {
        let table = RoutingConfig::default();
        assert!(matches!(
            table.route("api/items"),
            Err(RouteError::RelativeEndpoint { .. })
        ));
    }

    #[test]
    fn ports_follow_application_config() {
        let config = Config {
            auth_port: 9080,
            item_port: 9000,
            ..Config::default()
        };

        let table = RoutingConfig::from_config(&config);
        assert_eq!(table.port(ServiceKind::Auth), 9080);
        assert_eq!(table.port(ServiceKind::Items), 9000);
    }
}
