//! Host-aware resolution of service base addresses.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{HostContext, RoutingConfig, ServiceKind};

/// Private-network IPv4 pattern (container/VM bridge addresses).
static PRIVATE_IP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(172\.|192\.168\.)").expect("valid regex"));

/// Resolved base addresses for both downstream services.
///
/// Derived, never persisted; recomputed on every resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAddresses {
    /// Auth service base, `scheme://host:port`.
    pub auth: String,
    /// Item service base, `scheme://host:port`.
    pub items: String,
}

impl ServiceAddresses {
    /// Base address for a service.
    pub fn base(&self, service: ServiceKind) -> &str {
        match service {
            ServiceKind::Auth => &self.auth,
            ServiceKind::Items => &self.items,
        }
    }
}

/// Compute both service base addresses from an explicit host context.
///
/// Pure and total: no I/O, no failure modes. The policy mirrors whatever
/// host the stack was reached through onto the backend addresses, so one
/// build works unmodified via `localhost` or via a network-visible address.
pub fn resolve_addresses(ctx: &HostContext, table: &RoutingConfig) -> ServiceAddresses {
    match ctx {
        HostContext::Local => loopback(table),
        HostContext::Advertised(host) => {
            if PRIVATE_IP.is_match(host) || host != "localhost" {
                mirrored(host, table)
            } else {
                loopback(table)
            }
        }
    }
}

fn loopback(table: &RoutingConfig) -> ServiceAddresses {
    mirrored("localhost", table)
}

fn mirrored(host: &str, table: &RoutingConfig) -> ServiceAddresses {
    ServiceAddresses {
        auth: format!("{}://{}:{}", table.scheme, host, table.auth_port),
        items: format!("{}://{}:{}", table.scheme, host, table.item_port),
    }
}
