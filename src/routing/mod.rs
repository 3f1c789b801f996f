//! Endpoint routing and host-aware address resolution.
//!
//! The original dashboard decided its backend base URLs inside the request
//! helper, by reading the browser's hostname and a pair of hardcoded
//! `startsWith` checks. Here both decisions are data: [`HostContext`] makes
//! the ambient host an explicit input, and [`RoutingConfig`] holds the
//! prefix table and ports that used to live inline.

mod resolve;
mod table;

pub use resolve::{resolve_addresses, ServiceAddresses};
pub use table::{RouteRule, RoutingConfig};

use serde::{Deserialize, Serialize};
use strum::Display;

/// The downstream services distinguished by path-prefix routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// Authentication/user domain (Spring-style backend).
    #[strum(serialize = "auth-service")]
    Auth,
    /// Item/health domain (FastAPI-style backend).
    #[strum(serialize = "item-service")]
    Items,
}

impl ServiceKind {
    /// All services, in display order.
    pub const ALL: [ServiceKind; 2] = [ServiceKind::Auth, ServiceKind::Items];
}

/// Where the stack is being reached from, made explicit.
///
/// Replaces the ambient `window.location.hostname` read: `Local` is the
/// no-browsing-context / plain-localhost case, `Advertised` carries the
/// network-visible hostname the front end was reached through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostContext {
    /// No advertised host; use loopback defaults.
    Local,
    /// Reached via a specific hostname (e.g. a VM or container bridge IP).
    Advertised(String),
}

impl HostContext {
    /// Build a context from an optional advertised host.
    pub fn from_advertised(host: Option<&str>) -> Self {
        match host {
            Some(h) if !h.trim().is_empty() => HostContext::Advertised(h.trim().to_string()),
            _ => HostContext::Local,
        }
    }
}
