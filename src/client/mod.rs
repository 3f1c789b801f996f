//! Request dispatcher: one best-effort HTTP call per invocation.

mod options;

pub use options::RequestOptions;

use tracing::{debug, error, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{Result, RouteError};
use crate::routing::{resolve_addresses, HostContext, RoutingConfig};

/// Dispatches requests to the downstream services.
///
/// Stateless per call: the endpoint is routed by prefix, the base address
/// is re-resolved from the host context, and a single attempt is made. No
/// retries, no backoff. A non-2xx status is not a failure at this layer;
/// only transport failure errors, and it is logged with the attempted URL
/// before being propagated.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// Shared HTTP client.
    http: reqwest::Client,
    /// Prefix table and service ports.
    table: RoutingConfig,
    /// Host the stack was reached through.
    ctx: HostContext,
}

impl Dispatcher {
    /// Create a dispatcher from application config with tuned HTTP settings.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(std::time::Duration::from_millis(500))
            .tcp_nodelay(true)
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_max_idle_per_host(config.http_pool_size)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            table: RoutingConfig::from_config(config),
            ctx: HostContext::from_advertised(config.advertised_host.as_deref()),
        }
    }

    /// Create a dispatcher from explicit parts.
    pub fn with_parts(http: reqwest::Client, table: RoutingConfig, ctx: HostContext) -> Self {
        Self { http, table, ctx }
    }

    /// Absolute URL a request for `endpoint` would target.
    ///
    /// Addresses are re-resolved on every call; nothing is cached.
    pub fn target_url(&self, endpoint: &str) -> std::result::Result<Url, RouteError> {
        let service = self.table.route(endpoint)?;
        let addresses = resolve_addresses(&self.ctx, &self.table);
        let raw = format!("{}{}", addresses.base(service), endpoint);

        Url::parse(&raw).map_err(|e| RouteError::InvalidBase {
            service,
            reason: e.to_string(),
        })
    }

    /// Issue a single request against the routed service.
    ///
    /// Returns the raw response; the caller reads and parses the body.
    #[instrument(skip(self, options), fields(endpoint = %endpoint))]
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<reqwest::Response> {
        let url = self.target_url(endpoint)?;
        debug!(url = %url, method = %options.effective_method(), "dispatching request");

        let mut request = self
            .http
            .request(options.effective_method(), url.clone())
            .headers(options.effective_headers());

        if let Some(body) = options.body {
            request = request.body(body);
        }

        match request.send().await {
            Ok(response) => {
                crate::metrics::record_dispatch(endpoint, response.status().as_u16());
                Ok(response)
            }
            Err(err) => {
                error!(url = %url, error = %err, "request failed");
                crate::metrics::record_dispatch_failure(endpoint);
                Err(err.into())
            }
        }
    }

    /// Convenience GET with default options.
    pub async fn get(&self, endpoint: &str) -> Result<reqwest::Response> {
        self.request(endpoint, RequestOptions::new()).await
    }
}
