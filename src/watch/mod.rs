//! Periodic health watcher for the downstream services.
//!
//! The original dashboard probed both backends on mount and then every 30
//! seconds from a `setInterval`, tearing the timer down with the page. The
//! watcher here is the same loop made explicit: a cancellable repeating
//! task that probes both services concurrently and publishes the latest
//! snapshot over a watch channel.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::Dispatcher;
use crate::metrics;
use crate::routing::ServiceKind;

/// Outcome of a single health probe.
///
/// Transport failure is the only failure; an HTTP error status still counts
/// as reachable and is recorded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServiceState {
    /// The service answered; status code recorded verbatim.
    Healthy {
        /// HTTP status the health endpoint returned.
        http_status: u16,
    },
    /// The service could not be reached at the transport level.
    Unreachable {
        /// Failure detail (connection refused, DNS, timeout).
        reason: String,
    },
}

impl ServiceState {
    /// Whether the probe reached the service.
    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceState::Healthy { .. })
    }
}

/// One service's probe result within a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    /// Which service was probed.
    pub service: ServiceKind,
    /// The endpoint that was probed.
    pub endpoint: String,
    /// Probe outcome.
    pub state: ServiceState,
    /// Probe round-trip latency in milliseconds.
    pub latency_ms: u64,
    /// Consecutive failed probes, 0 while healthy.
    pub consecutive_failures: u32,
}

/// Latest state of the whole stack.
#[derive(Debug, Clone, Serialize, Default)]
pub struct StackSnapshot {
    /// Per-service probe reports.
    pub services: Vec<ServiceReport>,
    /// Unix timestamp of the batch, 0 before the first batch completes.
    pub checked_at_unix: i64,
}

impl StackSnapshot {
    /// Whether every probed service was reachable.
    pub fn all_healthy(&self) -> bool {
        !self.services.is_empty() && self.services.iter().all(|s| s.state.is_healthy())
    }

    /// Whether any batch has completed yet.
    pub fn is_populated(&self) -> bool {
        self.checked_at_unix != 0
    }
}

/// Health endpoint probed for a service.
fn health_endpoint(service: ServiceKind) -> &'static str {
    match service {
        ServiceKind::Auth => "/api/auth/health",
        ServiceKind::Items => "/health",
    }
}

/// Probe one service's health endpoint.
async fn probe(dispatcher: &Dispatcher, service: ServiceKind) -> ServiceReport {
    let endpoint = health_endpoint(service);
    let started = Instant::now();

    let state = match dispatcher.get(endpoint).await {
        Ok(response) => ServiceState::Healthy {
            http_status: response.status().as_u16(),
        },
        Err(err) => ServiceState::Unreachable {
            reason: err.to_string(),
        },
    };

    metrics::record_probe(&service.to_string(), state.is_healthy(), started);

    ServiceReport {
        service,
        endpoint: endpoint.to_string(),
        state,
        latency_ms: started.elapsed().as_millis() as u64,
        consecutive_failures: 0,
    }
}

/// Probe all services concurrently and assemble a snapshot.
///
/// Probes are independent: one service failing does not affect its sibling,
/// and no completion order is assumed.
pub async fn check_all(dispatcher: &Dispatcher) -> StackSnapshot {
    let services =
        futures::future::join_all(ServiceKind::ALL.map(|service| probe(dispatcher, service))).await;

    StackSnapshot {
        services,
        checked_at_unix: OffsetDateTime::now_utc().unix_timestamp(),
    }
}

/// Repeating health-check task bound to an explicit stop signal.
#[derive(Debug)]
pub struct HealthWatcher {
    snapshot_rx: watch::Receiver<StackSnapshot>,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl HealthWatcher {
    /// Spawn the watcher loop. The first batch runs immediately.
    pub fn spawn(dispatcher: Dispatcher, interval: Duration) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(StackSnapshot::default());
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut failures: HashMap<ServiceKind, u32> = HashMap::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut snapshot = check_all(&dispatcher).await;

                        for report in &mut snapshot.services {
                            let count = failures.entry(report.service).or_insert(0);
                            if report.state.is_healthy() {
                                *count = 0;
                            } else {
                                *count += 1;
                                warn!(
                                    service = %report.service,
                                    failures = *count,
                                    "service unreachable"
                                );
                            }
                            report.consecutive_failures = *count;
                        }

                        debug!(healthy = snapshot.all_healthy(), "health batch completed");
                        if snapshot_tx.send(snapshot).is_err() {
                            break;
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("health watcher stopped");
        });

        Self {
            snapshot_rx,
            stop_tx,
            handle,
        }
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<StackSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stop the repeating trigger and wait for the loop to exit.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_neither_populated_nor_healthy() {
        let snapshot = StackSnapshot::default();
        assert!(!snapshot.is_populated());
        assert!(!snapshot.all_healthy());
    }

    #[test]
    fn snapshot_health_requires_every_service() {
        let healthy = ServiceReport {
            service: ServiceKind::Auth,
            endpoint: "/api/auth/health".to_string(),
            state: ServiceState::Healthy { http_status: 200 },
            latency_ms: 3,
            consecutive_failures: 0,
        };
        let down = ServiceReport {
            service: ServiceKind::Items,
            endpoint: "/health".to_string(),
            state: ServiceState::Unreachable {
                reason: "connection refused".to_string(),
            },
            latency_ms: 1,
            consecutive_failures: 2,
        };

        let snapshot = StackSnapshot {
            services: vec![healthy.clone(), down],
            checked_at_unix: 1_700_000_000,
        };
        assert!(!snapshot.all_healthy());

        let snapshot = StackSnapshot {
            services: vec![healthy],
            checked_at_unix: 1_700_000_000,
        };
        assert!(snapshot.all_healthy());
    }

    #[test]
    fn error_status_still_counts_as_reachable() {
        let state = ServiceState::Healthy { http_status: 503 };
        assert!(state.is_healthy());
    }

    #[test]
    fn service_state_serializes_with_tag() {
        let state = ServiceState::Healthy { http_status: 200 };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "healthy");
        assert_eq!(json["http_status"], 200);
    }

    #[test]
    fn health_endpoints_route_to_their_services() {
        let table = crate::routing::RoutingConfig::default();
        for service in ServiceKind::ALL {
            assert_eq!(table.route(health_endpoint(service)).unwrap(), service);
        }
    }
}
