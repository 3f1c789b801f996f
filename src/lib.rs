//! Status probe and typed client for a two-service development stack.
//!
//! The stack consists of an authentication service (default port 8080) and
//! an item service (default port 8000). One build of this probe works
//! unmodified whether the stack is reached via `localhost` or via a
//! network-visible address (a VM or container bridge IP): base addresses
//! are resolved from an explicit host context, mirroring whatever host the
//! caller used onto the backend calls.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`routing`]: Host resolution and prefix-based endpoint routing
//! - [`client`]: Request dispatcher and option merging
//! - [`services`]: Typed auth and item service clients
//! - [`watch`]: Concurrent health probes and the periodic watcher
//! - [`api`]: HTTP API exposing the aggregated stack status
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod routing;
pub mod services;
pub mod utils;
pub mod watch;

pub use client::{Dispatcher, RequestOptions};
pub use config::Config;
pub use error::{ClientError, Result};
pub use routing::{HostContext, ServiceKind};
