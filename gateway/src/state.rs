//! Gateway state definitions.

use std::sync::Arc;

use parking_lot::RwLock;
use xrate_fx::RateResolver;

/// Gateway operational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// Listener not yet bound.
    Starting,
    /// Serving requests.
    Running,
    /// Shutdown requested, draining in-flight requests.
    ShuttingDown,
    /// Server task finished.
    Stopped,
}

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide rate resolver; owns the rate cache.
    pub resolver: Arc<RateResolver>,
    lifecycle: Arc<RwLock<GatewayState>>,
}

impl AppState {
    /// Create handler state around a resolver.
    pub fn new(resolver: Arc<RateResolver>) -> Self {
        Self {
            resolver,
            lifecycle: Arc::new(RwLock::new(GatewayState::Starting)),
        }
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> GatewayState {
        *self.lifecycle.read()
    }

    pub(crate) fn set_lifecycle(&self, state: GatewayState) {
        *self.lifecycle.write() = state;
    }
}
