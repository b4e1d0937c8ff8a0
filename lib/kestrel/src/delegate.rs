//! Default delegate implementation.

use kestrel_core::Delegate;

use crate::{HyperTransport, config::TransportConfig};

/// Delegate using every default hook and a [`HyperTransport`].
///
/// No extra headers, JSON codec, identity decoration, and the standard
/// status-wrapping error mapping. Start here and move to a custom
/// [`Delegate`] implementation when an API needs auth headers, a different
/// codec, or typed error bodies.
#[derive(Debug, Clone, Default)]
pub struct DefaultDelegate {
    transport: HyperTransport,
}

impl DefaultDelegate {
    /// Create a delegate with a default transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a delegate with a custom transport configuration.
    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        Self {
            transport: HyperTransport::with_config(config),
        }
    }

    /// Create a delegate around an existing transport (e.g., to share its
    /// connection pool with other clients).
    #[must_use]
    pub const fn with_transport(transport: HyperTransport) -> Self {
        Self { transport }
    }
}

impl Delegate for DefaultDelegate {
    type Transport = HyperTransport;

    fn transport(&self) -> &Self::Transport {
        &self.transport
    }
}
