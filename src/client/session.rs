//! # Wallet Session
//!
//! The wallet-connected flag shared between views.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Records whether the user connected their wallet.
///
/// Clones share the same flag, so a session outlives any single view and a
/// new view starts in the state the previous one left.
#[derive(Debug, Clone, Default)]
pub struct WalletSession {
    connected: Arc<AtomicBool>,
}

impl WalletSession {
    /// Creates a disconnected session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the wallet was connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Marks the wallet connected.
    pub fn mark_connected(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Marks the wallet disconnected.
    pub fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}
