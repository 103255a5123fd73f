//! # Client
//!
//! The transaction view and the adapters it talks through.
//!
//! - [`TransactionView`]: form state machine, alerts and event log
//! - [`WalletSession`]: the wallet-connected flag
//! - [`RelayClient`]: HTTP client for the relay endpoints
//! - [`EventFeed`]: the relay's real-time event channel
//! - [`WalletProvider`]: the user's own signer

pub mod error;
pub mod feed;
pub mod relay;
pub mod session;
pub mod view;
pub mod wallet;

pub use error::{ClientError, ClientResult};
pub use feed::{EventFeed, EventInbox};
pub use relay::{RelayApi, RelayClient};
pub use session::WalletSession;
pub use view::{Alert, AlertKind, TransactionView, ViewState, shorten_hash};
pub use wallet::{ChainWallet, WalletProvider};
