//! # Transaction View
//!
//! View model of the Ether transfer form.
//!
//! # State Machine
//!
//! ```text
//! WalletDisconnected ──connect──> WalletConnected
//!        ↑                              │
//!   disconnect /                  submit_via_relay /
//!   accounts_changed([])          submit_via_wallet
//!        │                              ↓
//!      Idle <──────── done ───────── Submitting
//! ```
//!
//! Received events and the last relay result survive a disconnect. Alerts
//! expire four seconds after being raised.

use super::error::{ClientError, ClientResult};
use super::feed::EventInbox;
use super::relay::RelayApi;
use super::session::WalletSession;
use super::wallet::WalletProvider;
use crate::domain::entities::{TransactionRequest, TransactionResult};
use crate::domain::events::ChainEvent;
use crate::infrastructure::blockchain::ContractCall;
use ethers::abi::Token;
use ethers::types::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// How long an alert stays visible.
pub const ALERT_DURATION: Duration = Duration::from_secs(4);

/// Alert raised when a form field is empty.
pub const FIELDS_REQUIRED: &str = "All fields must be filled!";
/// Alert raised when no wallet provider is available.
pub const PROVIDER_MISSING: &str = "Please install a wallet provider!";
/// Alert raised after a successful submission.
pub const TRANSACTION_SUCCESSFUL: &str = "Transaction successful!";
/// Alert raised when a wallet submission fails.
pub const TRANSACTION_FAILED: &str = "Transaction failed. Please try again.";
/// Alert raised when a relay submission fails.
pub const RELAY_FAILED: &str = "All fields must be filled or Transaction failed. Please try again.";

/// Connection and submission state of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// No wallet connected.
    WalletDisconnected,
    /// Wallet connected, nothing submitted yet.
    WalletConnected,
    /// A submission is in flight.
    Submitting,
    /// Wallet connected, last submission finished.
    Idle,
}

impl ViewState {
    /// Returns true if the wallet is connected.
    #[must_use]
    pub fn is_connected(self) -> bool {
        !matches!(self, Self::WalletDisconnected)
    }
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// The operation succeeded.
    Success,
    /// The operation failed or was blocked.
    Failure,
}

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    message: String,
    kind: AlertKind,
    raised_at: Instant,
}

impl Alert {
    fn new(message: impl Into<String>, kind: AlertKind) -> Self {
        Self {
            message: message.into(),
            kind,
            raised_at: Instant::now(),
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the kind.
    #[must_use]
    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    /// Returns true until [`ALERT_DURATION`] has elapsed.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.raised_at.elapsed() < ALERT_DURATION
    }
}

/// Shortens a hash or address to its first and last five characters.
///
/// Values of ten characters or fewer are returned unchanged.
#[must_use]
pub fn shorten_hash(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 10 {
        return value.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{head}...{tail}")
}

/// View model of the transfer form.
#[derive(Debug)]
pub struct TransactionView {
    session: WalletSession,
    relay: Arc<dyn RelayApi>,
    wallet: Option<Arc<dyn WalletProvider>>,
    contract: Address,
    method: String,
    state: ViewState,
    recipient: String,
    amount: String,
    logs: Vec<ChainEvent>,
    transaction_info: Option<TransactionResult>,
    alert: Option<Alert>,
    events: Option<Box<dyn EventInbox>>,
}

impl TransactionView {
    /// Creates a view.
    ///
    /// Starts connected if the session says the wallet was connected.
    #[must_use]
    pub fn new(
        session: WalletSession,
        relay: Arc<dyn RelayApi>,
        wallet: Option<Arc<dyn WalletProvider>>,
        contract: Address,
        method: impl Into<String>,
    ) -> Self {
        let state = if session.is_connected() {
            ViewState::WalletConnected
        } else {
            ViewState::WalletDisconnected
        };

        Self {
            session,
            relay,
            wallet,
            contract,
            method: method.into(),
            state,
            recipient: String::new(),
            amount: String::new(),
            logs: Vec::new(),
            transaction_info: None,
            alert: None,
            events: None,
        }
    }

    /// Attaches the inbox whose events feed [`Self::drain_events`], usually
    /// an [`EventFeed`](super::feed::EventFeed) on the relay's channel.
    #[must_use]
    pub fn with_events(mut self, events: impl EventInbox + 'static) -> Self {
        self.events = Some(Box::new(events));
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Returns the received events, oldest first.
    #[must_use]
    pub fn logs(&self) -> &[ChainEvent] {
        &self.logs
    }

    /// Returns the last successful relay result.
    #[must_use]
    pub fn transaction_info(&self) -> Option<&TransactionResult> {
        self.transaction_info.as_ref()
    }

    /// Returns the alert if it has not expired.
    #[must_use]
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref().filter(|a| a.is_visible())
    }

    /// Hides the current alert.
    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Sets the recipient field.
    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.recipient = recipient.into();
    }

    /// Sets the amount field.
    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
    }

    /// Renders the last relay result as display lines.
    #[must_use]
    pub fn summary(&self) -> Option<Vec<String>> {
        self.transaction_info.as_ref().map(|info| {
            vec![
                format!("To address: {}", shorten_hash(info.recipient())),
                format!("Total: {} ETH", info.amount()),
                format!("Tax(gas): {} units", info.gas_used()),
                format!("Cost(gas): {} ETH", info.gas_cost()),
                format!("Hash: {}", shorten_hash(info.tx_hash())),
            ]
        })
    }

    // ------------------------------------------------------------------------
    // Wallet connection
    // ------------------------------------------------------------------------

    /// Connects the wallet.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ProviderUnavailable` without a wallet provider,
    /// or the provider's error if it refuses to share accounts.
    pub async fn connect(&mut self) -> ClientResult<()> {
        let Some(wallet) = self.wallet.clone() else {
            self.raise(PROVIDER_MISSING, AlertKind::Failure);
            return Err(ClientError::ProviderUnavailable);
        };

        wallet.request_accounts().await?;
        self.session.mark_connected();
        self.state = ViewState::WalletConnected;
        info!("Wallet connected");
        Ok(())
    }

    /// Disconnects the wallet, keeping logs and the last result.
    pub fn disconnect(&mut self) {
        self.session.mark_disconnected();
        self.state = ViewState::WalletDisconnected;
        info!("Wallet disconnected");
    }

    /// Reacts to the wallet reporting a new account list.
    pub fn accounts_changed(&mut self, accounts: &[Address]) {
        if accounts.is_empty() {
            self.disconnect();
        } else if self.session.is_connected() && self.state == ViewState::WalletDisconnected {
            self.state = ViewState::WalletConnected;
        }
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Submits the form through the relay.
    ///
    /// The relay validates the fields; nothing is checked locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet is not connected, a submission is in
    /// flight, or the relay fails.
    pub async fn submit_via_relay(&mut self) -> ClientResult<()> {
        self.begin_submission()?;

        let request = TransactionRequest::new(self.recipient.clone(), self.amount.clone());
        let outcome = self.relay.send_ether(&request).await;
        self.state = ViewState::Idle;

        match outcome {
            Ok(result) => {
                info!(tx_hash = %result.tx_hash(), "Relay transaction successful");
                self.transaction_info = Some(result);
                self.raise(TRANSACTION_SUCCESSFUL, AlertKind::Success);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Relay transaction failed");
                self.raise(RELAY_FAILED, AlertKind::Failure);
                Err(e)
            }
        }
    }

    /// Submits the form through the wallet provider, bypassing the relay.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for empty fields, without calling
    /// the wallet. Returns an error if no provider is available or the
    /// wallet fails.
    pub async fn submit_via_wallet(&mut self) -> ClientResult<()> {
        let request = TransactionRequest::new(self.recipient.clone(), self.amount.clone());
        if let Err(e) = request.validate() {
            self.raise(FIELDS_REQUIRED, AlertKind::Failure);
            return Err(ClientError::Validation(e.to_string()));
        }
        let Some(wallet) = self.wallet.clone() else {
            self.raise(PROVIDER_MISSING, AlertKind::Failure);
            return Err(ClientError::ProviderUnavailable);
        };

        self.begin_submission()?;
        let outcome = self.send_with_wallet(wallet.as_ref(), &request).await;
        self.state = ViewState::Idle;

        match outcome {
            Ok(()) => {
                self.raise(TRANSACTION_SUCCESSFUL, AlertKind::Success);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Wallet transaction failed");
                self.raise(TRANSACTION_FAILED, AlertKind::Failure);
                Err(e)
            }
        }
    }

    async fn send_with_wallet(
        &self,
        wallet: &dyn WalletProvider,
        request: &TransactionRequest,
    ) -> ClientResult<()> {
        let from = wallet
            .request_accounts()
            .await?
            .first()
            .copied()
            .ok_or_else(|| ClientError::wallet("wallet has no accounts"))?;
        let recipient = request
            .recipient_address()
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        let amount = request
            .ether_amount()
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let call = ContractCall::new(self.contract, self.method.as_str(), from)
            .arg(Token::Address(recipient))
            .value(amount.wei());
        let tx_hash = wallet.send_transaction(call).await?;
        info!(tx_hash = ?tx_hash, "Wallet transaction successful");
        Ok(())
    }

    fn begin_submission(&mut self) -> ClientResult<()> {
        match self.state {
            ViewState::WalletDisconnected => Err(ClientError::NotConnected),
            ViewState::Submitting => Err(ClientError::Busy),
            ViewState::WalletConnected | ViewState::Idle => {
                self.state = ViewState::Submitting;
                Ok(())
            }
        }
    }

    fn raise(&mut self, message: &str, kind: AlertKind) {
        self.alert = Some(Alert::new(message, kind));
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Appends a received event to the logs.
    pub fn receive_event(&mut self, event: ChainEvent) {
        self.logs.push(event);
    }

    /// Moves every queued event from the attached inbox into the
    /// logs. Returns how many were added.
    pub fn drain_events(&mut self) -> usize {
        let Some(events) = self.events.as_mut() else {
            return 0;
        };

        let before = self.logs.len();
        while let Some(event) = events.try_next() {
            self.logs.push(event);
        }
        self.logs.len() - before
    }
}
