//! # Chain Events
//!
//! Contract events as relayed to real-time subscribers.
//!
//! A [`ChainEvent`] pairs the event name with the payload exactly as the
//! chain provider delivered it. The payload is kept as raw JSON so that it
//! is forwarded byte-for-byte; no schema is imposed on it.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;

/// A contract event with its verbatim JSON payload.
#[derive(Clone, Serialize, Deserialize)]
pub struct ChainEvent {
    name: String,
    payload: Box<RawValue>,
}

impl ChainEvent {
    /// Creates an event from an already-serialized JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a single valid JSON value.
    pub fn from_json(name: impl Into<String>, json: impl Into<String>) -> serde_json::Result<Self> {
        Ok(Self {
            name: name.into(),
            payload: RawValue::from_string(json.into())?,
        })
    }

    /// Creates an event by serializing a provider record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized.
    pub fn from_record<T: Serialize>(name: impl Into<String>, record: &T) -> serde_json::Result<Self> {
        Ok(Self {
            name: name.into(),
            payload: serde_json::value::to_raw_value(record)?,
        })
    }

    /// Returns the event name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &RawValue {
        &self.payload
    }

    /// Returns the payload text exactly as received.
    #[inline]
    #[must_use]
    pub fn payload_json(&self) -> &str {
        self.payload.get()
    }
}

impl fmt::Debug for ChainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainEvent")
            .field("name", &self.name)
            .field("payload", &self.payload.get())
            .finish()
    }
}

impl PartialEq for ChainEvent {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.payload.get() == other.payload.get()
    }
}

impl Eq for ChainEvent {}
