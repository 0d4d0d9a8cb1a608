//! The message bus: typed, single-writer/multi-reader channels.
//!
//! The bus is a collection of overwrite-in-place slots, not a queue. It
//! models latest-value broadcast: `publish` replaces the channel's current
//! message and `read` returns the most recent one. Exactly one module owns
//! each channel as its writer; any number of modules may subscribe as
//! readers.
//!
//! All access is sequential within a step (see the scheduler), so no locking
//! is involved. The only discipline is the wiring-phase one: channel
//! ownership and subscriptions must be settled before stepping begins, after
//! which the bus is sealed and further subscriptions are rejected.
//!
//! # Example
//!
//! ```
//! use aerocap::bus::MessageBus;
//! use aerocap::message::MsgPayload;
//!
//! let mut bus = MessageBus::new();
//! bus.declare("atmo_density", "atmosphere").unwrap();
//! bus.subscribe("drag", "atmo_density").unwrap();
//!
//! bus.publish("atmo_density", MsgPayload::Scalar(1.2e-4), 0).unwrap();
//! let msg = bus.read("atmo_density").unwrap();
//! assert_eq!(msg.payload.as_scalar(), Some(1.2e-4));
//! ```

use std::collections::HashMap;

use crate::error::{SimError, SimResult};
use crate::message::{Message, MsgPayload};
use crate::types::{ChannelId, SimTime};

/// A single broadcast slot.
#[derive(Debug, Default)]
struct Slot {
    /// Tag of the module that declared this channel as its output
    owner: String,
    /// Tags of modules registered as readers
    readers: Vec<String>,
    /// Most recently published message, `None` before first publish
    latest: Option<Message>,
}

/// Latest-value broadcast bus connecting module outputs to module inputs.
#[derive(Debug, Default)]
pub struct MessageBus {
    slots: HashMap<ChannelId, Slot>,
    /// Set when stepping begins; subscriptions are rejected afterwards
    sealed: bool,
}

impl MessageBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `channel` with `owner` as its single writer.
    ///
    /// Fails with [`SimError::ChannelOwnership`] if another module already
    /// owns the channel.
    pub fn declare(&mut self, channel: &str, owner: &str) -> SimResult<()> {
        if let Some(slot) = self.slots.get(channel) {
            return Err(SimError::ChannelOwnership {
                channel: channel.to_string(),
                owner: slot.owner.clone(),
                claimant: owner.to_string(),
            });
        }
        self.slots.insert(
            channel.to_string(),
            Slot {
                owner: owner.to_string(),
                readers: Vec::new(),
                latest: None,
            },
        );
        Ok(())
    }

    /// Registers `reader` as a consumer of `channel`.
    ///
    /// Must happen during the wiring phase; once the bus is sealed this
    /// fails with [`SimError::LateSubscription`].
    pub fn subscribe(&mut self, reader: &str, channel: &str) -> SimResult<()> {
        if self.sealed {
            return Err(SimError::LateSubscription {
                module: reader.to_string(),
                channel: channel.to_string(),
            });
        }
        let slot = self
            .slots
            .get_mut(channel)
            .ok_or_else(|| SimError::UnknownChannel(channel.to_string()))?;
        slot.readers.push(reader.to_string());
        Ok(())
    }

    /// Overwrites the channel's current value.
    pub fn publish(&mut self, channel: &str, payload: MsgPayload, time: SimTime) -> SimResult<()> {
        let slot = self
            .slots
            .get_mut(channel)
            .ok_or_else(|| SimError::UnknownChannel(channel.to_string()))?;
        slot.latest = Some(Message::new(time, payload));
        Ok(())
    }

    /// Returns the most recently published message on `channel`.
    ///
    /// Fails with [`SimError::UnsetChannel`] if nothing was ever published.
    pub fn read(&self, channel: &str) -> SimResult<&Message> {
        let slot = self
            .slots
            .get(channel)
            .ok_or_else(|| SimError::UnknownChannel(channel.to_string()))?;
        slot.latest
            .as_ref()
            .ok_or_else(|| SimError::UnsetChannel(channel.to_string()))
    }

    /// Ends the wiring phase. Subscriptions made after this point fail.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Returns true if the wiring phase has ended.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns true if `channel` has been declared.
    pub fn is_declared(&self, channel: &str) -> bool {
        self.slots.contains_key(channel)
    }

    /// Returns the owner tag of `channel`, if declared.
    pub fn owner(&self, channel: &str) -> Option<&str> {
        self.slots.get(channel).map(|s| s.owner.as_str())
    }

    /// Returns the reader tags subscribed to `channel`.
    pub fn readers(&self, channel: &str) -> &[String] {
        self.slots
            .get(channel)
            .map(|s| s.readers.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates over declared channel names.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelId> {
        self.slots.keys()
    }

    /// Number of declared channels.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no channels are declared.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Snapshot of every channel's latest message, in channel-name order.
    ///
    /// Used to compare final states across runs; channels that were never
    /// published are omitted.
    pub fn final_states(&self) -> Vec<(ChannelId, Message)> {
        let mut out: Vec<_> = self
            .slots
            .iter()
            .filter_map(|(name, slot)| slot.latest.clone().map(|m| (name.clone(), m)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
