//! Recorders: append-only time series sampled from bus channels.
//!
//! A recorder is attached to one channel and one rate group. At every due
//! step of that group, after the group's modules have published, it appends
//! `(time, message)` to its series. Recording is strictly observation: it
//! never mutates a channel or influences module execution, and attaching or
//! removing recorders must not change simulation results.

use std::io::Write;

use serde::Serialize;

use crate::bus::MessageBus;
use crate::message::Message;
use crate::types::{ChannelId, SimTime};

/// An immutable, time-ordered sequence of recorded messages.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RecordedSeries {
    channel: ChannelId,
    entries: Vec<(SimTime, Message)>,
}

impl RecordedSeries {
    fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            entries: Vec::new(),
        }
    }

    /// The recorded channel's name.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The recorded `(timestamp, message)` pairs, in time order.
    pub fn entries(&self) -> &[(SimTime, Message)] {
        &self.entries
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent recorded sample.
    pub fn last(&self) -> Option<&(SimTime, Message)> {
        self.entries.last()
    }

    /// Timestamps in seconds, one per sample.
    pub fn times_sec(&self) -> Vec<f64> {
        self.entries
            .iter()
            .map(|(t, _)| crate::types::nanos_to_sec(*t))
            .collect()
    }

    /// Writes the series as CSV: one row per sample, the timestamp in
    /// nanoseconds followed by the flattened payload components.
    pub fn to_csv<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for (time, msg) in &self.entries {
            write!(out, "{}", time)?;
            for value in msg.payload.components() {
                write!(out, ",{}", value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Samples one channel at the cadence of one rate group.
#[derive(Debug)]
pub struct Recorder {
    series: RecordedSeries,
    /// Index of the rate group this recorder follows
    group: usize,
}

impl Recorder {
    /// Creates a recorder for `channel`, tied to rate group index `group`.
    pub(crate) fn new(channel: &str, group: usize) -> Self {
        Self {
            series: RecordedSeries::new(channel),
            group,
        }
    }

    /// The rate group index this recorder follows.
    pub(crate) fn group(&self) -> usize {
        self.group
    }

    /// Appends the channel's current value at `time`.
    ///
    /// A channel whose producer lives in a slower group that has not yet run
    /// has no value at t = 0; such reads are skipped rather than recorded.
    pub(crate) fn sample(&mut self, time: SimTime, bus: &MessageBus) {
        if let Ok(msg) = bus.read(&self.series.channel) {
            self.series.entries.push((time, msg.clone()));
        }
    }

    /// The accumulated series.
    pub fn series(&self) -> &RecordedSeries {
        &self.series
    }
}
