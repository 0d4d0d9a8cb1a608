//! Core type definitions for the simulation core.
//!
//! This module defines the fundamental types used throughout the crate.

/// Simulated time in nanoseconds.
///
/// All rate-group periods, module step times, and recorder timestamps share
/// this representation, giving every rate group an exact position on a single
/// global timeline with no floating-point drift.
pub type SimTime = u64;

/// Identifies a message channel on the bus.
///
/// Channels are named after the data they carry (e.g. `"sc_states"`,
/// `"imu_meas"`), mirroring how producers label their output messages.
pub type ChannelId = String;

/// Nanoseconds per second, for period and stop-time conversions.
pub const NANOS_PER_SEC: f64 = 1.0e9;

/// Converts seconds to simulated nanoseconds, rounding to the nearest tick.
#[inline]
pub fn sec_to_nanos(seconds: f64) -> SimTime {
    (seconds * NANOS_PER_SEC).round() as SimTime
}

/// Converts simulated nanoseconds back to seconds.
#[inline]
pub fn nanos_to_sec(nanos: SimTime) -> f64 {
    nanos as f64 / NANOS_PER_SEC
}

/// Greatest common divisor of two times (Euclid).
///
/// The scheduler steps the global clock by the GCD of all rate-group
/// periods, so every group's due times land exactly on global ticks.
pub fn gcd(a: SimTime, b: SimTime) -> SimTime {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}
