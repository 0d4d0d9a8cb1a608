//! Error taxonomy for the simulation core.
//!
//! Four families of failures exist, none of which is retried:
//!
//! - **Configuration errors** (unknown channel, duplicate channel ownership,
//!   dangling subscription, zero rate period) are detected when the registry
//!   is finalized, before any stepping.
//! - **Setup errors** reported by a module during one-time initialization are
//!   fatal and abort the whole run.
//! - **Runtime step errors** terminate the run at the current simulated time;
//!   recorder data captured up to that point stays inspectable.
//! - **Usage errors** (stepping a stopped scheduler, registering after the
//!   wiring phase) are programmer errors and are reported immediately.

use thiserror::Error;

use crate::types::{ChannelId, SimTime};

/// Error type carried by module `setup`/`step` implementations.
///
/// Modules are externally authored; the scheduler treats their failures as
/// opaque and wraps them with the module tag and simulated time.
pub type ModuleError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by the bus, registry, scheduler, and recorder.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("unknown channel: {0}")]
    UnknownChannel(ChannelId),

    #[error("channel {0} read before its first publish")]
    UnsetChannel(ChannelId),

    #[error("channel {channel} already owned by module {owner}, rejected claim by {claimant}")]
    ChannelOwnership {
        channel: ChannelId,
        owner: String,
        claimant: String,
    },

    #[error("module {module} subscribes to channel {channel} which no module produces")]
    DanglingSubscription {
        module: String,
        channel: ChannelId,
    },

    #[error("subscription of {module} to channel {channel} after the wiring phase")]
    LateSubscription {
        module: String,
        channel: ChannelId,
    },

    #[error("registry is frozen, no further registration accepted")]
    RegistryFrozen,

    #[error("no modules registered, nothing to schedule")]
    EmptyRegistry,

    #[error("unknown rate group: {0}")]
    UnknownRateGroup(String),

    #[error("rate group {0} has a zero period")]
    InvalidPeriod(String),

    #[error("{op} is not valid in the {state} state")]
    InvalidState {
        op: &'static str,
        state: &'static str,
    },

    #[error("simulation is stopped")]
    SimulationStopped,

    #[error("module {module} failed during setup")]
    ModuleSetup {
        module: String,
        #[source]
        source: ModuleError,
    },

    #[error("module {module} failed at t = {time} ns")]
    ModuleStep {
        module: String,
        time: SimTime,
        #[source]
        source: ModuleError,
    },
}

/// Result type for simulation core operations.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::UnknownChannel("sc_states".to_string());
        assert_eq!(err.to_string(), "unknown channel: sc_states");

        let err = SimError::InvalidState {
            op: "step",
            state: "Unwired",
        };
        assert!(err.to_string().contains("step"));
        assert!(err.to_string().contains("Unwired"));
    }

    #[test]
    fn test_module_error_source_preserved() {
        use std::error::Error;

        let inner: ModuleError = "density table exhausted".into();
        let err = SimError::ModuleStep {
            module: "atmosphere".to_string(),
            time: 250_000_000,
            source: inner,
        };
        assert!(err.source().is_some());
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("density table exhausted".to_string())
        );
    }
}
