//! # Aerocap Simulation Core
//!
//! A deterministic multi-rate scheduling and publish-subscribe
//! message-exchange core for spacecraft atmospheric-entry (aerocapture)
//! simulation.
//!
//! ## Design Principles
//!
//! - **Multi-Rate Composition**: independently authored physics and sensor
//!   modules run at module-appropriate update rates, grouped into named
//!   rate groups on a single global timeline.
//! - **Latest-Value Message Bus**: modules exchange state through typed,
//!   single-writer/multi-reader channels; a consumer always observes the
//!   producer's most recent value at or before its own step.
//! - **Structural Wiring**: channel ownership and subscriptions are resolved
//!   once, before any stepping, so the write-before-read guarantee is a
//!   property of the wiring rather than an execution-order accident.
//! - **No Ambient State**: each run owns its clock, registry, and bus;
//!   runs with identical configuration are bit-identical.
//!
//! ## Quick Start
//!
//! ```rust
//! use aerocap::modules::mock::{TimeProducer, ScalingConsumer};
//! use aerocap::{Scheduler, sec_to_nanos};
//!
//! let mut sim = Scheduler::new();
//!
//! // Two modules in one 1 Hz rate group, wired producer -> consumer.
//! let p = sim
//!     .register(Box::new(TimeProducer::new("producer", "raw")), "main", sec_to_nanos(1.0))
//!     .unwrap();
//! let c = sim
//!     .register(
//!         Box::new(ScalingConsumer::new("consumer", "raw", "doubled", 2.0)),
//!         "main",
//!         sec_to_nanos(1.0),
//!     )
//!     .unwrap();
//! sim.declare_output(p, "raw").unwrap();
//! sim.declare_input(c, "raw").unwrap();
//! sim.declare_output(c, "doubled").unwrap();
//! sim.attach_recorder("doubled", "main").unwrap();
//!
//! sim.finalize().unwrap();
//! sim.initialize().unwrap();
//! sim.run(sec_to_nanos(4.0)).unwrap();
//!
//! let series = sim.series("doubled").unwrap();
//! assert_eq!(series.len(), 5); // t = 0, 1, 2, 3, 4 s
//! ```
//!
//! ## Scenario Configuration
//!
//! ```rust
//! use aerocap::config::earth_aerocapture;
//! use aerocap::orbit::spherical_to_cartesian;
//!
//! let scenario = earth_aerocapture();
//! let (pos, vel) = spherical_to_cartesian(&scenario.initial_state);
//! assert!(pos.norm() > scenario.body.equatorial_radius());
//! assert!(vel.norm() > 0.0);
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod message;
pub mod module;
pub mod modules;
pub mod orbit;
pub mod recorder;
pub mod registry;
pub mod scheduler;
pub mod types;

// Re-export commonly used types
pub use bus::MessageBus;
pub use config::{AtmosphereTable, CentralBody, ConfigError, ConfigResult, ScenarioConfig};
pub use error::{ModuleError, SimError, SimResult};
pub use message::{Message, MsgPayload};
pub use module::SimModule;
pub use orbit::{cartesian_to_spherical, spherical_to_cartesian, SphericalState};
pub use recorder::{RecordedSeries, Recorder};
pub use registry::{ModuleHandle, ModuleRegistry, RateGroup};
pub use scheduler::{Scheduler, SchedulerState, SchedulerStats};
pub use types::{nanos_to_sec, sec_to_nanos, ChannelId, SimTime};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// aerocap::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
