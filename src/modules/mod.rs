//! Built-in module implementations.
//!
//! The real physics and sensor models of a scenario are external
//! collaborators; the modules here provide simple, predictable behaviors
//! used by the test suites and the demo scenario.

pub mod mock;

pub use mock::{
    CountingProducer, FailAfter, LastValueConsumer, ScalingConsumer, StatePublisher, TimeProducer,
};
