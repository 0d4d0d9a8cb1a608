//! The module trait implemented by every simulation behavior.
//!
//! A module is a unit of behavior with a declared rate group, a one-time
//! `setup` call, and a `step` operation that may read channels and publish to
//! its own output channels. Modules are opaque to the scheduler: it knows
//! only how to set them up and step them, in registration order, at their
//! group's cadence. Any physics or sensor model satisfying this trait can be
//! composed without scheduler changes.

use crate::bus::MessageBus;
use crate::error::ModuleError;
use crate::types::SimTime;

/// The capability interface between the scheduler and module behaviors.
///
/// # Example
///
/// ```
/// use aerocap::bus::MessageBus;
/// use aerocap::error::ModuleError;
/// use aerocap::message::MsgPayload;
/// use aerocap::module::SimModule;
/// use aerocap::types::{nanos_to_sec, SimTime};
///
/// /// Publishes the current simulated time in seconds.
/// struct Clock;
///
/// impl SimModule for Clock {
///     fn tag(&self) -> &str {
///         "clock"
///     }
///
///     fn step(&mut self, time: SimTime, bus: &mut MessageBus) -> Result<(), ModuleError> {
///         bus.publish("clock_out", MsgPayload::Scalar(nanos_to_sec(time)), time)?;
///         Ok(())
///     }
/// }
/// ```
pub trait SimModule: Send {
    /// Identity tag used for diagnostics, channel ownership, and recorder
    /// naming. Must be stable for the lifetime of the module.
    fn tag(&self) -> &str;

    /// One-time initialization, called after wiring and before the first
    /// step. A module may allocate buffers or compute derived constants
    /// here. A returned error aborts the whole simulation; a misconfigured
    /// model cannot safely continue.
    fn setup(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Advances the module to `time`.
    ///
    /// The module may read any channel it subscribed to and must publish its
    /// output channels before returning, so that downstream modules stepping
    /// later in the same tick observe the current value.
    fn step(&mut self, time: SimTime, bus: &mut MessageBus) -> Result<(), ModuleError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MsgPayload;

    struct TickCounter {
        steps: u64,
    }

    impl SimModule for TickCounter {
        fn tag(&self) -> &str {
            "tick_counter"
        }

        fn setup(&mut self) -> Result<(), ModuleError> {
            self.steps = 0;
            Ok(())
        }

        fn step(&mut self, time: SimTime, bus: &mut MessageBus) -> Result<(), ModuleError> {
            self.steps += 1;
            bus.publish("ticks", MsgPayload::Scalar(self.steps as f64), time)?;
            Ok(())
        }
    }

    #[test]
    fn test_module_trait_object() {
        let mut bus = MessageBus::new();
        bus.declare("ticks", "tick_counter").unwrap();

        let mut module: Box<dyn SimModule> = Box::new(TickCounter { steps: 3 });
        module.setup().unwrap();
        module.step(0, &mut bus).unwrap();
        module.step(10, &mut bus).unwrap();

        assert_eq!(module.tag(), "tick_counter");
        let msg = bus.read("ticks").unwrap();
        assert_eq!(msg.payload.as_scalar(), Some(2.0));
        assert_eq!(msg.time, 10);
    }
}
