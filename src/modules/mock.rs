//! Mock module implementations for testing.
//!
//! These modules provide simple, predictable behaviors useful for verifying
//! scheduling order, wiring, and recording without real physics attached.

use nalgebra::Vector3;

use crate::bus::MessageBus;
use crate::error::ModuleError;
use crate::message::MsgPayload;
use crate::module::SimModule;
use crate::types::{nanos_to_sec, SimTime};

/// Publishes how many times it has stepped: 1 on its first step, 2 on its
/// second, and so on.
#[derive(Debug)]
pub struct CountingProducer {
    tag: String,
    channel: String,
    count: u64,
}

impl CountingProducer {
    /// Creates a counting producer publishing to `channel`.
    pub fn new(tag: &str, channel: &str) -> Self {
        Self {
            tag: tag.to_string(),
            channel: channel.to_string(),
            count: 0,
        }
    }
}

impl SimModule for CountingProducer {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn setup(&mut self) -> Result<(), ModuleError> {
        self.count = 0;
        Ok(())
    }

    fn step(&mut self, time: SimTime, bus: &mut MessageBus) -> Result<(), ModuleError> {
        self.count += 1;
        bus.publish(&self.channel, MsgPayload::Scalar(self.count as f64), time)?;
        Ok(())
    }
}

/// Publishes the current simulated time in seconds.
#[derive(Debug)]
pub struct TimeProducer {
    tag: String,
    channel: String,
}

impl TimeProducer {
    /// Creates a time producer publishing to `channel`.
    pub fn new(tag: &str, channel: &str) -> Self {
        Self {
            tag: tag.to_string(),
            channel: channel.to_string(),
        }
    }
}

impl SimModule for TimeProducer {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn step(&mut self, time: SimTime, bus: &mut MessageBus) -> Result<(), ModuleError> {
        bus.publish(&self.channel, MsgPayload::Scalar(nanos_to_sec(time)), time)?;
        Ok(())
    }
}

/// Reads a scalar input and republishes it scaled by a constant factor.
#[derive(Debug)]
pub struct ScalingConsumer {
    tag: String,
    input: String,
    output: String,
    factor: f64,
}

impl ScalingConsumer {
    /// Creates a consumer reading `input` and publishing
    /// `factor * value` to `output`.
    pub fn new(tag: &str, input: &str, output: &str, factor: f64) -> Self {
        Self {
            tag: tag.to_string(),
            input: input.to_string(),
            output: output.to_string(),
            factor,
        }
    }
}

impl SimModule for ScalingConsumer {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn step(&mut self, time: SimTime, bus: &mut MessageBus) -> Result<(), ModuleError> {
        let value = bus
            .read(&self.input)?
            .payload
            .as_scalar()
            .ok_or_else(|| format!("channel {} does not carry a scalar", self.input))?;
        bus.publish(&self.output, MsgPayload::Scalar(self.factor * value), time)?;
        Ok(())
    }
}

/// Reads a scalar input and republishes the value it observed, making a
/// consumer's view of an upstream channel recordable.
#[derive(Debug)]
pub struct LastValueConsumer {
    tag: String,
    input: String,
    output: String,
}

impl LastValueConsumer {
    /// Creates a consumer mirroring `input` onto `output`.
    pub fn new(tag: &str, input: &str, output: &str) -> Self {
        Self {
            tag: tag.to_string(),
            input: input.to_string(),
            output: output.to_string(),
        }
    }
}

impl SimModule for LastValueConsumer {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn step(&mut self, time: SimTime, bus: &mut MessageBus) -> Result<(), ModuleError> {
        let observed = bus.read(&self.input)?.payload.clone();
        bus.publish(&self.output, observed, time)?;
        Ok(())
    }
}

/// Publishes a fixed position/velocity state every step.
///
/// Stands in for a dynamics model when only the message flow is under test.
#[derive(Debug)]
pub struct StatePublisher {
    tag: String,
    channel: String,
    pos: Vector3<f64>,
    vel: Vector3<f64>,
}

impl StatePublisher {
    /// Creates a publisher of the given constant state.
    pub fn new(tag: &str, channel: &str, pos: Vector3<f64>, vel: Vector3<f64>) -> Self {
        Self {
            tag: tag.to_string(),
            channel: channel.to_string(),
            pos,
            vel,
        }
    }
}

impl SimModule for StatePublisher {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn step(&mut self, time: SimTime, bus: &mut MessageBus) -> Result<(), ModuleError> {
        bus.publish(
            &self.channel,
            MsgPayload::State {
                pos: self.pos,
                vel: self.vel,
            },
            time,
        )?;
        Ok(())
    }
}

/// Fails on a chosen step (or during setup), for error-path testing.
#[derive(Debug)]
pub struct FailAfter {
    tag: String,
    channel: String,
    fail_on_step: u64,
    fail_in_setup: bool,
    steps: u64,
}

impl FailAfter {
    /// Creates a module that errors on its `fail_on_step`-th step
    /// (zero-based), publishing its step count until then.
    pub fn new(tag: &str, channel: &str, fail_on_step: u64) -> Self {
        Self {
            tag: tag.to_string(),
            channel: channel.to_string(),
            fail_on_step,
            fail_in_setup: false,
            steps: 0,
        }
    }

    /// Makes the module fail during `setup` instead.
    pub fn fail_setup(mut self) -> Self {
        self.fail_in_setup = true;
        self
    }
}

impl SimModule for FailAfter {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn setup(&mut self) -> Result<(), ModuleError> {
        if self.fail_in_setup {
            return Err("deliberate setup failure".into());
        }
        self.steps = 0;
        Ok(())
    }

    fn step(&mut self, time: SimTime, bus: &mut MessageBus) -> Result<(), ModuleError> {
        if self.steps == self.fail_on_step {
            return Err(format!("deliberate failure on step {}", self.steps).into());
        }
        bus.publish(&self.channel, MsgPayload::Scalar(self.steps as f64), time)?;
        self.steps += 1;
        Ok(())
    }
}
