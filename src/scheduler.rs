//! The rate-group scheduler: deterministic multi-rate stepping.
//!
//! The scheduler is the top-level coordinator. It owns the bus, the module
//! registry, and the recorders, and advances a single global clock in fixed
//! increments from zero to a configured stop time. Each run owns its own
//! clock and bus; there is no ambient or global simulation state.
//!
//! # Lifecycle
//!
//! ```text
//! Unwired --finalize()--> Wired --initialize()--> Running --run()/error--> Stopped
//! ```
//!
//! Modules are registered while `Unwired`; `finalize` resolves all channel
//! wiring and freezes registration; `initialize` runs every module's
//! one-time setup; `step`/`run` advance simulated time. After `Stopped`,
//! only recorded results and final channel states may be inspected.
//!
//! # Ordering rule
//!
//! The global period is the GCD of all rate-group periods, so every group's
//! due times land exactly on global ticks. When several groups are due at
//! the same tick they are evaluated fastest period first, each group's
//! modules in registration order, and every module publishes before the next
//! one steps. A slower group reading a faster group's output therefore
//! observes the value from the current tick; a faster group reading a slower
//! group's output observes the most recent (possibly several ticks old)
//! published value. That is the intended multi-rate semantics: a 1 Hz
//! attitude filter sees the current 100 Hz rate-sensor summary, while a
//! 100 Hz sensor model sees a 40 Hz dynamics state that updates less often.
//!
//! # Example
//!
//! ```
//! use aerocap::modules::mock::{CountingProducer, ScalingConsumer};
//! use aerocap::scheduler::Scheduler;
//! use aerocap::types::sec_to_nanos;
//!
//! let mut sim = Scheduler::new();
//! let p = sim
//!     .register(Box::new(CountingProducer::new("producer", "count")), "main", sec_to_nanos(1.0))
//!     .unwrap();
//! sim.declare_output(p, "count").unwrap();
//! sim.attach_recorder("count", "main").unwrap();
//!
//! sim.finalize().unwrap();
//! sim.initialize().unwrap();
//! sim.run(sec_to_nanos(4.0)).unwrap();
//!
//! // Steps at t = 0, 1, 2, 3, 4 s.
//! assert_eq!(sim.series("count").unwrap().len(), 5);
//! ```

use tracing::{debug, error, info};

use crate::bus::MessageBus;
use crate::error::{SimError, SimResult};
use crate::message::Message;
use crate::module::SimModule;
use crate::recorder::{Recorder, RecordedSeries};
use crate::registry::{ModuleHandle, ModuleRegistry, RateGroup};
use crate::types::{gcd, ChannelId, SimTime};

/// Lifecycle state of a scheduler instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Modules may be registered and wiring declared.
    Unwired,
    /// Wiring is resolved; awaiting one-time module setup.
    Wired,
    /// Stepping is in progress.
    Running,
    /// The run ended (stop time reached or fatal error); results only.
    Stopped,
}

impl SchedulerState {
    fn name(self) -> &'static str {
        match self {
            SchedulerState::Unwired => "Unwired",
            SchedulerState::Wired => "Wired",
            SchedulerState::Running => "Running",
            SchedulerState::Stopped => "Stopped",
        }
    }
}

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchedulerStats {
    /// Global ticks executed
    pub ticks_executed: u64,
    /// Rate-group activations (a group stepping all its members once)
    pub group_activations: u64,
}

/// Multi-rate scheduler owning the bus, registry, recorders, and clock.
pub struct Scheduler {
    registry: ModuleRegistry,
    bus: MessageBus,
    recorders: Vec<Recorder>,
    /// Recorder attachments made before finalize: (channel, group name)
    pending_recorders: Vec<(ChannelId, String)>,
    /// Group indices, fastest period first; fixed at finalize
    schedule: Vec<usize>,
    /// GCD of all group periods; fixed at finalize
    global_period: SimTime,
    clock: SimTime,
    state: SchedulerState,
    stats: SchedulerStats,
}

impl Scheduler {
    /// Creates an empty scheduler in the `Unwired` state with its clock at
    /// zero.
    pub fn new() -> Self {
        Self {
            registry: ModuleRegistry::new(),
            bus: MessageBus::new(),
            recorders: Vec::new(),
            pending_recorders: Vec::new(),
            schedule: Vec::new(),
            global_period: 0,
            clock: 0,
            state: SchedulerState::Unwired,
            stats: SchedulerStats::default(),
        }
    }

    /// Registers `module` into rate group `group`, creating the group with
    /// `period` nanoseconds on first use.
    pub fn register(
        &mut self,
        module: Box<dyn SimModule>,
        group: &str,
        period: SimTime,
    ) -> SimResult<ModuleHandle> {
        self.registry.register(module, group, period)
    }

    /// Declares that the module behind `handle` publishes `channel`.
    pub fn declare_output(&mut self, handle: ModuleHandle, channel: &str) -> SimResult<()> {
        self.registry.declare_output(handle, channel)
    }

    /// Declares that the module behind `handle` reads `channel`.
    pub fn declare_input(&mut self, handle: ModuleHandle, channel: &str) -> SimResult<()> {
        self.registry.declare_input(handle, channel)
    }

    /// Attaches a recorder to `channel` at the cadence of rate group
    /// `group`. Allowed while `Unwired` or `Wired`; the channel itself is
    /// validated once wiring is known.
    pub fn attach_recorder(&mut self, channel: &str, group: &str) -> SimResult<()> {
        match self.state {
            SchedulerState::Unwired => {
                // Group and channel may not exist yet; resolved at finalize.
                self.pending_recorders
                    .push((channel.to_string(), group.to_string()));
                Ok(())
            }
            SchedulerState::Wired => {
                let gidx = self
                    .registry
                    .group_by_name(group)
                    .ok_or_else(|| SimError::UnknownRateGroup(group.to_string()))?;
                if !self.bus.is_declared(channel) {
                    return Err(SimError::UnknownChannel(channel.to_string()));
                }
                self.recorders.push(Recorder::new(channel, gidx));
                Ok(())
            }
            SchedulerState::Stopped => Err(SimError::SimulationStopped),
            _ => Err(SimError::InvalidState {
                op: "attach_recorder",
                state: self.state.name(),
            }),
        }
    }

    /// Resolves wiring and transitions `Unwired -> Wired`.
    ///
    /// Fails on any configuration error (zero period, duplicate channel
    /// ownership, dangling subscription, recorder on an unknown channel or
    /// group) before any stepping occurs.
    pub fn finalize(&mut self) -> SimResult<()> {
        match self.state {
            SchedulerState::Unwired => {}
            SchedulerState::Stopped => return Err(SimError::SimulationStopped),
            _ => {
                return Err(SimError::InvalidState {
                    op: "finalize",
                    state: self.state.name(),
                })
            }
        }

        // An empty registry would leave the global period at zero and the
        // clock unable to advance.
        if self.registry.module_count() == 0 {
            return Err(SimError::EmptyRegistry);
        }

        self.registry.finalize(&mut self.bus)?;

        for (channel, group) in std::mem::take(&mut self.pending_recorders) {
            let gidx = self
                .registry
                .group_by_name(&group)
                .ok_or_else(|| SimError::UnknownRateGroup(group.clone()))?;
            if !self.bus.is_declared(&channel) {
                return Err(SimError::UnknownChannel(channel));
            }
            self.recorders.push(Recorder::new(&channel, gidx));
        }

        self.schedule = self.registry.schedule_order();
        self.global_period = self
            .registry
            .groups()
            .iter()
            .map(RateGroup::period)
            .fold(0, gcd);

        info!(
            groups = self.registry.groups().len(),
            modules = self.registry.module_count(),
            global_period = self.global_period,
            "wiring resolved"
        );
        self.state = SchedulerState::Wired;
        Ok(())
    }

    /// Runs every module's one-time setup and transitions
    /// `Wired -> Running`. The first setup failure aborts the whole
    /// simulation; a misconfigured physical model invalidates all results.
    pub fn initialize(&mut self) -> SimResult<()> {
        match self.state {
            SchedulerState::Wired => {}
            SchedulerState::Stopped => return Err(SimError::SimulationStopped),
            _ => {
                return Err(SimError::InvalidState {
                    op: "initialize",
                    state: self.state.name(),
                })
            }
        }

        if let Err(err) = self.registry.setup_all() {
            error!(%err, "module setup failed, aborting");
            self.state = SchedulerState::Stopped;
            return Err(err);
        }

        self.bus.seal();
        self.state = SchedulerState::Running;
        Ok(())
    }

    /// Executes one global tick: steps every rate group due at the current
    /// clock (fastest period first), samples its recorders, then advances
    /// the clock by the global period.
    ///
    /// A module step error stops the run at the current simulated time;
    /// everything recorded so far stays inspectable.
    pub fn step(&mut self) -> SimResult<()> {
        match self.state {
            SchedulerState::Running => {}
            SchedulerState::Stopped => return Err(SimError::SimulationStopped),
            _ => {
                return Err(SimError::InvalidState {
                    op: "step",
                    state: self.state.name(),
                })
            }
        }

        let now = self.clock;
        for &gidx in &self.schedule {
            let period = self.registry.groups()[gidx].period();
            if now % period != 0 {
                continue;
            }

            if let Err(err) = self.registry.step_group(gidx, now, &mut self.bus) {
                error!(%err, time = now, "module step failed, stopping run");
                self.state = SchedulerState::Stopped;
                return Err(err);
            }
            self.stats.group_activations += 1;

            for rec in self.recorders.iter_mut().filter(|r| r.group() == gidx) {
                rec.sample(now, &self.bus);
            }
        }

        self.clock = now + self.global_period;
        self.stats.ticks_executed += 1;
        Ok(())
    }

    /// Steps until the clock passes `stop_time`, then transitions to
    /// `Stopped`.
    ///
    /// Every group executes at t = 0 and the tick landing exactly on
    /// `stop_time` is included, so a group with period p runs
    /// `stop_time / p + 1` times over the run.
    pub fn run(&mut self, stop_time: SimTime) -> SimResult<()> {
        if self.state != SchedulerState::Running {
            return match self.state {
                SchedulerState::Stopped => Err(SimError::SimulationStopped),
                _ => Err(SimError::InvalidState {
                    op: "run",
                    state: self.state.name(),
                }),
            };
        }

        while self.clock <= stop_time {
            self.step()?;
        }

        debug!(
            final_time = self.clock,
            ticks = self.stats.ticks_executed,
            "run complete"
        );
        self.state = SchedulerState::Stopped;
        Ok(())
    }

    /// Current simulated time (the time of the next tick to execute).
    pub fn current_time(&self) -> SimTime {
        self.clock
    }

    /// The lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// The global stepping period (GCD of group periods); zero before
    /// finalize.
    pub fn global_period(&self) -> SimTime {
        self.global_period
    }

    /// Run counters.
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// The recorded series for `channel`, if a recorder was attached to it.
    ///
    /// When several recorders watch the same channel at different cadences
    /// this returns the one attached first; use [`Scheduler::all_series`] to
    /// reach the rest.
    pub fn series(&self, channel: &str) -> Option<&RecordedSeries> {
        self.recorders
            .iter()
            .find(|r| r.series().channel() == channel)
            .map(Recorder::series)
    }

    /// All recorded series.
    pub fn all_series(&self) -> impl Iterator<Item = &RecordedSeries> {
        self.recorders.iter().map(Recorder::series)
    }

    /// Reads the most recent message on `channel`. Valid in every state;
    /// inspection of results is allowed even after `Stopped`.
    pub fn read(&self, channel: &str) -> SimResult<&Message> {
        self.bus.read(channel)
    }

    /// Snapshot of every channel's final message, sorted by channel name.
    pub fn final_states(&self) -> Vec<(ChannelId, Message)> {
        self.bus.final_states()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
