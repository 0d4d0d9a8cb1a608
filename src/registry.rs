//! The module registry: ordered rate groups and deferred wiring.
//!
//! Modules are registered into named rate groups; each group carries one
//! update period and preserves registration order, which is the execution
//! order at every due step (caller-controlled, never re-sorted).
//!
//! Wiring intent (`declare_output` / `declare_input`) is recorded here and
//! resolved against the bus in one shot at [`ModuleRegistry::finalize`]. That
//! makes the write-before-read guarantee a structural property: every input
//! is known to have exactly one producer before the first step runs.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::bus::MessageBus;
use crate::error::{SimError, SimResult};
use crate::module::SimModule;
use crate::types::{ChannelId, SimTime};

/// Opaque handle to a registered module, used to declare its wiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleHandle(usize);

/// A named execution cadence and its member modules.
#[derive(Debug)]
pub struct RateGroup {
    name: String,
    period: SimTime,
    /// Member module indices in registration order
    members: Vec<usize>,
}

impl RateGroup {
    /// The group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The group's update period in nanoseconds.
    pub fn period(&self) -> SimTime {
        self.period
    }

    /// Number of member modules.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

struct Entry {
    module: Box<dyn SimModule>,
    tag: String,
    outputs: Vec<ChannelId>,
    inputs: Vec<ChannelId>,
}

/// Ordered collection of simulation modules grouped by update rate.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<Entry>,
    groups: Vec<RateGroup>,
    group_index: HashMap<String, usize>,
    frozen: bool,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `module` to the rate group `group`, creating the group with
    /// `period` on first use.
    ///
    /// If the group already exists the passed period is ignored (a mismatch
    /// is logged). Fails with [`SimError::RegistryFrozen`] after `finalize`.
    pub fn register(
        &mut self,
        module: Box<dyn SimModule>,
        group: &str,
        period: SimTime,
    ) -> SimResult<ModuleHandle> {
        if self.frozen {
            return Err(SimError::RegistryFrozen);
        }

        let gidx = match self.group_index.get(group) {
            Some(&idx) => {
                if self.groups[idx].period != period {
                    warn!(
                        group,
                        existing = self.groups[idx].period,
                        requested = period,
                        "rate group already exists with a different period, keeping existing"
                    );
                }
                idx
            }
            None => {
                let idx = self.groups.len();
                self.groups.push(RateGroup {
                    name: group.to_string(),
                    period,
                    members: Vec::new(),
                });
                self.group_index.insert(group.to_string(), idx);
                idx
            }
        };

        let tag = module.tag().to_string();
        debug!(module = %tag, group, "registering module");

        let midx = self.entries.len();
        self.entries.push(Entry {
            module,
            tag,
            outputs: Vec::new(),
            inputs: Vec::new(),
        });
        self.groups[gidx].members.push(midx);
        Ok(ModuleHandle(midx))
    }

    /// Records that the module will publish `channel`.
    pub fn declare_output(&mut self, handle: ModuleHandle, channel: &str) -> SimResult<()> {
        if self.frozen {
            return Err(SimError::RegistryFrozen);
        }
        self.entries[handle.0].outputs.push(channel.to_string());
        Ok(())
    }

    /// Records that the module will read `channel`.
    pub fn declare_input(&mut self, handle: ModuleHandle, channel: &str) -> SimResult<()> {
        if self.frozen {
            return Err(SimError::RegistryFrozen);
        }
        self.entries[handle.0].inputs.push(channel.to_string());
        Ok(())
    }

    /// Resolves all recorded wiring against `bus` and locks registration.
    ///
    /// Verifies, in order: every rate-group period is nonzero, every output
    /// channel has exactly one producer, and every input channel has a
    /// producer among the registered modules. Any violation is reported
    /// before stepping can begin; on success the registry is frozen.
    pub fn finalize(&mut self, bus: &mut MessageBus) -> SimResult<()> {
        if self.frozen {
            return Err(SimError::RegistryFrozen);
        }

        for group in &self.groups {
            if group.period == 0 {
                return Err(SimError::InvalidPeriod(group.name.clone()));
            }
        }

        // Ownership first, so dangling checks see the full producer set.
        for entry in &self.entries {
            for channel in &entry.outputs {
                bus.declare(channel, &entry.tag)?;
            }
        }

        for entry in &self.entries {
            for channel in &entry.inputs {
                if !bus.is_declared(channel) {
                    return Err(SimError::DanglingSubscription {
                        module: entry.tag.clone(),
                        channel: channel.clone(),
                    });
                }
                bus.subscribe(&entry.tag, channel)?;
            }
        }

        debug!(
            modules = self.entries.len(),
            groups = self.groups.len(),
            channels = bus.len(),
            "registry finalized"
        );
        self.frozen = true;
        Ok(())
    }

    /// Returns true once `finalize` has run.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The registered rate groups, in creation order.
    pub fn groups(&self) -> &[RateGroup] {
        &self.groups
    }

    /// Looks up a rate group index by name.
    pub fn group_by_name(&self, name: &str) -> Option<usize> {
        self.group_index.get(name).copied()
    }

    /// Group indices sorted fastest period first, creation order breaking
    /// ties. This is the evaluation order when several groups are due at the
    /// same global tick.
    pub fn schedule_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.groups.len()).collect();
        order.sort_by_key(|&i| self.groups[i].period);
        order
    }

    /// Number of registered modules.
    pub fn module_count(&self) -> usize {
        self.entries.len()
    }

    /// Tag of the module behind `handle`.
    pub fn tag(&self, handle: ModuleHandle) -> &str {
        &self.entries[handle.0].tag
    }

    /// Runs every module's one-time setup, in registration order.
    ///
    /// The first failure aborts with [`SimError::ModuleSetup`].
    pub(crate) fn setup_all(&mut self) -> SimResult<()> {
        for entry in &mut self.entries {
            entry.module.setup().map_err(|source| SimError::ModuleSetup {
                module: entry.tag.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Steps every member of group `gidx` at `time`, in registration order.
    pub(crate) fn step_group(
        &mut self,
        gidx: usize,
        time: SimTime,
        bus: &mut MessageBus,
    ) -> SimResult<()> {
        // Indices are cloned so entries can be borrowed mutably one by one.
        let members = self.groups[gidx].members.clone();
        for midx in members {
            let entry = &mut self.entries[midx];
            entry
                .module
                .step(time, bus)
                .map_err(|source| SimError::ModuleStep {
                    module: entry.tag.clone(),
                    time,
                    source,
                })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.entries.iter().map(|e| &e.tag).collect::<Vec<_>>())
            .field("groups", &self.groups)
            .field("frozen", &self.frozen)
            .finish()
    }
}
