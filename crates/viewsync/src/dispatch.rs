//! Dispatcher: iterates registered controls and re-renders the changed ones.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::control::Control;
use crate::error::{ControlFailure, DispatchError, Stage};
use crate::fingerprint::{fingerprint_value, Fingerprint};

/// What to do when a control capability fails mid-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Stop the pass at the first failure and return it as an error. Later
    /// controls in registry order are not visited on that pass.
    #[default]
    AbortPass,
    /// Log the failure, record it in the pass report, and keep going.
    Isolate,
}

/// Outcome of one dispatch pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Controls whose `update` capability ran this pass, in registry order.
    pub updated: Vec<String>,
    /// Sharded controls skipped because their slice was unchanged.
    pub unchanged: Vec<String>,
    /// Failures collected under [`FaultPolicy::Isolate`].
    pub failures: Vec<ControlFailure>,
}

struct Registered<S> {
    control: Box<dyn Control<S>>,
    /// Fingerprint of the most recently delivered slice. `None` until the
    /// control has been delivered one.
    last_seen: Option<Fingerprint>,
}

enum Visit {
    Updated,
    Unchanged,
}

/// Owns the control registry and drives dispatch passes over it.
///
/// Controls are visited in registration order. A control is never invoked
/// twice in one pass.
pub struct Dispatcher<S> {
    controls: IndexMap<String, Registered<S>>,
    config: Config,
    policy: FaultPolicy,
    initialized: bool,
}

impl<S> Dispatcher<S> {
    pub fn new(config: Config) -> Self {
        Self {
            controls: IndexMap::new(),
            config,
            policy: FaultPolicy::default(),
            initialized: false,
        }
    }

    pub fn with_policy(mut self, policy: FaultPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Register a control under `name`. Names are unique; registration order
    /// is dispatch order.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        control: Box<dyn Control<S>>,
    ) -> Result<(), DispatchError> {
        let name = name.into();
        if self.controls.contains_key(&name) {
            return Err(DispatchError::DuplicateControl { name });
        }
        self.controls.insert(
            name,
            Registered {
                control,
                last_seen: None,
            },
        );
        Ok(())
    }

    /// Run every control's `init` in registry order, then one full dispatch
    /// pass so all controls render their initial state. Must be called
    /// exactly once; a second call fails with `AlreadyInitialized`.
    pub fn initialize(&mut self, store: &S) -> Result<PassReport, DispatchError> {
        if self.initialized {
            return Err(DispatchError::AlreadyInitialized);
        }
        let policy = self.policy;
        let mut init_failures = Vec::new();
        for (name, entry) in &mut self.controls {
            if let Err(source) = entry.control.init(store, &self.config) {
                let failure = ControlFailure {
                    control: name.clone(),
                    stage: Stage::Init,
                    source,
                };
                match policy {
                    FaultPolicy::AbortPass => return Err(failure.into()),
                    FaultPolicy::Isolate => {
                        warn!(control = %failure.control, error = %failure.source, "control init failed");
                        init_failures.push(failure);
                    }
                }
            }
        }
        self.initialized = true;
        info!(controls = self.controls.len(), "dispatcher initialized");

        let mut report = self.update(store)?;
        if !init_failures.is_empty() {
            init_failures.append(&mut report.failures);
            report.failures = init_failures;
        }
        Ok(report)
    }

    /// One dispatch pass: visit every control in registry order, re-render
    /// the ones whose slice changed, and the shard-less ones unconditionally.
    pub fn update(&mut self, store: &S) -> Result<PassReport, DispatchError> {
        if !self.initialized {
            return Err(DispatchError::NotInitialized);
        }
        let policy = self.policy;
        let mut report = PassReport::default();
        for (name, entry) in &mut self.controls {
            match Self::visit(name, entry, store) {
                Ok(Visit::Updated) => report.updated.push(name.clone()),
                Ok(Visit::Unchanged) => report.unchanged.push(name.clone()),
                Err(failure) => match policy {
                    FaultPolicy::AbortPass => return Err(failure.into()),
                    FaultPolicy::Isolate => {
                        warn!(
                            control = %failure.control,
                            stage = %failure.stage,
                            error = %failure.source,
                            "control failed; pass continues"
                        );
                        report.failures.push(failure);
                    }
                },
            }
        }
        Ok(report)
    }

    fn visit(
        name: &str,
        entry: &mut Registered<S>,
        store: &S,
    ) -> Result<Visit, ControlFailure> {
        let slice = entry
            .control
            .shard(store)
            .map_err(|source| ControlFailure {
                control: name.to_string(),
                stage: Stage::Shard,
                source,
            })?;

        let Some(slice) = slice else {
            // No shard capability: update runs on every pass.
            entry
                .control
                .update(store, None)
                .map_err(|source| ControlFailure {
                    control: name.to_string(),
                    stage: Stage::Update,
                    source,
                })?;
            return Ok(Visit::Updated);
        };

        let next = fingerprint_value(&slice);
        if entry.last_seen == Some(next) {
            debug!(control = name, fingerprint = %next, "slice unchanged");
            return Ok(Visit::Unchanged);
        }

        // The cache is written before dispatching, so it always reflects the
        // most recently delivered slice even when the delivery itself fails.
        entry.last_seen = Some(next);
        debug!(control = name, fingerprint = %next, "slice changed");
        entry
            .control
            .update(store, Some(&slice))
            .map_err(|source| ControlFailure {
                control: name.to_string(),
                stage: Stage::Update,
                source,
            })?;
        Ok(Visit::Updated)
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
