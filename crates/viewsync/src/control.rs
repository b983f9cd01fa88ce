//! The control capability contract.

use anyhow::Result;
use serde_json::Value;

use crate::config::Config;

/// One unit of UI, implementing any subset of the three capabilities.
///
/// Every method has a no-op default, so the capability set a control carries
/// is exactly the set of methods it overrides. A control overriding nothing
/// is visited but does nothing on every dispatch pass.
pub trait Control<S> {
    /// One-time setup, run once before the first dispatch pass. Side effects
    /// only (wiring event sources, reading configured templates).
    fn init(&mut self, store: &S, config: &Config) -> Result<()> {
        let _ = (store, config);
        Ok(())
    }

    /// The slice of state this control depends on.
    ///
    /// Returning `Some` declares interest: the dispatcher fingerprints the
    /// slice on every pass and calls [`Control::update`] only when it changed
    /// since last delivered. Returning `None` (the default) means the control
    /// has no shard and `update` runs unconditionally. Must be a cheap, pure
    /// read; it executes on every pass whether or not anything changed.
    fn shard(&self, store: &S) -> Result<Option<Value>> {
        let _ = store;
        Ok(None)
    }

    /// React to a change with all visible side effects (rendering).
    ///
    /// Receives the freshly computed slice when [`Control::shard`] declared
    /// interest, `None` otherwise. State is read-only here by construction.
    fn update(&mut self, store: &S, shard: Option<&Value>) -> Result<()> {
        let _ = (store, shard);
        Ok(())
    }
}
