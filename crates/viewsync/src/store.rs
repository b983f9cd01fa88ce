//! Owned state store and the action entry point.

use crate::dispatch::{Dispatcher, PassReport};
use crate::error::DispatchError;

/// Owns the single live state value and the dispatcher that reacts to it.
///
/// All mutation goes through [`Store::apply`]; everything else reads through
/// [`Store::state`]. Controls can never mutate state: their capabilities only
/// ever see `&S`.
pub struct Store<S> {
    state: S,
    dispatcher: Dispatcher<S>,
}

impl<S> Store<S> {
    pub fn new(state: S, dispatcher: Dispatcher<S>) -> Self {
        Self { state, dispatcher }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    /// Run control setup and the first full dispatch pass. Call exactly once
    /// before any action.
    pub fn initialize(&mut self) -> Result<PassReport, DispatchError> {
        self.dispatcher.initialize(&self.state)
    }

    /// Run a business action against the state, then one dispatch pass.
    /// Returns the action's value alongside the pass report.
    pub fn apply<R>(
        &mut self,
        action: impl FnOnce(&mut S) -> R,
    ) -> Result<(R, PassReport), DispatchError> {
        let value = action(&mut self.state);
        let report = self.dispatcher.update(&self.state)?;
        Ok((value, report))
    }

    /// A dispatch pass with no mutation.
    pub fn refresh(&mut self) -> Result<PassReport, DispatchError> {
        self.dispatcher.update(&self.state)
    }

    pub fn into_state(self) -> S {
        self.state
    }
}
