//! Unidirectional state synchronization: one owned state value, a registry of
//! controls, and a dispatcher that fingerprints state slices to decide which
//! controls need re-rendering.

pub mod config;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod fingerprint;
pub mod store;

pub use config::Config;
pub use control::Control;
pub use dispatch::{Dispatcher, FaultPolicy, PassReport};
pub use error::{ConfigError, ControlFailure, DispatchError, FingerprintError, Stage};
pub use fingerprint::{fingerprint_str, fingerprint_value, Fingerprint, Fingerprintable};
pub use store::Store;
