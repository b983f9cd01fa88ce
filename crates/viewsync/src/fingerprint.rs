//! Change-detection fingerprints over serialized state slices.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::FingerprintError;

/// Compact summary of a serialized state slice, used purely to detect whether
/// the slice changed between dispatch passes. Deterministic and cheap, not
/// cryptographic: distinct values may collide, and values that serialize
/// identically (including map key order) always share a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(i32);

impl Fingerprint {
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const SEED: i32 = -1;

/// Running hash over the UTF-16 code units of `text`: at every step
/// `hash = (hash << 5) - hash + unit`, truncated to 32-bit signed. The empty
/// string maps to the seed unchanged.
pub fn fingerprint_str(text: &str) -> Fingerprint {
    let mut hash = SEED;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    Fingerprint(hash)
}

/// Fingerprint a JSON value. The value is wrapped in a single-field envelope
/// before serialization so that `null` and other empty-ish slices still hash
/// over non-empty text.
pub fn fingerprint_value(value: &Value) -> Fingerprint {
    let envelope = serde_json::json!({ "v": value });
    // Serializing a `Value` cannot fail; keys are always strings.
    let text =
        serde_json::to_string(&envelope).unwrap_or_else(|_| String::from("{\"v\":null}"));
    fingerprint_str(&text)
}

/// Cheap approximate equality over serialized form.
///
/// Equal values always produce equal fingerprints. The converse does not
/// hold: two semantically different values whose serializations coincide
/// compare as unchanged. That limitation is part of the contract.
pub trait Fingerprintable {
    fn fingerprint(&self) -> Result<Fingerprint, FingerprintError>;
}

impl<T: Serialize> Fingerprintable for T {
    fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        #[derive(Serialize)]
        struct Envelope<'a, T> {
            v: &'a T,
        }
        let text = serde_json::to_string(&Envelope { v: self })?;
        Ok(fingerprint_str(&text))
    }
}
