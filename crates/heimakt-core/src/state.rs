//! Zustandsschlüssel für die Policy-Tabelle.
//!
//! Ein [`StateKey`] wird deterministisch aus dem Intent-Label und optionalen
//! Kontextfeldern abgeleitet. Identische (Intent, Kontext)-Paare ergeben
//! immer denselben Schlüssel, auch über Prozessneustarts hinweg — das ist
//! Voraussetzung für den Persistenz-Roundtrip der gelernten Tabelle.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Canonical key for one policy-table state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    /// Derive the key from an intent label and optional context fields.
    ///
    /// Context entries are folded in sorted key order (the map is a
    /// `BTreeMap`, so insertion order never leaks into the key). Only
    /// string, integer and boolean values participate; other JSON values
    /// are skipped.
    pub fn derive(intent: &str, context: Option<&BTreeMap<String, Value>>) -> Self {
        let mut key = format!("intent_{intent}");

        if let Some(ctx) = context {
            let mut parts: Vec<String> = Vec::new();
            for (k, v) in ctx {
                match v {
                    Value::String(s) => parts.push(format!("{k}={s}")),
                    Value::Bool(b) => parts.push(format!("{k}={b}")),
                    Value::Number(n) if n.is_i64() || n.is_u64() => {
                        parts.push(format!("{k}={n}"));
                    }
                    _ => {}
                }
            }
            if !parts.is_empty() {
                let digest = fnv1a(parts.join("_").as_bytes());
                let hex = format!("{digest:016x}");
                key.push_str("_ctx_");
                key.push_str(&hex[..8]);
            }
        }

        StateKey(key)
    }

    /// Wrap an already-derived key, e.g. when reconstructing from storage.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        StateKey(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// FNV-1a with the standard 64-bit offset basis and prime. Hand-rolled so the
// digest is identical across platforms, builds and std releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
