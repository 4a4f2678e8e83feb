//! Verified bearer-token payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the claim carrying the application permission list.
pub const PERMISSIONS_CLAIM: &str = "permissions";

/// The decoded claim set of a token whose signature and standard claims
/// have already been checked.
///
/// Kept as an open map so provider-specific claims (`azp`, `gty`, ...)
/// survive untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(pub Map<String, Value>);

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The `sub` claim, if present and a string.
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// The permission list in token order.
    ///
    /// Returns `None` when the claim is absent. Non-string entries are
    /// skipped; a non-array value yields an empty list.
    pub fn permissions(&self) -> Option<Vec<&str>> {
        let value = self.get(PERMISSIONS_CLAIM)?;
        Some(
            value
                .as_array()
                .map(|items| items.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default(),
        )
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
