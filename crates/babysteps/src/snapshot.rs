//! Snapshot serializer.
//!
//! Converts a [`Snapshot`] to and from the single JSON document stored in the
//! main record. Reading is tolerant: collections may be missing, `null`, or
//! contain elements from an older schema, and only a missing or malformed
//! `profile` rejects the document.

use tracing::warn;

use crate::error::{Error, Result};
use crate::model::Snapshot;

/// Serialize a snapshot into its stored JSON form.
///
/// # Errors
///
/// Returns [`Error::Json`] if serialization fails, which only happens for
/// non-finite floats.
pub fn serialize(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Parse a stored JSON document into a snapshot.
///
/// # Errors
///
/// Returns [`Error::Deserialize`] if the text is not a JSON object or the
/// `profile` is missing or malformed.
pub fn deserialize(text: &str) -> Result<Snapshot> {
    serde_json::from_str(text).map_err(Error::Deserialize)
}

pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::warn;

    /// Deserialize a sequence, treating `null` as empty and dropping elements
    /// that fail to parse.
    pub(crate) fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
        let raw = raw.unwrap_or_default();
        let total = raw.len();

        let items: Vec<T> = raw
            .into_iter()
            .filter_map(|value| {
                serde_json::from_value(value)
                    .map_err(|e| warn!("Dropping unreadable {}: {e}", short_type::<T>()))
                    .ok()
            })
            .collect();

        if items.len() < total {
            warn!(
                "Recovered {} of {} {} records",
                items.len(),
                total,
                short_type::<T>()
            );
        }
        Ok(items)
    }

    fn short_type<T>() -> &'static str {
        let full = std::any::type_name::<T>();
        full.rsplit("::").next().unwrap_or(full)
    }
}
