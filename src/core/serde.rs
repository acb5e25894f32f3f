/*!
 * Serde Helpers
 * Skip predicates and field adapters shared by serializable kernel types
 */

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;

/// Skip serializing if value equals its default
#[inline]
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    value == &T::default()
}

/// Skip serializing if value is zero
#[inline]
pub fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

/// Skip serializing if value is false
#[inline]
pub const fn is_false(value: &bool) -> bool {
    !*value
}

/// Serialize PathBuf as string
pub mod pathbuf_string {
    use super::*;

    pub fn serialize<S>(path: &PathBuf, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        path.to_string_lossy().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(PathBuf::from(s))
    }
}
