//! Capacity limits and book configuration.
//!
//! Slot indices are a single byte. With 255 reserved for [`NPOS`], at most
//! 254 slots exist, i.e. 127 levels per side.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BookError, Result};

/// Type alias for arena indices and side positions.
pub type SlotIndex = u8;

/// Sentinel for "no such position" / "operation declined".
pub const NPOS: SlotIndex = SlotIndex::MAX;

/// Maximum number of levels on each side.
pub const MAX_CAPACITY: SlotIndex = 127;

/// Maximum number of arena slots (both sides together).
pub const MAX_SLOTS: usize = MAX_CAPACITY as usize * 2;

const _: () = assert!(MAX_SLOTS < NPOS as usize, "NPOS must never be a valid slot");
const _: () = assert!(NPOS.wrapping_add(1) == 0);

/// What to do when a requested capacity is outside `0..=127`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    /// Fail construction with [`BookError::BadCapacity`]
    #[default]
    Strict,
    /// Never fail; an invalid capacity becomes 0
    Clamp,
}

/// Check a requested capacity and convert it to the stored width.
///
/// In [`CapacityMode::Clamp`] an invalid request yields `Ok(0)`: a book
/// that is permanently both full and empty.
pub fn validate_capacity(requested: i64, mode: CapacityMode) -> Result<SlotIndex> {
    match SlotIndex::try_from(requested) {
        Ok(capacity) if capacity <= MAX_CAPACITY => {
            debug!(capacity, ?mode, "book capacity accepted");
            Ok(capacity)
        }
        _ => match mode {
            CapacityMode::Strict => Err(BookError::BadCapacity(requested)),
            CapacityMode::Clamp => {
                warn!(requested, "invalid book capacity, clamping to zero");
                Ok(0)
            }
        },
    }
}

/// Book configuration, loadable from JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Levels per side
    pub capacity: i64,
    /// Handling of an out-of-range capacity
    pub mode: CapacityMode,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            mode: CapacityMode::Strict,
        }
    }
}

impl BookConfig {
    /// Config with the given capacity and strict validation
    pub fn with_capacity(capacity: i64) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Validated capacity (see [`validate_capacity`])
    pub fn validate(&self) -> Result<SlotIndex> {
        validate_capacity(self.capacity, self.mode)
    }

    /// Number of entries each backing table needs for this config
    pub fn table_len(&self) -> Result<usize> {
        Ok(self.validate()? as usize * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_capacities() {
        for c in 0..=127i64 {
            assert_eq!(validate_capacity(c, CapacityMode::Strict), Ok(c as u8));
            assert_eq!(validate_capacity(c, CapacityMode::Clamp), Ok(c as u8));
        }
    }

    #[test]
    fn test_invalid_capacities() {
        let bad = [
            128,
            129,
            253,
            254,
            255,
            256,
            1000,
            i32::MAX as i64,
            i64::MAX,
            -1,
            -127,
            -128,
            -255,
            i32::MIN as i64,
            i64::MIN,
        ];
        for c in bad {
            assert_eq!(
                validate_capacity(c, CapacityMode::Strict),
                Err(BookError::BadCapacity(c))
            );
            assert_eq!(validate_capacity(c, CapacityMode::Clamp), Ok(0));
        }
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: BookConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BookConfig::default());
        assert_eq!(config.validate(), Ok(10));
        assert_eq!(config.table_len(), Ok(20));

        let config: BookConfig =
            serde_json::from_str(r#"{"capacity": 500, "mode": "clamp"}"#).unwrap();
        assert_eq!(config.mode, CapacityMode::Clamp);
        assert_eq!(config.validate(), Ok(0));

        let config = BookConfig::with_capacity(-3);
        assert_eq!(config.validate(), Err(BookError::BadCapacity(-3)));
    }
}
