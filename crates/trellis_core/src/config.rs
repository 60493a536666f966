//! # Store Configuration
//!
//! Parameters for a [`LayoutDataStore`](crate::LayoutDataStore), loaded once at
//! startup from TOML or built in code.
//!
//! ```toml
//! label = "panel-layout"
//! initial_capacity = 256
//! chunk_bytes = 32768
//! growth_numerator = 3
//! growth_denominator = 2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::memory::{CHUNK_ALIGN, DEFAULT_CHUNK_BYTES};

/// Configuration for a layout data store.
///
/// All values are validated at construction and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Allocator tag. Attached to every log event emitted by the store.
    pub label: String,
    /// Number of slots backed by storage at construction.
    pub initial_capacity: u32,
    /// Size of every chunk in bytes. Must be a non-zero multiple of the chunk alignment.
    pub chunk_bytes: usize,
    /// Growth factor numerator (capacity grows by `numerator / denominator`).
    pub growth_numerator: u32,
    /// Growth factor denominator.
    pub growth_denominator: u32,
}

impl StoreConfig {
    /// Default allocator tag.
    pub const DEFAULT_LABEL: &'static str = "layout";

    /// Default initial capacity in slots.
    pub const DEFAULT_INITIAL_CAPACITY: u32 = 64;

    /// Creates a config with the given initial capacity and defaults elsewhere.
    #[must_use]
    pub fn with_capacity(initial_capacity: u32) -> Self {
        Self {
            initial_capacity,
            ..Self::default()
        }
    }

    /// Sets the allocator tag.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the chunk size in bytes.
    #[must_use]
    pub fn chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the document does not parse or
    /// fails [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> StoreResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConfigIo`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_toml_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| StoreError::ConfigIo(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Serializes the config to a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::InvalidConfig(e.to_string()))
    }

    /// Checks every value for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] naming the first offending value.
    pub fn validate(&self) -> StoreResult<()> {
        if self.chunk_bytes == 0 || self.chunk_bytes % CHUNK_ALIGN != 0 {
            return Err(StoreError::InvalidConfig(format!(
                "chunk_bytes must be a non-zero multiple of {CHUNK_ALIGN}, got {}",
                self.chunk_bytes
            )));
        }
        if self.growth_denominator == 0 || self.growth_numerator <= self.growth_denominator {
            return Err(StoreError::InvalidConfig(format!(
                "growth factor must exceed 1, got {}/{}",
                self.growth_numerator, self.growth_denominator
            )));
        }
        if self.initial_capacity == u32::MAX {
            return Err(StoreError::InvalidConfig(
                "initial_capacity must be below u32::MAX".to_owned(),
            ));
        }
        Ok(())
    }

    /// Capacity after one growth step from `capacity`.
    ///
    /// Always at least `capacity + 1`, never reaching `u32::MAX` (the free-list
    /// sentinel).
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is already at the addressable maximum.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn grown_capacity(&self, capacity: u32) -> u32 {
        assert!(
            capacity < u32::MAX - 1,
            "layout data store '{}' cannot grow past {capacity} slots",
            self.label
        );
        let scaled = u64::from(capacity) * u64::from(self.growth_numerator)
            / u64::from(self.growth_denominator);
        let limit = u64::from(u32::MAX - 1);
        // Bounded by `limit`, which fits in u32.
        scaled.max(u64::from(capacity) + 1).min(limit) as u32
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            label: Self::DEFAULT_LABEL.to_owned(),
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            growth_numerator: 3,
            growth_denominator: 2,
        }
    }
}
