//! Data Provider Interfaces
//!
//! The engine never talks to a database. Callers hand it two providers:
//! one for equipment design records, one for inspection-extracted data.
//! `InMemoryProvider` implements both and can be loaded from a JSON dataset,
//! which is what the CLI and the integration tests use.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::types::{EquipmentData, ExtractedRBIData};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Equipment not found: {0}")]
    NotFound(String),

    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Supplies equipment identity and design attributes.
pub trait EquipmentDataProvider: Send + Sync {
    /// Fails with `ProviderError::NotFound` for an unknown id.
    fn get(&self, equipment_id: &str) -> Result<EquipmentData, ProviderError>;
}

/// Supplies inspection-extracted data.
pub trait ExtractedDataProvider: Send + Sync {
    /// May return a largely empty structure; that is not an error.
    fn get(&self, equipment_id: &str) -> Result<ExtractedRBIData, ProviderError>;
}

// ============================================================================
// In-Memory Provider
// ============================================================================

/// Serialized form of a provider's contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub equipment: Vec<EquipmentData>,
    #[serde(default)]
    pub extracted: Vec<ExtractedRBIData>,
}

/// Map-backed provider for both data sources.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    equipment: HashMap<String, EquipmentData>,
    extracted: HashMap<String, ExtractedRBIData>,
    /// Equipment ids in insertion order
    order: Vec<String>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let mut provider = Self::new();
        for eq in dataset.equipment {
            provider.insert_equipment(eq);
        }
        for ex in dataset.extracted {
            provider.insert_extracted(ex);
        }
        provider
    }

    /// Load a JSON dataset file: `{"equipment": [...], "extracted": [...]}`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let dataset: Dataset = serde_json::from_str(&contents)?;
        info!(
            path = %path.as_ref().display(),
            equipment = dataset.equipment.len(),
            extracted = dataset.extracted.len(),
            "Loaded equipment dataset"
        );
        Ok(Self::from_dataset(dataset))
    }

    /// Insert or replace an equipment record.
    pub fn insert_equipment(&mut self, equipment: EquipmentData) {
        if !self.equipment.contains_key(&equipment.equipment_id) {
            self.order.push(equipment.equipment_id.clone());
        }
        self.equipment.insert(equipment.equipment_id.clone(), equipment);
    }

    /// Insert or replace extracted inspection data.
    pub fn insert_extracted(&mut self, extracted: ExtractedRBIData) {
        self.extracted.insert(extracted.equipment_id.clone(), extracted);
    }

    /// Known equipment ids, in insertion order.
    pub fn equipment_ids(&self) -> &[String] {
        &self.order
    }
}

impl EquipmentDataProvider for InMemoryProvider {
    fn get(&self, equipment_id: &str) -> Result<EquipmentData, ProviderError> {
        self.equipment
            .get(equipment_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(equipment_id.to_string()))
    }
}

impl ExtractedDataProvider for InMemoryProvider {
    fn get(&self, equipment_id: &str) -> Result<ExtractedRBIData, ProviderError> {
        match self.extracted.get(equipment_id) {
            Some(data) => Ok(data.clone()),
            None => {
                debug!(equipment_id, "No extracted data on record, using empty set");
                Ok(ExtractedRBIData::empty(equipment_id))
            }
        }
    }
}
