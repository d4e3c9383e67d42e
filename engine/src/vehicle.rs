use serde::{Deserialize, Serialize};

/// Position of a record in the loaded catalog.
pub type VehicleIndex = usize;

/// One catalog row. After normalization the four numeric fields hold values in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub model_name: String,
    pub price: f64,
    pub mileage: f64,
    pub seating: f64,
    pub engine_cc: f64,
    pub engine_type: String,
    pub features: String,
    pub body_type: String,
}

/// User preferences, all in the catalog's original units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceQuery {
    pub budget: f64,
    pub seating: u32,
    pub min_mileage: f64,
    /// Substring matched case-insensitively; empty or "any" matches every record.
    #[serde(default)]
    pub engine_type: String,
}

impl PreferenceQuery {
    pub fn new(budget: f64, seating: u32, min_mileage: f64, engine_type: impl Into<String>) -> Self {
        Self { budget, seating, min_mileage, engine_type: engine_type.into() }
    }

    /// Lowercased engine filter, or `None` when every engine type is accepted.
    pub fn engine_filter(&self) -> Option<String> {
        let needle = self.engine_type.trim();
        if needle.is_empty() || needle.eq_ignore_ascii_case("any") {
            None
        } else {
            Some(needle.to_lowercase())
        }
    }
}
