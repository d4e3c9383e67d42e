use crate::recommend::Recommendation;
use crate::VehicleRecord;
use serde::{Deserialize, Serialize};

/// Display multipliers applied to normalized values.
pub const PRICE_FACTOR: f64 = 50.0;
pub const MILEAGE_FACTOR: f64 = 30.0;
pub const SEATING_FACTOR: f64 = 10.0;

/// Human-readable vehicle for presentation clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleView {
    pub index: Option<usize>,
    pub model_name: String,
    pub price: f64,
    pub mileage: f64,
    pub seating: u32,
    pub engine_type: String,
    pub features: String,
    pub body_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl VehicleView {
    pub fn from_record(record: &VehicleRecord) -> Self {
        Self {
            index: None,
            model_name: record.model_name.clone(),
            price: record.price * PRICE_FACTOR,
            mileage: record.mileage * MILEAGE_FACTOR,
            seating: (record.seating * SEATING_FACTOR).round().max(0.0) as u32,
            engine_type: record.engine_type.clone(),
            features: record.features.clone(),
            body_type: record.body_type.clone(),
            score: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl From<&Recommendation<'_>> for VehicleView {
    fn from(rec: &Recommendation<'_>) -> Self {
        Self { score: Some(rec.score), ..Self::from_record(rec.vehicle).with_index(rec.index) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_display_factors() {
        let r = VehicleRecord {
            model_name: "WR-V".into(),
            price: 0.2,
            mileage: 0.5,
            seating: 0.49,
            engine_cc: 0.3,
            engine_type: "Petrol".into(),
            features: "Sunroof".into(),
            body_type: "SUV".into(),
        };
        let v = VehicleView::from_record(&r);
        assert!((v.price - 10.0).abs() < 1e-9);
        assert!((v.mileage - 15.0).abs() < 1e-9);
        assert_eq!(v.seating, 5);
        assert_eq!(v.score, None);
    }
}
