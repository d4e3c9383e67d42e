//! Min-max scaling of the four numeric catalog columns.
//!
//! Parameters are captured once over the whole catalog and reused for every
//! query and every denormalization afterwards.

use crate::VehicleRecord;
use serde::{Deserialize, Serialize};

/// Numeric columns in scaler order. Query vectors use the same positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericColumn {
    Price,
    Mileage,
    Seating,
    EngineCc,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 4] = [Self::Price, Self::Mileage, Self::Seating, Self::EngineCc];

    pub fn position(self) -> usize {
        match self {
            Self::Price => 0,
            Self::Mileage => 1,
            Self::Seating => 2,
            Self::EngineCc => 3,
        }
    }

    /// Header name in the catalog file.
    pub fn header(self) -> &'static str {
        match self {
            Self::Price => "Price",
            Self::Mileage => "Mileage",
            Self::Seating => "Seating",
            Self::EngineCc => "Engine_CC",
        }
    }

    pub fn get(self, record: &VehicleRecord) -> f64 {
        match self {
            Self::Price => record.price,
            Self::Mileage => record.mileage,
            Self::Seating => record.seating,
            Self::EngineCc => record.engine_cc,
        }
    }

    fn get_mut(self, record: &mut VehicleRecord) -> &mut f64 {
        match self {
            Self::Price => &mut record.price,
            Self::Mileage => &mut record.mileage,
            Self::Seating => &mut record.seating,
            Self::EngineCc => &mut record.engine_cc,
        }
    }
}

/// Observed range of one column.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnRange {
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    pub fn is_degenerate(&self) -> bool {
        self.max - self.min == 0.0
    }

    // Half-width keeps `max - min` finite for ranges spanning most of f64.
    fn half_width(&self) -> f64 {
        self.max / 2.0 - self.min / 2.0
    }

    /// Maps `value` into the fitted range. Zero-width ranges map everything to 0.
    pub fn scale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (value / 2.0 - self.min / 2.0) / self.half_width()
    }

    pub fn unscale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return self.min;
        }
        (self.min / 2.0 + value * self.half_width()) * 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScalerParameters {
    pub ranges: [ColumnRange; 4],
}

impl ScalerParameters {
    pub fn range(&self, column: NumericColumn) -> ColumnRange {
        self.ranges[column.position()]
    }

    pub fn scale(&self, column: NumericColumn, value: f64) -> f64 {
        self.range(column).scale(value)
    }

    /// Recovers the original-unit value of a normalized `value`.
    pub fn inverse(&self, column: NumericColumn, value: f64) -> f64 {
        self.range(column).unscale(value)
    }
}

/// Computes per-column min/max over the whole catalog.
pub fn fit(records: &[VehicleRecord]) -> ScalerParameters {
    let mut params = ScalerParameters::default();
    if records.is_empty() {
        return params;
    }
    for column in NumericColumn::ALL {
        let mut range = ColumnRange { min: f64::INFINITY, max: f64::NEG_INFINITY };
        for record in records {
            let v = column.get(record);
            range.min = range.min.min(v);
            range.max = range.max.max(v);
        }
        params.ranges[column.position()] = range;
    }
    params
}

/// Rewrites every record's numeric columns in place using `params`.
pub fn transform(records: &mut [VehicleRecord], params: &ScalerParameters) {
    for record in records.iter_mut() {
        for column in NumericColumn::ALL {
            let slot = column.get_mut(record);
            *slot = params.scale(column, *slot);
        }
    }
}

/// Fits on `records` and normalizes them in place.
pub fn fit_transform(records: &mut [VehicleRecord]) -> ScalerParameters {
    let params = fit(records);
    transform(records, &params);
    tracing::debug!(records = records.len(), ?params, "normalized catalog");
    params
}

/// Scales one query vector given as `[Price, Mileage, Seating, EngineCc]` slots.
/// Values outside the fitted range are not clipped.
pub fn transform_query(budget: f64, mileage: f64, seating: f64, engine_cc: f64, params: &ScalerParameters) -> [f64; 4] {
    [
        params.scale(NumericColumn::Price, budget),
        params.scale(NumericColumn::Mileage, mileage),
        params.scale(NumericColumn::Seating, seating),
        params.scale(NumericColumn::EngineCc, engine_cc),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(price: f64, mileage: f64, seating: f64, engine_cc: f64) -> VehicleRecord {
        VehicleRecord {
            model_name: "Test".into(),
            price,
            mileage,
            seating,
            engine_cc,
            engine_type: "Petrol".into(),
            features: String::new(),
            body_type: "Sedan".into(),
        }
    }

    #[test]
    fn scales_into_unit_range() {
        let mut records = vec![record(5.0, 10.0, 4.0, 1000.0), record(15.0, 20.0, 7.0, 2000.0), record(10.0, 30.0, 5.0, 1500.0)];
        let params = fit_transform(&mut records);
        for r in &records {
            for column in NumericColumn::ALL {
                let v = column.get(r);
                assert!((0.0..=1.0).contains(&v), "{column:?} = {v}");
            }
        }
        assert_eq!(records[0].price, 0.0);
        assert_eq!(records[1].price, 1.0);
        assert!((records[2].price - 0.5).abs() < 1e-12);
        assert!((params.inverse(NumericColumn::Mileage, records[2].mileage) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_column_scales_to_zero() {
        let mut records = vec![record(5.0, 10.0, 5.0, 1200.0), record(8.0, 12.0, 5.0, 1200.0)];
        let params = fit_transform(&mut records);
        assert!(params.range(NumericColumn::Seating).is_degenerate());
        assert!(records.iter().all(|r| r.seating == 0.0 && r.engine_cc == 0.0));
        assert_eq!(params.inverse(NumericColumn::Seating, 0.0), 5.0);
    }

    #[test]
    fn extreme_range_stays_finite() {
        let mut records = vec![record(-1e308, 10.0, 4.0, 1000.0), record(1e308, 20.0, 7.0, 2000.0)];
        let params = fit_transform(&mut records);
        let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![0.0, 1.0]);
        assert_eq!(params.inverse(NumericColumn::Price, 1.0), 1e308);
        assert_eq!(params.inverse(NumericColumn::Price, 0.0), -1e308);
        assert!((params.scale(NumericColumn::Price, 0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_catalog_fits_degenerate_ranges() {
        let params = fit(&[]);
        assert!(params.ranges.iter().all(ColumnRange::is_degenerate));
        assert_eq!(transform_query(15.0, 15.0, 5.0, 0.0, &params), [0.0; 4]);
    }

    #[test]
    fn query_uses_positional_slots() {
        let records = vec![record(0.0, 10.0, 0.0, 0.0), record(50.0, 30.0, 10.0, 2000.0)];
        let params = fit(&records);
        let q = transform_query(25.0, 20.0, 5.0, 0.0, &params);
        assert_eq!(q, [0.5, 0.5, 0.5, 0.0]);
        // out-of-range inputs are passed through unclipped
        assert_eq!(transform_query(100.0, 0.0, 0.0, 0.0, &params)[0], 2.0);
    }
}
