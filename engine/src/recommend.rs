//! Filtering and weighted ranking of the normalized catalog.

use crate::normalize::{self, ScalerParameters};
use crate::similarity::{self, CountMatrix, SimilarityConfig, SimilarityMatrix};
use crate::{Catalog, PreferenceQuery, VehicleIndex, VehicleRecord};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Weights of the ranking score. `jitter` scales a uniform [0, 1) draw per record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub mileage: f64,
    pub price: f64,
    pub seating: f64,
    pub jitter: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { mileage: 0.4, price: 0.3, seating: 0.2, jitter: 0.1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendConfig {
    pub weights: ScoringWeights,
    pub top_k: usize,
    /// Fixed divisor applied to the requested seating; the fitted scaler is not used here.
    pub seating_divisor: f64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self { weights: ScoringWeights::default(), top_k: 5, seating_divisor: 10.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation<'a> {
    pub index: VehicleIndex,
    pub vehicle: &'a VehicleRecord,
    pub score: f64,
}

/// Candidates that pass the budget, seating and engine filters, in catalog order.
pub fn filter_candidates<'a>(
    query: &PreferenceQuery,
    catalog: &'a [VehicleRecord],
    params: &ScalerParameters,
    config: &RecommendConfig,
) -> Vec<(VehicleIndex, &'a VehicleRecord)> {
    let [scaled_budget, _, _, _] =
        normalize::transform_query(query.budget, query.min_mileage, query.seating as f64, 0.0, params);
    let min_seating = query.seating as f64 / config.seating_divisor;
    let engine = query.engine_filter();

    catalog
        .iter()
        .enumerate()
        .filter(|(_, v)| v.price <= scaled_budget)
        .filter(|(_, v)| v.seating >= min_seating)
        .filter(|(_, v)| match &engine {
            Some(needle) => v.engine_type.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect()
}

/// Ranks `catalog` (already normalized with `params`) against `query`.
/// Returns at most `config.top_k` results, best first; empty when nothing matches.
pub fn recommend<'a, R: Rng>(
    query: &PreferenceQuery,
    catalog: &'a [VehicleRecord],
    params: &ScalerParameters,
    config: &RecommendConfig,
    rng: &mut R,
) -> Vec<Recommendation<'a>> {
    let candidates = filter_candidates(query, catalog, params, config);
    if candidates.is_empty() {
        tracing::debug!(?query, "no candidates");
    }
    rank(candidates, config, rng)
}

/// Scores already-filtered candidates, one jitter draw per candidate in input order,
/// and keeps the best `config.top_k`.
pub fn rank<'a, R: Rng>(
    candidates: Vec<(VehicleIndex, &'a VehicleRecord)>,
    config: &RecommendConfig,
    rng: &mut R,
) -> Vec<Recommendation<'a>> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let w = &config.weights;
    let mut scored: Vec<Recommendation<'a>> = candidates
        .into_iter()
        .map(|(index, vehicle)| {
            let jitter: f64 = rng.gen();
            let score = w.mileage * vehicle.mileage + w.price * vehicle.price + w.seating * vehicle.seating + w.jitter * jitter;
            Recommendation { index, vehicle, score }
        })
        .collect();
    let total = scored.len();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(config.top_k);
    tracing::debug!(candidates = total, returned = scored.len(), "ranked candidates");
    scored
}

/// Normalized catalog plus the state fitted on it. Immutable once built.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Catalog,
    params: ScalerParameters,
    counts: CountMatrix,
    similarity: SimilarityMatrix,
    config: RecommendConfig,
}

impl Recommender {
    /// Takes raw catalog records, normalizes them in place and builds the similarity index.
    pub fn build(mut records: Catalog, config: RecommendConfig, similarity_config: SimilarityConfig) -> Self {
        let params = normalize::fit_transform(&mut records);
        let (counts, similarity) = similarity::build_index(&records, similarity_config);
        tracing::info!(records = records.len(), terms = counts.num_terms(), "recommender ready");
        Self { catalog: records, params, counts, similarity, config }
    }

    pub fn recommend<R: Rng>(&self, query: &PreferenceQuery, rng: &mut R) -> Vec<Recommendation<'_>> {
        recommend(query, &self.catalog, &self.params, &self.config, rng)
    }

    /// Like [`Recommender::recommend`], also returning how many records passed the
    /// filters before the top-k cut. Filters the catalog once.
    pub fn recommend_with_total<R: Rng>(&self, query: &PreferenceQuery, rng: &mut R) -> (usize, Vec<Recommendation<'_>>) {
        let candidates = filter_candidates(query, &self.catalog, &self.params, &self.config);
        let total = candidates.len();
        (total, rank(candidates, &self.config, rng))
    }

    /// Number of records passing the filters, before the top-k cut.
    pub fn count_matches(&self, query: &PreferenceQuery) -> usize {
        filter_candidates(query, &self.catalog, &self.params, &self.config).len()
    }

    pub fn catalog(&self) -> &[VehicleRecord] {
        &self.catalog
    }

    pub fn vehicle(&self, index: VehicleIndex) -> Option<&VehicleRecord> {
        self.catalog.get(index)
    }

    pub fn params(&self) -> &ScalerParameters {
        &self.params
    }

    pub fn counts(&self) -> &CountMatrix {
        &self.counts
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn normalized(name: &str, price: f64, mileage: f64, seating: f64, engine: &str) -> VehicleRecord {
        VehicleRecord {
            model_name: name.into(),
            price,
            mileage,
            seating,
            engine_cc: 0.0,
            engine_type: engine.into(),
            features: String::new(),
            body_type: String::new(),
        }
    }

    fn unit_params() -> ScalerParameters {
        let mut params = ScalerParameters::default();
        params.ranges[0] = normalize::ColumnRange { min: 0.0, max: 50.0 };
        params.ranges[1] = normalize::ColumnRange { min: 0.0, max: 30.0 };
        params.ranges[2] = normalize::ColumnRange { min: 0.0, max: 10.0 };
        params
    }

    #[test]
    fn single_record_example() {
        let catalog = vec![normalized("City", 0.2, 0.5, 0.5, "Petrol")];
        let query = PreferenceQuery::new(15.0, 5, 15.0, "Petrol");
        let mut rng = StdRng::seed_from_u64(7);
        let out = recommend(&query, &catalog, &unit_params(), &RecommendConfig::default(), &mut rng);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].index, 0);
        assert!(out[0].score >= 0.36 - 1e-9 && out[0].score < 0.46);
    }

    #[test]
    fn zero_jitter_orders_by_weighted_score() {
        let catalog = vec![
            normalized("A", 0.1, 0.2, 0.5, "Petrol"),
            normalized("B", 0.1, 0.9, 0.5, "Petrol"),
            normalized("C", 0.1, 0.5, 0.5, "Petrol"),
        ];
        let config = RecommendConfig { weights: ScoringWeights { jitter: 0.0, ..Default::default() }, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(1);
        let out = recommend(&PreferenceQuery::new(50.0, 4, 10.0, ""), &catalog, &unit_params(), &config, &mut rng);
        let order: Vec<_> = out.iter().map(|r| r.vehicle.model_name.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn jitter_is_drawn_per_record_in_catalog_order() {
        // Equal base scores; the stream yields 0.0, 0.25, 0.5, 0.75 as f64 draws.
        let catalog: Vec<_> = (0..4).map(|i| normalized(&format!("M{i}"), 0.1, 0.5, 0.5, "Petrol")).collect();
        let mut rng = StepRng::new(0, 1 << 62);
        let out = recommend(&PreferenceQuery::new(50.0, 4, 10.0, ""), &catalog, &unit_params(), &RecommendConfig::default(), &mut rng);
        let base = 0.4 * 0.5 + 0.3 * 0.1 + 0.2 * 0.5;
        let order: Vec<_> = out.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![3, 2, 1, 0]);
        for (r, u) in out.iter().zip([0.75, 0.5, 0.25, 0.0]) {
            assert!((r.score - (base + 0.1 * u)).abs() < 1e-12, "{} scored {}", r.index, r.score);
        }
    }

    #[test]
    fn jitter_can_overturn_a_smaller_base_gap() {
        // B leads by 0.04 on mileage; A draws 0.75 and B draws 0.0.
        let catalog = vec![normalized("A", 0.1, 0.5, 0.5, "Petrol"), normalized("B", 0.1, 0.6, 0.5, "Petrol")];
        let mut rng = StepRng::new(3 << 62, 1 << 62);
        let out = recommend(&PreferenceQuery::new(50.0, 4, 10.0, ""), &catalog, &unit_params(), &RecommendConfig::default(), &mut rng);
        let order: Vec<_> = out.iter().map(|r| r.vehicle.model_name.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[test]
    fn total_counts_matches_beyond_top_k() {
        let mut records: Vec<_> = (0..7)
            .map(|i| VehicleRecord { price: i as f64, mileage: 20.0, seating: 7.0, ..normalized(&format!("M{i}"), 0.0, 0.0, 0.0, "Petrol") })
            .collect();
        // a two-seater widens the seating range so the others scale to 1.0
        records.push(normalized("Coupe", 0.0, 20.0, 2.0, "Petrol"));
        let rec = Recommender::build(records, RecommendConfig::default(), SimilarityConfig::default());
        let mut rng = StdRng::seed_from_u64(4);
        let query = PreferenceQuery::new(6.0, 4, 10.0, "");
        let (total, out) = rec.recommend_with_total(&query, &mut rng);
        assert_eq!(total, 7);
        assert_eq!(out.len(), 5);
        assert_eq!(total, rec.count_matches(&query));
    }

    #[test]
    fn same_seed_same_ranking() {
        let catalog: Vec<_> = (0..8).map(|i| normalized(&format!("M{i}"), 0.1, 0.5, 0.5, "Hybrid")).collect();
        let query = PreferenceQuery::new(50.0, 4, 10.0, "hybrid");
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            recommend(&query, &catalog, &unit_params(), &RecommendConfig::default(), &mut rng)
                .into_iter()
                .map(|r| r.index)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        assert_eq!(run(42).len(), 5);
    }

    #[test]
    fn seating_uses_fixed_divisor() {
        let catalog = vec![normalized("Small", 0.1, 0.5, 0.4, "Petrol"), normalized("Big", 0.1, 0.5, 0.7, "Petrol")];
        let mut rng = StdRng::seed_from_u64(3);
        let out = recommend(&PreferenceQuery::new(50.0, 7, 10.0, "Any"), &catalog, &unit_params(), &RecommendConfig::default(), &mut rng);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].vehicle.model_name, "Big");
    }
}
