pub mod catalog;
pub mod error;
pub mod normalize;
pub mod recommend;
pub mod similarity;
pub mod tokenizer;
pub mod vehicle;
pub mod view;

pub use catalog::{load_catalog, Catalog};
pub use error::CatalogError;
pub use normalize::{ColumnRange, NumericColumn, ScalerParameters};
pub use recommend::{recommend, RecommendConfig, Recommendation, Recommender, ScoringWeights};
pub use similarity::{CountMatrix, SimilarityConfig, SimilarityMatrix};
pub use tokenizer::TokenizerMode;
pub use vehicle::{PreferenceQuery, VehicleIndex, VehicleRecord};
pub use view::VehicleView;
