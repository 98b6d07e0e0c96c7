pub mod features;
pub mod recommender;

pub use features::FeatureSchema;
pub use recommender::{ClusterRecommender, RecommendError};
