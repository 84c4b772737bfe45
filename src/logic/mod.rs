pub mod dosage;
pub mod estimator;
pub mod knowledge;
pub mod rules;

pub use estimator::CostEstimator;
pub use knowledge::{KnowledgeBase, PriceCatalog};
pub use rules::RecommendationDeriver;
