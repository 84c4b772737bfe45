pub mod crop;
pub mod engine;
pub mod treatment;
pub mod water;

pub use engine::RecommendationDeriver;

use crate::logic::knowledge::KnowledgeBase;
use crate::models::{FarmInputs, Recommendation};

/// One section of the farm recommendation
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Fill in this rule's fields. Fields the rule has nothing to say about
    /// keep their placeholder values.
    fn apply(&self, inputs: &FarmInputs, kb: &KnowledgeBase, rec: &mut Recommendation);
}
