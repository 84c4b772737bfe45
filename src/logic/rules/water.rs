use super::Rule;
use crate::logic::knowledge::KnowledgeBase;
use crate::models::{FarmInputs, Recommendation, WaterAdvice};
use tracing::debug;

/// Below this the field needs irrigation (cm)
pub const WATER_LOW_CM: f64 = 5.0;
/// Above this the field needs draining (cm)
pub const WATER_HIGH_CM: f64 = 10.0;

/// Water management verdict from the latest sensor reading.
///
/// Both thresholds belong to the optimal band.
pub struct WaterRule;

impl WaterRule {
    pub fn classify(water_level: f64) -> WaterAdvice {
        if water_level < WATER_LOW_CM {
            WaterAdvice::Low
        } else if water_level > WATER_HIGH_CM {
            WaterAdvice::High
        } else {
            WaterAdvice::Optimal
        }
    }
}

impl Rule for WaterRule {
    fn id(&self) -> &'static str {
        "water_advice"
    }

    fn name(&self) -> &'static str {
        "Water Management"
    }

    fn apply(&self, inputs: &FarmInputs, _kb: &KnowledgeBase, rec: &mut Recommendation) {
        let Some(iot) = inputs.iot else {
            return;
        };

        rec.water_advice = Self::classify(iot.water_level);
        debug!(
            water_level = iot.water_level,
            advice = %rec.water_advice,
            "Water advice"
        );
    }
}
