use super::Rule;
use crate::logic::knowledge::KnowledgeBase;
use crate::models::{FarmInputs, Recommendation};
use tracing::debug;

/// Crop suggestion
///
/// A planted farm is reported as-is. An empty field gets the first crop the
/// knowledge base lists for its soil type.
pub struct CropRule;

impl Rule for CropRule {
    fn id(&self) -> &'static str {
        "crop_suggestion"
    }

    fn name(&self) -> &'static str {
        "Crop Suggestion"
    }

    fn apply(&self, inputs: &FarmInputs, kb: &KnowledgeBase, rec: &mut Recommendation) {
        let farm = inputs.farm;

        if farm.has_current_crop() {
            rec.crop_suggestion = format!("Current Crop: {}", farm.current_crop);
            return;
        }

        match kb.crop_for_soil(&farm.soil_type) {
            Some(entry) => {
                rec.crop_suggestion = format!("Recommended: {}", entry.recommended_crop);
            }
            None => {
                debug!(soil_type = %farm.soil_type, "No crop entry for soil type");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CropKnowledgeEntry, FarmSnapshot};

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(
            vec![
                CropKnowledgeEntry::new("fertile", "high", "BPT 5204 (Samba Masuri)"),
                CropKnowledgeEntry::new("fertile", "medium", "MTU 1010"),
                CropKnowledgeEntry::new("non-fertile", "low", "Sahbhagi Dhan"),
            ],
            Vec::new(),
        )
    }

    fn suggest(farm: &FarmSnapshot, kb: &KnowledgeBase) -> String {
        let mut rec = Recommendation::default();
        CropRule.apply(&FarmInputs::new(farm), kb, &mut rec);
        rec.crop_suggestion
    }

    #[test]
    fn unplanted_farm_gets_soil_recommendation() {
        let farm = FarmSnapshot::new("non-fertile", 1.0);
        assert_eq!(suggest(&farm, &kb()), "Recommended: Sahbhagi Dhan");

        let farm = FarmSnapshot::new("non-fertile", 1.0).with_crop("None");
        assert_eq!(suggest(&farm, &kb()), "Recommended: Sahbhagi Dhan");
    }

    #[test]
    fn first_tier_wins_for_shared_soil_type() {
        let farm = FarmSnapshot::new("fertile", 1.0);
        assert_eq!(suggest(&farm, &kb()), "Recommended: BPT 5204 (Samba Masuri)");
    }

    #[test]
    fn planted_farm_ignores_knowledge_base() {
        let farm = FarmSnapshot::new("fertile", 1.0).with_crop("Sona Masuri");
        assert_eq!(suggest(&farm, &kb()), "Current Crop: Sona Masuri");

        let farm = FarmSnapshot::new("unknown soil", 1.0).with_crop("Sona Masuri");
        assert_eq!(
            suggest(&farm, &KnowledgeBase::default()),
            "Current Crop: Sona Masuri"
        );
    }

    #[test]
    fn only_exact_none_means_unplanted() {
        for crop in ["none", "NONE", "  "] {
            let farm = FarmSnapshot::new("fertile", 1.0).with_crop(crop);
            assert_eq!(suggest(&farm, &kb()), format!("Current Crop: {}", crop));
        }
    }

    #[test]
    fn unknown_soil_keeps_placeholder() {
        let farm = FarmSnapshot::new("laterite", 1.0);
        assert_eq!(suggest(&farm, &kb()), "Keep monitoring");
    }
}
