use super::{crop::CropRule, treatment::TreatmentRule, water::WaterRule, Rule};
use crate::logic::knowledge::KnowledgeBase;
use crate::models::{FarmInputs, Recommendation};

/// Builds a [`Recommendation`] by running each rule over the farm inputs.
///
/// Holds no per-request state: identical inputs always give identical output.
pub struct RecommendationDeriver {
    rules: Vec<Box<dyn Rule>>,
}

impl RecommendationDeriver {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(CropRule),
            Box::new(WaterRule),
            Box::new(TreatmentRule),
        ];

        Self { rules }
    }

    pub fn derive(&self, inputs: &FarmInputs, kb: &KnowledgeBase) -> Recommendation {
        let mut rec = Recommendation::default();
        for rule in &self.rules {
            rule.apply(inputs, kb, &mut rec);
        }
        rec
    }

    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules.iter().map(|r| (r.id(), r.name())).collect()
    }
}

impl Default for RecommendationDeriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;
    use crate::models::{DiseaseDetection, FarmSnapshot, IoTSnapshot, WaterAdvice};

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(seed::crops(), seed::diseases())
    }

    #[test]
    fn rules_run_in_order() {
        let ids: Vec<_> = RecommendationDeriver::new()
            .list_rules()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["crop_suggestion", "water_advice", "disease_treatment"]);
    }

    #[test]
    fn farm_without_readings_gets_placeholders() {
        let farm = FarmSnapshot::new("fertile", 2.0).with_crop("None");
        let rec = RecommendationDeriver::new().derive(&FarmInputs::new(&farm), &kb());

        assert_eq!(rec.crop_suggestion, "Recommended: BPT 5204 (Samba Masuri)");
        assert_eq!(rec.water_advice, WaterAdvice::CheckLevels);
        assert_eq!(rec.disease_detected, "None");
        assert_eq!(rec.medicine_suggestion, "None");
        assert_eq!(rec.confidence, 0.0);
        assert_eq!(rec.severity, "Low");
    }

    #[test]
    fn full_inputs_fill_every_section() {
        let farm = FarmSnapshot::new("non-fertile", 1.5).with_crop("MTU 1010");
        let iot = IoTSnapshot::with_water_level(3.2);
        let detection = DiseaseDetection::new("brown_spot", 0.81)
            .with_severity("Medium")
            .with_images("uploads/leaf.jpg", Some("uploads/leaf_annotated.jpg".into()));
        let inputs = FarmInputs::new(&farm)
            .with_iot(Some(&iot))
            .with_detection(Some(&detection));

        let rec = RecommendationDeriver::new().derive(&inputs, &kb());

        assert_eq!(rec.crop_suggestion, "Current Crop: MTU 1010");
        assert_eq!(rec.water_advice, WaterAdvice::Low);
        assert_eq!(rec.disease_detected, "brown_spot");
        assert_eq!(rec.medicine_suggestion, "Mancozeb");
        assert_eq!(rec.medicine_secondary, "Propiconazole");
        assert_eq!(rec.dosage, "2.5g/liter");
        assert_eq!(rec.severity, "Medium");
        assert_eq!(rec.confidence, 0.81);
        assert_eq!(
            rec.annotated_image_reference.as_deref(),
            Some("uploads/leaf_annotated.jpg")
        );
    }

    #[test]
    fn derivation_is_idempotent() {
        let farm = FarmSnapshot::new("fertile", 2.0);
        let iot = IoTSnapshot::with_water_level(12.0);
        let detection = DiseaseDetection::new("Unknown Rot", 0.4);
        let inputs = FarmInputs::new(&farm)
            .with_iot(Some(&iot))
            .with_detection(Some(&detection));
        let deriver = RecommendationDeriver::new();
        let kb = kb();

        let first = serde_json::to_string(&deriver.derive(&inputs, &kb)).unwrap();
        let second = serde_json::to_string(&deriver.derive(&inputs, &kb)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_knowledge_base_still_derives() {
        let farm = FarmSnapshot::new("fertile", 2.0);
        let detection = DiseaseDetection::new("Blast", 0.9);
        let inputs = FarmInputs::new(&farm).with_detection(Some(&detection));

        let rec = RecommendationDeriver::new().derive(&inputs, &KnowledgeBase::default());

        assert_eq!(rec.crop_suggestion, "Keep monitoring");
        assert_eq!(rec.medicine_suggestion, "Consult local expert");
    }
}
