use super::Rule;
use crate::logic::knowledge::{
    KnowledgeBase, Treatment, GENERIC_MEDICINE, GENERIC_PREVENTIVE, GENERIC_TIMELINE,
};
use crate::models::{FarmInputs, Recommendation, NONE_TEXT, NOT_APPLICABLE};

/// Disease and treatment advice
///
/// The detected label is echoed verbatim; normalization is only used to find
/// the treatment row. Unknown diseases get generic expert-consultation advice,
/// healthy crops get none.
pub struct TreatmentRule;

impl Rule for TreatmentRule {
    fn id(&self) -> &'static str {
        "disease_treatment"
    }

    fn name(&self) -> &'static str {
        "Disease Treatment"
    }

    fn apply(&self, inputs: &FarmInputs, kb: &KnowledgeBase, rec: &mut Recommendation) {
        let Some(detection) = inputs.detection else {
            return;
        };

        rec.disease_detected = detection.disease_type.clone();
        rec.confidence = detection.confidence;
        rec.severity = detection
            .severity
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        rec.image_reference = detection.image_reference.clone();
        rec.annotated_image_reference = detection.annotated_image_reference.clone();

        match kb.treatment_for(detection) {
            Treatment::Matched(entry) => {
                rec.medicine_suggestion = entry.medicine.clone();
                rec.medicine_secondary = entry
                    .secondary_medicine()
                    .unwrap_or(NONE_TEXT)
                    .to_string();
                rec.dosage = entry.dosage.clone();
                rec.preventive_measures = entry.preventive_measures.clone();
                rec.timeline = entry.timeline.clone();
            }
            Treatment::Generic => {
                rec.medicine_suggestion = GENERIC_MEDICINE.to_string();
                rec.dosage = NOT_APPLICABLE.to_string();
                rec.preventive_measures = GENERIC_PREVENTIVE.to_string();
                rec.timeline = GENERIC_TIMELINE.to_string();
            }
            Treatment::Healthy => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;
    use crate::models::{DiseaseDetection, FarmSnapshot};

    fn treat(detection: Option<DiseaseDetection>) -> Recommendation {
        let kb = KnowledgeBase::new(seed::crops(), seed::diseases());
        let farm = FarmSnapshot::new("fertile", 2.0);
        let inputs = FarmInputs::new(&farm).with_detection(detection.as_ref());
        let mut rec = Recommendation::default();
        TreatmentRule.apply(&inputs, &kb, &mut rec);
        rec
    }

    #[test]
    fn no_detection_leaves_defaults() {
        let rec = treat(None);
        assert_eq!(rec, Recommendation::default());
    }

    #[test]
    fn known_disease_gets_table_treatment() {
        let rec = treat(Some(
            DiseaseDetection::new("Bacterial_Leaf_Blight", 0.93).with_severity("HIGH"),
        ));
        assert_eq!(rec.disease_detected, "Bacterial_Leaf_Blight");
        assert_eq!(rec.medicine_suggestion, "Copper Oxychloride");
        assert_eq!(rec.medicine_secondary, "Streptocycline");
        assert_eq!(rec.dosage, "500g/acre");
        assert_eq!(rec.preventive_measures, "Improve drainage, avoid nitrogen overdose");
        assert_eq!(rec.timeline, "Spray immediately, repeat after 10 days");
        assert_eq!(rec.severity, "HIGH");
        assert_eq!(rec.confidence, 0.93);
    }

    #[test]
    fn unknown_disease_gets_generic_advice() {
        let rec = treat(Some(DiseaseDetection::new("Stem Rot", 0.55)));
        assert_eq!(rec.medicine_suggestion, "Consult local expert");
        assert_eq!(rec.medicine_secondary, "None");
        assert_eq!(rec.dosage, "N/A");
        assert_eq!(rec.preventive_measures, "Quarantine affected area");
        assert_eq!(rec.timeline, "Immediate action required");
    }

    #[test]
    fn healthy_crop_gets_no_medicine() {
        for label in ["Healthy", "Normal"] {
            let rec = treat(Some(DiseaseDetection::new(label, 0.97)));
            assert_eq!(rec.disease_detected, label);
            assert_eq!(rec.medicine_suggestion, "None");
            assert_eq!(rec.dosage, "N/A");
            assert_eq!(rec.confidence, 0.97);
        }
    }

    #[test]
    fn missing_severity_is_unknown() {
        let rec = treat(Some(DiseaseDetection::new("Blast", 0.7)));
        assert_eq!(rec.severity, "Unknown");
        assert_eq!(rec.medicine_suggestion, "Tricyclazole 75 WP");
    }
}
