use crate::config::PricingConfig;
use crate::logic::knowledge::{KnowledgeBase, PriceCatalog};
use crate::models::{
    CostEstimate, CostOutcome, DiseaseDetection, DiseaseSummary, FarmSnapshot, FarmSummary,
    TreatmentCost,
};
use tracing::{debug, warn};

const DEFAULT_SEVERITY: &str = "MEDIUM";
const DEFAULT_BRAND: &str = "Generic";
const DEFAULT_UNIT: &str = "liter";

/// Estimates what treating a farm's detected disease will cost.
///
/// Every monetary figure is rounded once, from unrounded sums.
pub struct CostEstimator<'a> {
    pricing: &'a PricingConfig,
}

/// Costs that do not depend on the medicine.
struct FieldCosts {
    quantity_needed: f64,
    quantity_unit: &'static str,
    dosage_parse_failed: bool,
    equipment: f64,
    application: f64,
}

impl<'a> CostEstimator<'a> {
    pub fn new(pricing: &'a PricingConfig) -> Self {
        Self { pricing }
    }

    pub fn estimate(
        &self,
        detection: Option<&DiseaseDetection>,
        farm: &FarmSnapshot,
        kb: &KnowledgeBase,
        catalog: &PriceCatalog,
    ) -> CostOutcome {
        let Some(detection) = detection.filter(|d| !d.disease_type.trim().is_empty()) else {
            return CostOutcome::no_detection();
        };

        let Some(entry) = kb.match_disease(&detection.disease_type) else {
            debug!(disease = %detection.disease_type, "No treatment data for cost estimate");
            return CostOutcome::no_treatment_data();
        };

        let field_size = farm.effective_field_size();
        let (quantity_needed, quantity_unit, dosage_parse_failed) = match entry.dosage_spec {
            Some(dosage) => (dosage.quantity_for(field_size), dosage.bulk_unit(), false),
            None => {
                warn!(
                    disease = %entry.disease_name,
                    dosage = %entry.dosage,
                    "Dosage has no structured form, medicine cost cannot be computed"
                );
                (0.0, "", true)
            }
        };

        let field = FieldCosts {
            quantity_needed,
            quantity_unit,
            dosage_parse_failed,
            equipment: self.equipment_cost(field_size),
            application: self.application_cost(field_size),
        };

        let primary = self.treatment_cost(&entry.medicine, &entry.dosage, &field, catalog);
        let alternative = entry
            .secondary_medicine()
            .map(|medicine| self.treatment_cost(medicine, &entry.dosage, &field, catalog));

        CostOutcome::Estimate(Box::new(CostEstimate {
            disease: DiseaseSummary {
                name: detection.disease_type.clone(),
                severity: detection
                    .severity
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(DEFAULT_SEVERITY)
                    .to_string(),
                confidence: confidence_percent(detection.confidence),
            },
            farm: FarmSummary {
                size: field_size,
                location: farm.location.clone(),
                farmer_name: farm.farmer_name.clone(),
            },
            primary,
            alternative,
            timeline: entry.timeline.clone(),
            preventive_measures: entry.preventive_measures.clone(),
        }))
    }

    /// Sprayer rental: flat baseline plus a per-acre charge.
    pub fn equipment_cost(&self, field_size: f64) -> f64 {
        self.pricing.equipment_base + field_size * self.pricing.equipment_per_acre
    }

    /// Hired labor for applying the treatment.
    pub fn application_cost(&self, field_size: f64) -> f64 {
        field_size * self.pricing.labor_per_acre
    }

    fn treatment_cost(
        &self,
        medicine: &str,
        dosage: &str,
        field: &FieldCosts,
        catalog: &PriceCatalog,
    ) -> TreatmentCost {
        let price = catalog.find(medicine);
        if price.is_none() {
            warn!(medicine, "No catalog price, medicine cost counted as zero");
        }

        let unit_price = price.map(|p| p.unit_price).unwrap_or(0.0);
        let unit = price
            .map(|p| p.unit.clone())
            .unwrap_or_else(|| DEFAULT_UNIT.to_string());
        let medicine_cost = field.quantity_needed * unit_price;
        let min_raw = medicine_cost + field.equipment;
        let max_raw = min_raw + field.application;

        TreatmentCost {
            medicine: medicine.to_string(),
            brand: price
                .and_then(|p| p.brand_name.clone())
                .unwrap_or_else(|| DEFAULT_BRAND.to_string()),
            dosage: dosage.to_string(),
            unit_price,
            quantity_needed: field.quantity_needed,
            quantity_unit: if field.quantity_unit.is_empty() {
                unit.clone()
            } else {
                field.quantity_unit.to_string()
            },
            unit,
            medicine_cost: round_currency(medicine_cost),
            equipment_cost: round_currency(field.equipment),
            application_cost: round_currency(field.application),
            total_min: round_currency(min_raw),
            total_max: round_currency(max_raw),
            price_found: price.is_some(),
            dosage_parse_failed: field.dosage_parse_failed,
        }
    }
}

fn round_currency(amount: f64) -> i64 {
    amount.round() as i64
}

fn confidence_percent(confidence: f64) -> String {
    if confidence.is_finite() && confidence > 0.0 {
        format!("{:.1}", confidence * 100.0)
    } else {
        "N/A".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;
    use crate::models::{DiseaseKnowledgeEntry, MedicinePriceEntry};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(seed::crops(), seed::diseases())
    }

    fn catalog() -> PriceCatalog {
        PriceCatalog::new(seed::prices())
    }

    fn estimate(disease: &str, field_size: f64) -> CostOutcome {
        let pricing = PricingConfig::default();
        let farm = FarmSnapshot::new("fertile", field_size).with_location("Guntur");
        let detection = DiseaseDetection::new(disease, 0.876).with_severity("HIGH");
        CostEstimator::new(&pricing).estimate(Some(&detection), &farm, &kb(), &catalog())
    }

    #[test]
    fn blast_on_two_acres() {
        let outcome = estimate("Blast", 2.0);
        let est = outcome.estimate().expect("estimate");

        // 0.6 g x 2 acres = 1.2 g = 0.0012 kg at 1550/kg
        assert_relative_eq!(est.primary.quantity_needed, 0.0012, epsilon = 1e-12);
        assert_eq!(est.primary.medicine, "Tricyclazole 75 WP");
        assert_eq!(est.primary.brand, "Beam");
        assert_eq!(est.primary.unit, "kg");
        assert_eq!(est.primary.quantity_unit, "kg");
        assert_eq!(est.primary.medicine_cost, 2);
        assert_eq!(est.primary.equipment_cost, 300);
        assert_eq!(est.primary.application_cost, 300);
        assert_eq!(est.primary.total_min, 302);
        assert_eq!(est.primary.total_max, 602);
        assert!(!est.primary.is_incomplete());

        let alt = est.alternative.as_ref().expect("alternative");
        assert_eq!(alt.medicine, "Isoprothiolane");
        assert_relative_eq!(alt.quantity_needed, est.primary.quantity_needed);
        assert_eq!(alt.total_min, 302);
    }

    #[test]
    fn blight_on_three_acres() {
        let outcome = estimate("bacterial_leaf_blight", 3.0);
        let est = outcome.estimate().expect("estimate");

        // 500 g x 3 = 1.5 kg at 450/kg = 675
        assert_relative_eq!(est.primary.quantity_needed, 1.5, epsilon = 1e-12);
        assert_eq!(est.primary.medicine_cost, 675);
        assert_eq!(est.primary.equipment_cost, 350);
        assert_eq!(est.primary.application_cost, 450);
        assert_eq!(est.primary.total_min, 1025);
        assert_eq!(est.primary.total_max, 1475);

        // Streptocycline 1.5 kg at 1200/kg = 1800
        let alt = est.alternative.as_ref().expect("alternative");
        assert_eq!(alt.brand, "Plantomycin");
        assert_eq!(alt.total_min, 2150);
        assert_eq!(alt.total_max, 2600);
    }

    #[test]
    fn echoes_disease_and_farm() {
        let outcome = estimate("Sheath Blight", 1.0);
        let est = outcome.estimate().unwrap();
        assert_eq!(est.disease.name, "Sheath Blight");
        assert_eq!(est.disease.severity, "HIGH");
        assert_eq!(est.disease.confidence, "87.6");
        assert_eq!(est.farm.size, 1.0);
        assert_eq!(est.farm.location, "Guntur");
        assert_eq!(est.timeline, "Spray when lesions appear, check after 7 days");
        assert_eq!(est.preventive_measures, "Reduce seeding rate, avoid excess urea");
    }

    #[test]
    fn severity_defaults_to_medium_and_confidence_to_na() {
        let pricing = PricingConfig::default();
        let farm = FarmSnapshot::new("fertile", 1.0);
        let detection = DiseaseDetection::new("Tungro", 0.0);
        let outcome =
            CostEstimator::new(&pricing).estimate(Some(&detection), &farm, &kb(), &catalog());
        let est = outcome.estimate().unwrap();
        assert_eq!(est.disease.severity, "MEDIUM");
        assert_eq!(est.disease.confidence, "N/A");
    }

    #[test]
    fn zero_field_size_costs_only_equipment_baseline() {
        let outcome = estimate("Blast", 0.0);
        let est = outcome.estimate().unwrap();
        assert_eq!(est.primary.medicine_cost, 0);
        assert_eq!(est.primary.equipment_cost, 200);
        assert_eq!(est.primary.application_cost, 0);
        assert_eq!(est.primary.total_min, 200);
        assert_eq!(est.primary.total_max, 200);
    }

    #[test]
    fn no_detection_has_no_data() {
        let pricing = PricingConfig::default();
        let farm = FarmSnapshot::new("fertile", 2.0);
        let outcome = CostEstimator::new(&pricing).estimate(None, &farm, &kb(), &catalog());
        assert!(matches!(outcome, CostOutcome::NoDetection { .. }));
        assert!(!outcome.has_data());

        let blank = DiseaseDetection::new("  ", 0.5);
        let outcome =
            CostEstimator::new(&pricing).estimate(Some(&blank), &farm, &kb(), &catalog());
        assert!(matches!(outcome, CostOutcome::NoDetection { .. }));
    }

    #[test]
    fn unknown_disease_has_no_treatment_data() {
        let outcome = estimate("Stem Rot", 2.0);
        assert!(matches!(outcome, CostOutcome::NoTreatmentData { .. }));
        assert!(!outcome.has_data());

        let outcome = estimate("Healthy", 2.0);
        assert!(matches!(outcome, CostOutcome::NoTreatmentData { .. }));
    }

    #[test]
    fn missing_price_is_flagged() {
        let pricing = PricingConfig::default();
        let farm = FarmSnapshot::new("fertile", 2.0);
        let detection = DiseaseDetection::new("Blast", 0.9);
        let outcome = CostEstimator::new(&pricing).estimate(
            Some(&detection),
            &farm,
            &kb(),
            &PriceCatalog::default(),
        );
        let est = outcome.estimate().unwrap();
        assert!(!est.primary.price_found);
        assert!(est.primary.is_incomplete());
        assert_eq!(est.primary.brand, "Generic");
        assert_eq!(est.primary.unit, "liter");
        // Tricyclazole is dosed in grams, so the quantity stays in kg
        assert_eq!(est.primary.quantity_unit, "kg");
        assert_eq!(est.primary.unit_price, 0.0);
        assert_eq!(est.primary.medicine_cost, 0);
        assert_eq!(est.primary.total_min, 300);
    }

    #[test]
    fn unparseable_dosage_is_flagged() {
        let kb = KnowledgeBase::new(
            Vec::new(),
            vec![DiseaseKnowledgeEntry::new("Leaf Curl", "Neem Oil", "as directed")],
        );
        let catalog = PriceCatalog::new(vec![MedicinePriceEntry::new(
            "Neem Oil",
            None,
            400.0,
            "liter",
        )]);
        let pricing = PricingConfig::default();
        let farm = FarmSnapshot::new("fertile", 2.0);
        let detection = DiseaseDetection::new("leaf_curl", 0.9);

        let outcome = CostEstimator::new(&pricing).estimate(Some(&detection), &farm, &kb, &catalog);
        let est = outcome.estimate().unwrap();
        assert!(est.primary.dosage_parse_failed);
        assert!(est.primary.price_found);
        assert_eq!(est.primary.quantity_needed, 0.0);
        assert_eq!(est.primary.quantity_unit, "liter");
        assert_eq!(est.primary.medicine_cost, 0);
        assert!(est.primary.is_incomplete());
        assert!(est.alternative.is_none());
    }

    #[test]
    fn custom_pricing_is_applied() {
        let pricing = PricingConfig {
            equipment_base: 500.0,
            equipment_per_acre: 0.0,
            labor_per_acre: 100.0,
            ..PricingConfig::default()
        };
        let estimator = CostEstimator::new(&pricing);
        assert_eq!(estimator.equipment_cost(4.0), 500.0);
        assert_eq!(estimator.application_cost(4.0), 400.0);
    }

    #[test]
    fn serializes_with_has_data_flag() {
        let json = serde_json::to_value(estimate("Blast", 2.0)).unwrap();
        assert_eq!(json["hasData"], true);
        assert_eq!(json["primary"]["totalMax"], 602);
        assert_eq!(json["primary"]["quantityUnit"], "kg");
        assert_eq!(json["disease"]["severity"], "HIGH");
        assert_eq!(json["preventiveMeasures"], "Use resistant varieties, remove infected straw");
    }

    proptest! {
        #[test]
        fn totals_are_ordered(size in 0.0f64..500.0, idx in 0usize..8) {
            let name = seed::diseases()[idx].disease_name.clone();
            let outcome = estimate(&name, size);
            let est = outcome.estimate().unwrap();
            prop_assert!(est.primary.total_min <= est.primary.total_max);
            if let Some(alt) = &est.alternative {
                prop_assert!(alt.total_min <= alt.total_max);
            }
        }

        #[test]
        fn totals_grow_with_field_size(a in 0.0f64..500.0, b in 0.0f64..500.0, idx in 0usize..8) {
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            let name = seed::diseases()[idx].disease_name.clone();
            let small_outcome = estimate(&name, small);
            let large_outcome = estimate(&name, large);
            let lo = small_outcome.estimate().unwrap();
            let hi = large_outcome.estimate().unwrap();
            prop_assert!(lo.primary.total_min <= hi.primary.total_min);
            prop_assert!(lo.primary.total_max <= hi.primary.total_max);
        }
    }
}
