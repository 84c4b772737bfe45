use crate::logic::dosage::Dosage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One soil/water tier row of the crop table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropKnowledgeEntry {
    pub soil_type: String,
    pub water_availability: String,
    pub recommended_crop: String,
}

impl CropKnowledgeEntry {
    pub fn new(soil_type: &str, water_availability: &str, recommended_crop: &str) -> Self {
        Self {
            soil_type: soil_type.to_string(),
            water_availability: water_availability.to_string(),
            recommended_crop: recommended_crop.to_string(),
        }
    }
}

/// Treatment data for one disease.
///
/// Alternate spellings of the disease label live in `aliases` rather than as
/// duplicate rows, so every spelling resolves to the same treatment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseKnowledgeEntry {
    pub id: Option<i64>,
    pub disease_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub medicine: String,
    pub medicine_secondary: Option<String>,
    /// Free-text rate as entered, e.g. "500g/acre"
    pub dosage: String,
    /// Structured rate, parsed from `dosage` when the row was entered
    pub dosage_spec: Option<Dosage>,
    pub preventive_measures: String,
    pub timeline: String,
}

impl DiseaseKnowledgeEntry {
    /// Builds an entry, parsing the dosage text into its structured form.
    pub fn new(disease_name: &str, medicine: &str, dosage: &str) -> Self {
        Self {
            id: None,
            disease_name: disease_name.to_string(),
            aliases: Vec::new(),
            medicine: medicine.to_string(),
            medicine_secondary: None,
            dosage: dosage.to_string(),
            dosage_spec: Dosage::parse(dosage).ok(),
            preventive_measures: String::new(),
            timeline: String::new(),
        }
    }

    pub fn with_secondary(mut self, medicine: &str) -> Self {
        self.medicine_secondary = Some(medicine.to_string());
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_guidance(mut self, preventive_measures: &str, timeline: &str) -> Self {
        self.preventive_measures = preventive_measures.to_string();
        self.timeline = timeline.to_string();
        self
    }

    /// Canonical name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.disease_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Secondary medicine, if one is actually named.
    pub fn secondary_medicine(&self) -> Option<&str> {
        self.medicine_secondary
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case("none"))
    }
}

/// One row of the medicine price catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicinePriceEntry {
    pub id: Option<i64>,
    pub medicine_name: String,
    pub brand_name: Option<String>,
    pub unit_price: f64,
    pub unit: String,
    pub disease_name: Option<String>,
    pub available: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl MedicinePriceEntry {
    pub fn new(medicine_name: &str, brand_name: Option<&str>, unit_price: f64, unit: &str) -> Self {
        Self {
            id: None,
            medicine_name: medicine_name.to_string(),
            brand_name: brand_name.map(str::to_string),
            unit_price,
            unit: unit.to_string(),
            disease_name: None,
            available: true,
            last_updated: None,
        }
    }
}
