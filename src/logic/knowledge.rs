//! In-memory knowledge base lookups.
//!
//! Tables are loaded from the store once per request and only read here.

use crate::models::{
    CropKnowledgeEntry, DiseaseDetection, DiseaseKnowledgeEntry, MedicinePriceEntry,
};
use std::collections::BTreeMap;
use tracing::debug;

pub const GENERIC_MEDICINE: &str = "Consult local expert";
pub const GENERIC_PREVENTIVE: &str = "Quarantine affected area";
pub const GENERIC_TIMELINE: &str = "Immediate action required";

/// Lowercase, underscores to spaces, collapse and trim whitespace.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// How a detected disease maps onto the treatment table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Treatment<'a> {
    Matched(&'a DiseaseKnowledgeEntry),
    /// Unknown disease; advise consulting an expert
    Generic,
    /// Healthy/Normal label with no table row
    Healthy,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub crops: Vec<CropKnowledgeEntry>,
    pub diseases: Vec<DiseaseKnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new(crops: Vec<CropKnowledgeEntry>, diseases: Vec<DiseaseKnowledgeEntry>) -> Self {
        Self { crops, diseases }
    }

    /// First crop row for the soil type. Water availability tiers are not
    /// consulted, so row order decides between tiers.
    pub fn crop_for_soil(&self, soil_type: &str) -> Option<&CropKnowledgeEntry> {
        let soil = soil_type.trim();
        self.crops
            .iter()
            .find(|c| c.soil_type.trim().eq_ignore_ascii_case(soil))
    }

    /// Resolve a classifier label to a treatment row.
    ///
    /// An exact normalized match anywhere in the table wins. Otherwise the
    /// first row, in table order, whose name contains the label or is
    /// contained in it.
    pub fn match_disease(&self, label: &str) -> Option<&DiseaseKnowledgeEntry> {
        let target = normalize_name(label);
        if target.is_empty() {
            return None;
        }

        let exact = self
            .diseases
            .iter()
            .find(|d| d.names().any(|n| normalize_name(n) == target));
        if exact.is_some() {
            return exact;
        }

        let partial = self.diseases.iter().find(|d| {
            d.names().map(normalize_name).any(|name| {
                !name.is_empty() && (target.contains(&name) || name.contains(&target))
            })
        });
        if let Some(entry) = partial {
            debug!(label, matched = %entry.disease_name, "Partial disease name match");
        }
        partial
    }

    pub fn treatment_for(&self, detection: &DiseaseDetection) -> Treatment<'_> {
        match self.match_disease(&detection.disease_type) {
            Some(entry) => Treatment::Matched(entry),
            None if detection.is_healthy() => Treatment::Healthy,
            None => {
                debug!(
                    disease = %detection.disease_type,
                    "No knowledge base entry, using generic advice"
                );
                Treatment::Generic
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty() && self.diseases.is_empty()
    }
}

/// Medicine price rows, keyed by medicine name.
#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    pub entries: Vec<MedicinePriceEntry>,
}

impl PriceCatalog {
    pub fn new(entries: Vec<MedicinePriceEntry>) -> Self {
        Self { entries }
    }

    /// Case-insensitive exact name match, preferring rows marked available.
    pub fn find(&self, medicine_name: &str) -> Option<&MedicinePriceEntry> {
        if medicine_name.trim().is_empty() {
            return None;
        }
        let matches = |e: &&MedicinePriceEntry| same_medicine(&e.medicine_name, medicine_name);

        self.entries
            .iter()
            .filter(matches)
            .find(|e| e.available)
            .or_else(|| self.entries.iter().find(matches))
    }

    /// Catalog rows grouped under the disease they treat.
    ///
    /// A row's own `disease_name` wins; otherwise it is listed under every
    /// disease naming it as primary or secondary medicine. Rows tied to no
    /// disease are left out, and each group lists a medicine once.
    pub fn medicines_by_disease(
        &self,
        kb: &KnowledgeBase,
    ) -> BTreeMap<String, Vec<&MedicinePriceEntry>> {
        let mut grouped: BTreeMap<String, Vec<&MedicinePriceEntry>> = BTreeMap::new();

        for entry in &self.entries {
            let groups: Vec<String> = match entry
                .disease_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                Some(name) => vec![name.to_string()],
                None => kb
                    .diseases
                    .iter()
                    .filter(|d| {
                        same_medicine(&d.medicine, &entry.medicine_name)
                            || d
                                .secondary_medicine()
                                .is_some_and(|m| same_medicine(m, &entry.medicine_name))
                    })
                    .map(|d| d.disease_name.clone())
                    .collect(),
            };

            for group in groups {
                let list = grouped.entry(group).or_default();
                if !list
                    .iter()
                    .any(|m| same_medicine(&m.medicine_name, &entry.medicine_name))
                {
                    list.push(entry);
                }
            }
        }

        for list in grouped.values_mut() {
            list.sort_by(|a, b| a.medicine_name.cmp(&b.medicine_name));
        }
        grouped
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn same_medicine(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
