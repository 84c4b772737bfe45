use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseSummary {
    pub name: String,
    pub severity: String,
    /// Percentage with one decimal, or "N/A"
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmSummary {
    pub size: f64,
    pub location: String,
    pub farmer_name: Option<String>,
}

/// Cost of treating the whole field with one medicine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentCost {
    pub medicine: String,
    pub brand: String,
    pub dosage: String,
    pub unit_price: f64,
    pub unit: String,
    /// In the catalog's bulk unit (liters or kg)
    pub quantity_needed: f64,
    /// Bulk unit of the dosage ("liter" or "kg"); the price unit when the
    /// dosage names none
    pub quantity_unit: String,
    pub medicine_cost: i64,
    pub equipment_cost: i64,
    pub application_cost: i64,
    pub total_min: i64,
    pub total_max: i64,
    /// False when no catalog row matched; medicine_cost is then 0
    pub price_found: bool,
    /// True when the dosage could not be parsed; quantity is then 0
    pub dosage_parse_failed: bool,
}

impl TreatmentCost {
    /// A zero medicine cost that is not a genuine price.
    pub fn is_incomplete(&self) -> bool {
        !self.price_found || self.dosage_parse_failed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub disease: DiseaseSummary,
    pub farm: FarmSummary,
    pub primary: TreatmentCost,
    pub alternative: Option<TreatmentCost>,
    pub timeline: String,
    pub preventive_measures: String,
}

/// Result of a cost request. The two "no data" states are routine, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CostOutcome {
    NoDetection { message: String },
    NoTreatmentData { message: String },
    Estimate(Box<CostEstimate>),
}

impl CostOutcome {
    pub fn no_detection() -> Self {
        CostOutcome::NoDetection {
            message: "No disease detected yet. Upload an image for analysis first.".to_string(),
        }
    }

    pub fn no_treatment_data() -> Self {
        CostOutcome::NoTreatmentData {
            message: "Treatment information not available for this disease".to_string(),
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self, CostOutcome::Estimate(_))
    }

    pub fn estimate(&self) -> Option<&CostEstimate> {
        match self {
            CostOutcome::Estimate(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CostOutcome::NoDetection { message } | CostOutcome::NoTreatmentData { message } => {
                Some(message.as_str())
            }
            CostOutcome::Estimate(_) => None,
        }
    }
}

/// Flat wire shape: `{"hasData": false, "message": ...}` or `{"hasData": true, ...estimate}`.
impl Serialize for CostOutcome {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct NoData<'a> {
            has_data: bool,
            message: &'a str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct WithData<'a> {
            has_data: bool,
            #[serde(flatten)]
            estimate: &'a CostEstimate,
        }

        match self {
            CostOutcome::Estimate(estimate) => WithData {
                has_data: true,
                estimate: estimate.as_ref(),
            }
            .serialize(serializer),
            CostOutcome::NoDetection { message } | CostOutcome::NoTreatmentData { message } => {
                NoData {
                    has_data: false,
                    message: message.as_str(),
                }
                .serialize(serializer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_outcomes_serialize_flag_and_message() {
        let json = serde_json::to_value(CostOutcome::no_detection()).unwrap();
        assert_eq!(json["hasData"], false);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("No disease detected"));

        let outcome = CostOutcome::no_treatment_data();
        assert!(!outcome.has_data());
        assert!(outcome.estimate().is_none());
        assert_eq!(
            outcome.message(),
            Some("Treatment information not available for this disease")
        );
    }
}
