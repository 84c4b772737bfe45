use serde::{Deserialize, Serialize};

pub const NONE_TEXT: &str = "None";
pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterAdvice {
    /// No sensor reading available
    #[default]
    #[serde(rename = "Check water levels")]
    CheckLevels,
    #[serde(rename = "water_low")]
    Low,
    #[serde(rename = "water_high")]
    High,
    #[serde(rename = "water_optimal")]
    Optimal,
}

impl WaterAdvice {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterAdvice::CheckLevels => "Check water levels",
            WaterAdvice::Low => "water_low",
            WaterAdvice::High => "water_high",
            WaterAdvice::Optimal => "water_optimal",
        }
    }

    /// Text shown to the farmer for each advisory code.
    pub fn description(&self) -> &'static str {
        match self {
            WaterAdvice::CheckLevels => "No sensor data. Check field water levels manually.",
            WaterAdvice::Low => "Water level is low. Irrigate the field.",
            WaterAdvice::High => "Water level is high. Drain excess water.",
            WaterAdvice::Optimal => "Water level is optimal.",
        }
    }
}

impl std::fmt::Display for WaterAdvice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dashboard advice for one farm, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub crop_suggestion: String,
    pub water_advice: WaterAdvice,
    pub disease_detected: String,
    pub medicine_suggestion: String,
    pub medicine_secondary: String,
    pub dosage: String,
    pub preventive_measures: String,
    pub timeline: String,
    pub confidence: f64,
    pub severity: String,
    pub image_reference: Option<String>,
    pub annotated_image_reference: Option<String>,
}

impl Default for Recommendation {
    fn default() -> Self {
        Self {
            crop_suggestion: "Keep monitoring".to_string(),
            water_advice: WaterAdvice::CheckLevels,
            disease_detected: NONE_TEXT.to_string(),
            medicine_suggestion: NONE_TEXT.to_string(),
            medicine_secondary: NONE_TEXT.to_string(),
            dosage: NOT_APPLICABLE.to_string(),
            preventive_measures: "Monitor regularly".to_string(),
            timeline: "Monitor regularly".to_string(),
            confidence: 0.0,
            severity: "Low".to_string(),
            image_reference: None,
            annotated_image_reference: None,
        }
    }
}

impl Recommendation {
    pub fn has_disease(&self) -> bool {
        self.disease_detected != NONE_TEXT
    }

    /// Period-separated clauses of the preventive measures text.
    pub fn preventive_steps(&self) -> Vec<&str> {
        split_clauses(&self.preventive_measures)
    }

    /// Period-separated steps of the treatment timeline.
    pub fn timeline_steps(&self) -> Vec<&str> {
        split_clauses(&self.timeline)
    }
}

fn split_clauses(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_disease() {
        let rec = Recommendation::default();
        assert!(!rec.has_disease());
        assert_eq!(rec.medicine_suggestion, "None");
        assert_eq!(rec.medicine_secondary, "None");
        assert_eq!(rec.dosage, "N/A");
        assert_eq!(rec.confidence, 0.0);
        assert_eq!(rec.severity, "Low");
        assert_eq!(rec.water_advice, WaterAdvice::CheckLevels);
    }

    #[test]
    fn water_advice_serializes_as_code() {
        assert_eq!(
            serde_json::to_string(&WaterAdvice::Low).unwrap(),
            "\"water_low\""
        );
        assert_eq!(
            serde_json::to_string(&WaterAdvice::CheckLevels).unwrap(),
            "\"Check water levels\""
        );
        assert_eq!(WaterAdvice::Optimal.to_string(), "water_optimal");
    }

    #[test]
    fn splits_period_separated_text() {
        let rec = Recommendation {
            timeline: "Spray now. Repeat after 10 days.  ".to_string(),
            ..Recommendation::default()
        };
        assert_eq!(rec.timeline_steps(), vec!["Spray now", "Repeat after 10 days"]);
        assert_eq!(rec.preventive_steps(), vec!["Monitor regularly"]);
    }
}
