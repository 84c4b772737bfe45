use crate::logic::knowledge::normalize_name;
use serde::{Deserialize, Serialize};

/// Recorded state of one farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    #[serde(default)]
    pub farmer_name: Option<String>,
    pub soil_type: String,
    #[serde(default)]
    pub current_crop: String,
    /// Acres
    #[serde(default = "default_field_size")]
    pub field_size: f64,
    #[serde(default)]
    pub location: String,
}

fn default_field_size() -> f64 {
    1.0
}

impl FarmSnapshot {
    /// Only "" and the literal "None" mean nothing is planted; any other text
    /// is reported back as the current crop.
    pub fn has_current_crop(&self) -> bool {
        !self.current_crop.is_empty() && self.current_crop != "None"
    }

    /// Field size usable in cost arithmetic. Negative and NaN sizes count as zero.
    pub fn effective_field_size(&self) -> f64 {
        self.field_size.max(0.0)
    }
}

/// Latest sensor reading for a farm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IoTSnapshot {
    /// Percent
    #[serde(default)]
    pub soil_moisture: f64,
    /// Centimeters
    pub water_level: f64,
    /// Celsius
    #[serde(default)]
    pub temperature: f64,
    /// Percent
    #[serde(default)]
    pub humidity: f64,
}

/// One classifier result for one uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseDetection {
    pub disease_type: String,
    /// 0.0 - 1.0
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub image_reference: Option<String>,
    #[serde(default)]
    pub annotated_image_reference: Option<String>,
}

impl DiseaseDetection {
    /// Classifier labels that mean no disease was found.
    pub fn is_healthy(&self) -> bool {
        matches!(
            normalize_name(&self.disease_type).as_str(),
            "healthy" | "normal"
        )
    }
}

/// Everything the deriver looks at for one request.
#[derive(Debug, Clone, Copy)]
pub struct FarmInputs<'a> {
    pub farm: &'a FarmSnapshot,
    pub iot: Option<&'a IoTSnapshot>,
    pub detection: Option<&'a DiseaseDetection>,
}

impl<'a> FarmInputs<'a> {
    pub fn new(farm: &'a FarmSnapshot) -> Self {
        Self {
            farm,
            iot: None,
            detection: None,
        }
    }

    pub fn with_iot(mut self, iot: Option<&'a IoTSnapshot>) -> Self {
        self.iot = iot;
        self
    }

    pub fn with_detection(mut self, detection: Option<&'a DiseaseDetection>) -> Self {
        self.detection = detection;
        self
    }
}

/// On-disk form of a request: a farm plus its optional readings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub farm: FarmSnapshot,
    #[serde(default)]
    pub iot: Option<IoTSnapshot>,
    #[serde(default)]
    pub detection: Option<DiseaseDetection>,
}

impl SnapshotFile {
    pub fn inputs(&self) -> FarmInputs<'_> {
        FarmInputs::new(&self.farm)
            .with_iot(self.iot.as_ref())
            .with_detection(self.detection.as_ref())
    }
}

// Snapshots arrive deserialized from snapshot files; these builders only
// serve hand-written fixtures.
#[cfg(test)]
impl FarmSnapshot {
    pub fn new(soil_type: impl Into<String>, field_size: f64) -> Self {
        Self {
            farmer_name: None,
            soil_type: soil_type.into(),
            current_crop: String::new(),
            field_size,
            location: String::new(),
        }
    }

    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        self.current_crop = crop.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

#[cfg(test)]
impl IoTSnapshot {
    pub fn with_water_level(water_level: f64) -> Self {
        Self {
            soil_moisture: 0.0,
            water_level,
            temperature: 0.0,
            humidity: 0.0,
        }
    }
}

#[cfg(test)]
impl DiseaseDetection {
    pub fn new(disease_type: impl Into<String>, confidence: f64) -> Self {
        Self {
            disease_type: disease_type.into(),
            confidence,
            severity: None,
            image_reference: None,
            annotated_image_reference: None,
        }
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_images(mut self, image: impl Into<String>, annotated: Option<String>) -> Self {
        self.image_reference = Some(image.into());
        self.annotated_image_reference = annotated;
        self
    }
}
