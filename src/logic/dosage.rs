//! Application-rate parsing.
//!
//! Knowledge-base rates are entered as free text ("500g/acre", "2.5ml/liter",
//! "150ml/ha"). They are parsed once, when the row is entered, into a
//! [`Dosage`]; cost arithmetic only ever sees the structured form.

use crate::error::{CropCareError, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DosageUnit {
    Milliliter,
    Gram,
    Kilogram,
    Liter,
}

impl DosageUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DosageUnit::Milliliter => "ml",
            DosageUnit::Gram => "g",
            DosageUnit::Kilogram => "kg",
            DosageUnit::Liter => "liter",
        }
    }

    /// Divisor from this unit to the catalog's bulk unit (liters or kg).
    pub fn bulk_divisor(&self) -> f64 {
        match self {
            DosageUnit::Milliliter | DosageUnit::Gram => 1000.0,
            DosageUnit::Kilogram | DosageUnit::Liter => 1.0,
        }
    }

    pub fn bulk_unit(&self) -> &'static str {
        match self {
            DosageUnit::Milliliter | DosageUnit::Liter => "liter",
            DosageUnit::Gram | DosageUnit::Kilogram => "kg",
        }
    }
}

impl FromStr for DosageUnit {
    type Err = CropCareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ml" | "milliliter" | "millilitre" => Ok(DosageUnit::Milliliter),
            "g" | "gram" | "grams" => Ok(DosageUnit::Gram),
            "kg" | "kilogram" | "kilograms" => Ok(DosageUnit::Kilogram),
            "l" | "liter" | "liters" | "litre" | "litres" => Ok(DosageUnit::Liter),
            other => Err(CropCareError::InvalidData(format!(
                "unknown dosage unit '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for DosageUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the amount is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DosageBasis {
    PerAcre,
    PerHectare,
    PerLiterWater,
    #[default]
    Unspecified,
}

impl DosageBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            DosageBasis::PerAcre => "per_acre",
            DosageBasis::PerHectare => "per_hectare",
            DosageBasis::PerLiterWater => "per_liter_water",
            DosageBasis::Unspecified => "unspecified",
        }
    }

}

impl FromStr for DosageBasis {
    type Err = CropCareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "per_acre" | "acre" | "acres" => Ok(DosageBasis::PerAcre),
            "per_hectare" | "ha" | "hectare" | "hectares" => Ok(DosageBasis::PerHectare),
            "per_liter_water" | "l" | "liter" | "litre" => Ok(DosageBasis::PerLiterWater),
            "unspecified" | "" => Ok(DosageBasis::Unspecified),
            other => Err(CropCareError::InvalidData(format!(
                "unknown dosage basis '{}'",
                other
            ))),
        }
    }
}

/// Structured application rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dosage {
    pub amount: f64,
    pub unit: Option<DosageUnit>,
    pub basis: DosageBasis,
}

fn dosage_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(\d+(?:\.\d+)?)\s*(?:(ml|kg|g|liters?|litres?|l)\b)?(?:\s*/\s*([a-z]+))?",
        )
        .expect("dosage pattern is valid")
    })
}

impl Dosage {
    pub fn new(amount: f64, unit: Option<DosageUnit>, basis: DosageBasis) -> Self {
        Self {
            amount,
            unit,
            basis,
        }
    }

    /// Parse free-text dosage. The first number is the amount; a unit token
    /// directly after it and a `/basis` suffix are both optional.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = dosage_regex()
            .captures(text)
            .ok_or_else(|| CropCareError::DosageParse(text.to_string()))?;

        let amount: f64 = caps[1]
            .parse()
            .map_err(|_| CropCareError::DosageParse(text.to_string()))?;

        let unit = caps.get(2).and_then(|m| m.as_str().parse().ok());
        let basis = caps
            .get(3)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or_default();

        Ok(Self {
            amount,
            unit,
            basis,
        })
    }

    /// Total quantity for `field_size` acres, in the catalog's bulk unit.
    ///
    /// The amount is applied once per acre whatever the basis; milliliters
    /// and grams are scaled down to liters and kilograms.
    pub fn quantity_for(&self, field_size: f64) -> f64 {
        let total = self.amount * field_size;
        match self.unit {
            Some(unit) => total / unit.bulk_divisor(),
            None => total,
        }
    }

    pub fn bulk_unit(&self) -> &'static str {
        self.unit.map(|u| u.bulk_unit()).unwrap_or("")
    }
}

impl std::fmt::Display for Dosage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.amount)?;
        if let Some(unit) = self.unit {
            write!(f, "{}", unit)?;
        }
        match self.basis {
            DosageBasis::PerAcre => write!(f, "/acre"),
            DosageBasis::PerHectare => write!(f, "/ha"),
            DosageBasis::PerLiterWater => write!(f, "/liter"),
            DosageBasis::Unspecified => Ok(()),
        }
    }
}
