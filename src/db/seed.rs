//! Starter knowledge base for rice farms.
//!
//! Tables are only filled while empty, so administrator edits survive restarts.

use crate::db::Database;
use crate::error::Result;
use crate::models::{CropKnowledgeEntry, DiseaseKnowledgeEntry, MedicinePriceEntry};

pub fn crops() -> Vec<CropKnowledgeEntry> {
    vec![
        CropKnowledgeEntry::new("fertile", "high", "BPT 5204 (Samba Masuri)"),
        CropKnowledgeEntry::new("fertile", "medium", "MTU 1010"),
        CropKnowledgeEntry::new("non-fertile", "low", "Sahbhagi Dhan"),
    ]
}

pub fn diseases() -> Vec<DiseaseKnowledgeEntry> {
    vec![
        DiseaseKnowledgeEntry::new("Bacterial Leaf Blight", "Copper Oxychloride", "500g/acre")
            .with_secondary("Streptocycline")
            .with_alias("Bacterial Leaf Blight (BLB)")
            .with_alias("bacterial_leaf_blight")
            .with_guidance(
                "Improve drainage, avoid nitrogen overdose",
                "Spray immediately, repeat after 10 days",
            ),
        DiseaseKnowledgeEntry::new("Brown Spot", "Mancozeb", "2.5g/liter")
            .with_secondary("Propiconazole")
            .with_alias("brown_spot")
            .with_guidance(
                "Use potassium fertilizer, clean field boundaries",
                "Spray at tillering stage, repeat every 15 days",
            ),
        DiseaseKnowledgeEntry::new("Blast", "Tricyclazole 75 WP", "0.6g/liter")
            .with_secondary("Isoprothiolane")
            .with_guidance(
                "Use resistant varieties, remove infected straw",
                "Spray at early appearance, repeat if rain occurs",
            ),
        DiseaseKnowledgeEntry::new("Sheath Blight", "Hexaconazole", "2ml/liter")
            .with_secondary("Validamycin")
            .with_guidance(
                "Reduce seeding rate, avoid excess urea",
                "Spray when lesions appear, check after 7 days",
            ),
        DiseaseKnowledgeEntry::new("Tungro", "Imidacloprid (for vector)", "0.5ml/liter")
            .with_secondary("Thiamethoxam")
            .with_guidance(
                "Control Green Leaf Hopper vector, destroy infected plants",
                "Monitor vector population, spray weekly",
            ),
        DiseaseKnowledgeEntry::new("Hispa", "Chlorpyriphos 20% EC", "2.5ml/L")
            .with_secondary("Quinalphos 25 EC")
            .with_guidance(
                "Clip leaf tips of seedlings, removing eggs",
                "Spray when damage is noticed",
            ),
        DiseaseKnowledgeEntry::new("Dead Heart", "Chlorantraniliprole 18.5% SC", "150ml/ha")
            .with_secondary("Cartap Hydrochloride")
            .with_alias("dead_heart")
            .with_guidance("Install pheromone traps", "Apply granules at 15 DAT"),
        DiseaseKnowledgeEntry::new("Downy Mildew", "Metalaxyl + Mancozeb", "2.5g/L")
            .with_secondary("Fosetyl-Al")
            .with_alias("downy_mildew")
            .with_guidance(
                "Remove infected plants",
                "Spray preventively in humid weather",
            ),
    ]
}

/// Prices in INR per liter or kg.
pub fn prices() -> Vec<MedicinePriceEntry> {
    [
        ("Copper Oxychloride", "Blitox", 450.0, "kg"),
        ("Streptocycline", "Plantomycin", 1200.0, "kg"),
        ("Mancozeb", "Dithane M-45", 380.0, "kg"),
        ("Propiconazole", "Tilt", 1800.0, "liter"),
        ("Tricyclazole 75 WP", "Beam", 1550.0, "kg"),
        ("Isoprothiolane", "Fujione", 1650.0, "liter"),
        ("Hexaconazole", "Contaf", 1900.0, "liter"),
        ("Validamycin", "Sheathmar", 2200.0, "liter"),
        ("Imidacloprid (for vector)", "Confidor", 850.0, "liter"),
        ("Thiamethoxam", "Actara", 1100.0, "kg"),
        ("Chlorpyriphos 20% EC", "Dursban", 520.0, "liter"),
        ("Quinalphos 25 EC", "Ekalux", 480.0, "liter"),
        ("Chlorantraniliprole 18.5% SC", "Coragen", 3500.0, "liter"),
        ("Cartap Hydrochloride", "Padan", 950.0, "kg"),
        ("Metalaxyl + Mancozeb", "Ridomil Gold", 1350.0, "kg"),
        ("Fosetyl-Al", "Aliette", 1750.0, "kg"),
    ]
    .into_iter()
    .map(|(name, brand, price, unit)| MedicinePriceEntry::new(name, Some(brand), price, unit))
    .collect()
}

pub fn run(db: &Database) -> Result<()> {
    let counts = db.table_counts()?;

    if counts.crops == 0 {
        tracing::info!("Seeding crop knowledge base");
        for entry in crops() {
            db.insert_crop_entry(&entry)?;
        }
    }

    if counts.diseases == 0 {
        tracing::info!("Seeding disease knowledge base");
        for entry in diseases() {
            db.insert_disease_entry(&entry)?;
        }
    }

    if counts.medicines == 0 {
        tracing::info!("Seeding medicine price catalog");
        for entry in prices() {
            db.insert_medicine_price(&entry)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_seeded_dosage_parses() {
        for entry in diseases() {
            assert!(
                entry.dosage_spec.is_some(),
                "dosage for {} did not parse: {}",
                entry.disease_name,
                entry.dosage
            );
        }
    }

    #[test]
    fn every_seeded_medicine_is_priced() {
        let catalog = crate::logic::PriceCatalog::new(prices());
        for entry in diseases() {
            assert!(catalog.find(&entry.medicine).is_some(), "{}", entry.medicine);
            if let Some(secondary) = entry.secondary_medicine() {
                assert!(catalog.find(secondary).is_some(), "{}", secondary);
            }
        }
    }
}
