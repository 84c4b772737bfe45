use crate::db::Database;
use crate::error::{CropCareError, Result};
use crate::logic::dosage::{Dosage, DosageBasis, DosageUnit};
use crate::logic::{KnowledgeBase, PriceCatalog};
use crate::models::{CropKnowledgeEntry, DiseaseKnowledgeEntry, MedicinePriceEntry};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use std::collections::HashMap;
use tracing::warn;

/// Row counts of the knowledge tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    pub crops: i64,
    pub diseases: i64,
    pub aliases: i64,
    pub medicines: i64,
}

impl Database {
    pub fn table_counts(&self) -> Result<TableCounts> {
        self.with_conn(|conn| {
            let count = |table: &str| -> rusqlite::Result<i64> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
            };
            Ok(TableCounts {
                crops: count("kb_crops")?,
                diseases: count("kb_diseases")?,
                aliases: count("kb_disease_aliases")?,
                medicines: count("medicine_prices")?,
            })
        })
    }

    /// Both knowledge tables, in entry order.
    pub fn load_knowledge_base(&self) -> Result<KnowledgeBase> {
        let crops = self.get_crop_entries()?;
        let diseases = self.get_disease_entries()?;
        tracing::debug!(
            crops = crops.len(),
            diseases = diseases.len(),
            "Loaded knowledge base"
        );
        Ok(KnowledgeBase::new(crops, diseases))
    }
}

// Crop Knowledge Queries

impl Database {
    pub fn insert_crop_entry(&self, entry: &CropKnowledgeEntry) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO kb_crops (soil_type, water_availability, recommended_crop)
                VALUES (?1, ?2, ?3)
                "#,
                params![
                    entry.soil_type,
                    entry.water_availability,
                    entry.recommended_crop
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_crop_entries(&self) -> Result<Vec<CropKnowledgeEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT soil_type, water_availability, recommended_crop FROM kb_crops ORDER BY id",
            )?;
            let crops = stmt
                .query_map([], |row| {
                    Ok(CropKnowledgeEntry {
                        soil_type: row.get("soil_type")?,
                        water_availability: row.get("water_availability")?,
                        recommended_crop: row.get("recommended_crop")?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(crops)
        })
    }
}

// Disease Knowledge Queries

impl Database {
    /// Store a treatment row and its aliases. The dosage text is parsed here,
    /// at entry time, and stored alongside the text.
    pub fn insert_disease_entry(&self, entry: &DiseaseKnowledgeEntry) -> Result<i64> {
        let dosage = entry.dosage_spec.or_else(|| Dosage::parse(&entry.dosage).ok());
        if dosage.is_none() {
            warn!(
                disease = %entry.disease_name,
                dosage = %entry.dosage,
                "Dosage could not be parsed; cost estimates will flag it"
            );
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                r#"
                INSERT INTO kb_diseases
                    (disease_name, medicine, medicine_secondary, dosage, dosage_amount,
                     dosage_unit, dosage_basis, preventive_measures, timeline)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    entry.disease_name,
                    entry.medicine,
                    entry.medicine_secondary,
                    entry.dosage,
                    dosage.map(|d| d.amount),
                    dosage.and_then(|d| d.unit).map(|u| u.as_str()),
                    dosage.map(|d| d.basis.as_str()),
                    entry.preventive_measures,
                    entry.timeline,
                ],
            )?;
            let id = tx.last_insert_rowid();

            for alias in &entry.aliases {
                tx.execute(
                    "INSERT OR IGNORE INTO kb_disease_aliases (disease_id, alias) VALUES (?1, ?2)",
                    params![id, alias],
                )?;
            }

            tx.commit()?;
            Ok(id)
        })
    }

    pub fn get_disease_entries(&self) -> Result<Vec<DiseaseKnowledgeEntry>> {
        self.with_conn(|conn| {
            let mut aliases: HashMap<i64, Vec<String>> = HashMap::new();
            let mut stmt =
                conn.prepare("SELECT disease_id, alias FROM kb_disease_aliases ORDER BY id")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>("disease_id")?, row.get::<_, String>("alias")?))
            })?;
            for row in rows {
                let (disease_id, alias) = row?;
                aliases.entry(disease_id).or_default().push(alias);
            }

            let mut stmt = conn.prepare("SELECT * FROM kb_diseases ORDER BY id")?;
            let mut diseases = stmt
                .query_map([], row_to_disease_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for entry in &mut diseases {
                if let Some(list) = entry.id.and_then(|id| aliases.remove(&id)) {
                    entry.aliases = list;
                }
            }
            Ok(diseases)
        })
    }

    /// Canonical disease names, alphabetically.
    pub fn list_disease_names(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT DISTINCT disease_name FROM kb_diseases ORDER BY disease_name")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(names)
        })
    }
}

fn row_to_disease_entry(row: &Row) -> rusqlite::Result<DiseaseKnowledgeEntry> {
    let disease_name: String = row.get("disease_name")?;
    let amount: Option<f64> = row.get("dosage_amount")?;
    let unit_str: Option<String> = row.get("dosage_unit")?;
    let basis_str: Option<String> = row.get("dosage_basis")?;

    let unit = unit_str.as_ref().and_then(|u| {
        u.parse::<DosageUnit>().ok().or_else(|| {
            warn!(disease = %disease_name, dosage_unit = %u, "Unknown dosage_unit in database, ignoring");
            None
        })
    });
    let basis = basis_str
        .as_ref()
        .and_then(|b| {
            b.parse::<DosageBasis>().ok().or_else(|| {
                warn!(disease = %disease_name, dosage_basis = %b, "Unknown dosage_basis in database, ignoring");
                None
            })
        })
        .unwrap_or_default();

    Ok(DiseaseKnowledgeEntry {
        id: Some(row.get("id")?),
        disease_name,
        aliases: Vec::new(),
        medicine: row.get("medicine")?,
        medicine_secondary: row.get("medicine_secondary")?,
        dosage: row.get("dosage")?,
        dosage_spec: amount.map(|amount| Dosage::new(amount, unit, basis)),
        preventive_measures: row.get("preventive_measures")?,
        timeline: row.get("timeline")?,
    })
}

// Medicine Price Queries

impl Database {
    pub fn insert_medicine_price(&self, entry: &MedicinePriceEntry) -> Result<i64> {
        if !entry.unit_price.is_finite() || entry.unit_price < 0.0 {
            return Err(CropCareError::InvalidData(format!(
                "unit price for {} must be non-negative",
                entry.medicine_name
            )));
        }

        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO medicine_prices
                    (medicine_name, brand_name, unit_price, unit, disease_name, available, last_updated)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    entry.medicine_name,
                    entry.brand_name,
                    entry.unit_price,
                    entry.unit,
                    entry.disease_name,
                    entry.available,
                    entry.last_updated.unwrap_or_else(Utc::now).to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Every catalog row, available or not, in entry order.
    pub fn load_price_catalog(&self) -> Result<PriceCatalog> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM medicine_prices ORDER BY id")?;
            let entries = stmt
                .query_map([], row_to_medicine_price)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(PriceCatalog::new(entries))
        })
    }

    pub fn available_medicines(&self) -> Result<Vec<MedicinePriceEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM medicine_prices WHERE available = 1 ORDER BY medicine_name",
            )?;
            let entries = stmt
                .query_map([], row_to_medicine_price)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
    }

    pub fn update_medicine_price(
        &self,
        id: i64,
        unit_price: f64,
        brand_name: Option<&str>,
        available: bool,
    ) -> Result<()> {
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(CropCareError::InvalidData(format!(
                "unit price must be non-negative, got {}",
                unit_price
            )));
        }

        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                r#"
                UPDATE medicine_prices SET
                    unit_price = ?1, brand_name = COALESCE(?2, brand_name),
                    available = ?3, last_updated = ?4
                WHERE id = ?5
                "#,
                params![unit_price, brand_name, available, Utc::now().to_rfc3339(), id],
            )?)
        })?;

        if changed == 0 {
            return Err(CropCareError::NotFound(format!("medicine price {}", id)));
        }
        Ok(())
    }
}

fn row_to_medicine_price(row: &Row) -> rusqlite::Result<MedicinePriceEntry> {
    let last_updated: Option<String> = row.get("last_updated")?;

    Ok(MedicinePriceEntry {
        id: Some(row.get("id")?),
        medicine_name: row.get("medicine_name")?,
        brand_name: row.get("brand_name")?,
        unit_price: row.get("unit_price")?,
        unit: row.get("unit")?,
        disease_name: row.get("disease_name")?,
        available: row.get("available")?,
        last_updated: last_updated.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }),
    })
}
