use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Knowledge base and price catalog
    r#"
    CREATE TABLE IF NOT EXISTS kb_crops (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        soil_type TEXT NOT NULL,
        water_availability TEXT NOT NULL,
        recommended_crop TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS kb_diseases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        disease_name TEXT NOT NULL UNIQUE,
        medicine TEXT NOT NULL,
        medicine_secondary TEXT,
        dosage TEXT NOT NULL,
        dosage_amount REAL,
        dosage_unit TEXT,
        dosage_basis TEXT,
        preventive_measures TEXT NOT NULL DEFAULT '',
        timeline TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS kb_disease_aliases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        disease_id INTEGER NOT NULL REFERENCES kb_diseases(id) ON DELETE CASCADE,
        alias TEXT NOT NULL,
        UNIQUE(disease_id, alias)
    );

    CREATE TABLE IF NOT EXISTS medicine_prices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        medicine_name TEXT NOT NULL,
        brand_name TEXT,
        unit_price REAL NOT NULL,
        unit TEXT NOT NULL DEFAULT 'liter',
        disease_name TEXT,
        available INTEGER NOT NULL DEFAULT 1,
        last_updated TEXT
    );

    CREATE TABLE IF NOT EXISTS schema_migrations (
        version INTEGER PRIMARY KEY,
        applied_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    // Migration 2: Add indexes
    r#"
    CREATE INDEX IF NOT EXISTS idx_kb_crops_soil_type
        ON kb_crops(soil_type);
    CREATE INDEX IF NOT EXISTS idx_kb_disease_aliases_disease_id
        ON kb_disease_aliases(disease_id);
    CREATE INDEX IF NOT EXISTS idx_medicine_prices_name
        ON medicine_prices(medicine_name COLLATE NOCASE);
    "#,
];

pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        // Ensure schema_migrations table exists
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        // Get current version
        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        // Apply pending migrations
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                tracing::info!("Applying migration {}", version);
                let tx = conn.transaction()?;
                tx.execute_batch(migration)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version) VALUES (?1)",
                    [version],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    })
}
