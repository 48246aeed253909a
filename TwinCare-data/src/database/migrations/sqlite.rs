use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_patients_table(conn)?;
    create_ehr_records_table(conn)?;
    create_vital_records_table(conn)?;
    create_vital_records_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the patients table
fn create_patients_table(conn: &Connection) -> Result<(), String> {
    info!("Creating patients table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS patients (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            gender TEXT NOT NULL,
            contact TEXT,
            conditions TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create the EHR records table, one row per clinician entry
fn create_ehr_records_table(conn: &Connection) -> Result<(), String> {
    info!("Creating ehr_records table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ehr_records (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            patient_id TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            diagnosis TEXT NOT NULL,
            treatment TEXT,
            medications TEXT NOT NULL,
            notes TEXT
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create the vital records table, one row per monitoring tick
fn create_vital_records_table(conn: &Connection) -> Result<(), String> {
    info!("Creating vital_records table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS vital_records (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            patient_id TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            heart_rate INTEGER NOT NULL,
            spo2 INTEGER NOT NULL,
            bp_sys INTEGER NOT NULL,
            bp_dia INTEGER NOT NULL,
            heart_risk REAL NOT NULL,
            respiratory_risk REAL NOT NULL,
            stress_level INTEGER NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create index on (patient_id, timestamp) for history queries
fn create_vital_records_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on vital_records (patient_id, timestamp)");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_vital_records_patient_timestamp
        ON vital_records (patient_id, timestamp DESC)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}
