use rusqlite::types::Type;
use rusqlite::{ErrorCode, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::ehr::EhrRecord;
use crate::models::patient::PatientRecord;
use crate::models::vitals::VitalRecord;
use super::errors::RepositoryError;

/// Database storage operations for patients, EHR entries and vitals
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Store a new patient in the database
    pub async fn insert_patient(pool: &DatabasePool, patient: &PatientRecord) -> Result<(), RepositoryError> {
        debug!("Storing patient in database: id={}", patient.id);

        let conn = pool.get()?;
        let conditions = serde_json::to_string(&patient.conditions)?;

        let result = conn.execute(
            "INSERT INTO patients (id, name, age, gender, contact, conditions, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                &patient.id,
                &patient.name,
                patient.age,
                &patient.gender,
                &patient.contact,
                &conditions,
                &patient.created_at,
            ),
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                Err(RepositoryError::Conflict(patient.id.clone()))
            }
            Err(e) => Err(RepositoryError::Sqlite(e)),
        }
    }

    /// Get a patient by id
    pub async fn get_patient(pool: &DatabasePool, id: &str) -> Result<Option<PatientRecord>, RepositoryError> {
        debug!("Getting patient from database: id={}", id);

        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, age, gender, contact, conditions, created_at
             FROM patients WHERE id = ?1"
        )?;

        match stmt.query_row([id], patient_from_row) {
            Ok(patient) => Ok(Some(patient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RepositoryError::Sqlite(e)),
        }
    }

    /// All patients, oldest registration first
    pub async fn list_patients(pool: &DatabasePool) -> Result<Vec<PatientRecord>, RepositoryError> {
        debug!("Listing patients from database");

        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, age, gender, contact, conditions, created_at
             FROM patients ORDER BY created_at ASC, id ASC"
        )?;

        let patients = stmt.query_map([], patient_from_row)?;

        let mut result = Vec::new();
        for patient in patients {
            result.push(patient?);
        }

        Ok(result)
    }

    /// Append an EHR entry
    pub async fn append_ehr_record(pool: &DatabasePool, record: &EhrRecord) -> Result<(), RepositoryError> {
        debug!("Storing EHR record in database: id={}, patient={}", record.id, record.patient_id);

        let conn = pool.get()?;
        let medications = serde_json::to_string(&record.medications)?;

        conn.execute(
            "INSERT INTO ehr_records (id, patient_id, timestamp, diagnosis, treatment, medications, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                &record.id,
                &record.patient_id,
                &record.timestamp,
                &record.diagnosis,
                &record.treatment,
                &medications,
                &record.notes,
            ),
        )?;

        Ok(())
    }

    /// EHR entries for a patient in insertion order
    pub async fn list_ehr_records(pool: &DatabasePool, patient_id: &str) -> Result<Vec<EhrRecord>, RepositoryError> {
        debug!("Listing EHR records from database: patient={}", patient_id);

        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, patient_id, timestamp, diagnosis, treatment, medications, notes
             FROM ehr_records WHERE patient_id = ?1 ORDER BY seq ASC"
        )?;

        let records = stmt.query_map([patient_id], |row| {
            Ok(EhrRecord {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                timestamp: row.get(2)?,
                diagnosis: row.get(3)?,
                treatment: row.get(4)?,
                medications: json_column(row, 5)?,
                notes: row.get(6)?,
            })
        })?;

        let mut result = Vec::new();
        for record in records {
            result.push(record?);
        }

        Ok(result)
    }

    /// Append a vitals entry; the returned record carries the assigned sequence
    pub async fn append_vital_record(pool: &DatabasePool, record: VitalRecord) -> Result<VitalRecord, RepositoryError> {
        debug!("Storing vital record in database: id={}, patient={}", record.id, record.patient_id);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO vital_records
             (id, patient_id, timestamp, heart_rate, spo2, bp_sys, bp_dia, heart_risk, respiratory_risk, stress_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            (
                &record.id,
                &record.patient_id,
                &record.timestamp,
                record.heart_rate,
                record.spo2,
                record.bp_sys,
                record.bp_dia,
                record.heart_risk,
                record.respiratory_risk,
                record.stress_level,
            ),
        )?;

        Ok(VitalRecord {
            seq: conn.last_insert_rowid(),
            ..record
        })
    }

    /// Vitals entries for a patient, most recent first
    pub async fn list_vital_records(
        pool: &DatabasePool,
        patient_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<VitalRecord>, RepositoryError> {
        debug!("Listing vital records from database: patient={}, limit={:?}", patient_id, limit);

        // SQLite treats a negative LIMIT as unbounded
        let limit_val: i64 = limit.map(|l| l as i64).unwrap_or(-1);

        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, seq, patient_id, timestamp, heart_rate, spo2, bp_sys, bp_dia,
                    heart_risk, respiratory_risk, stress_level
             FROM vital_records WHERE patient_id = ?1
             ORDER BY timestamp DESC, seq DESC LIMIT ?2"
        )?;

        let records = stmt.query_map((patient_id, limit_val), |row| {
            Ok(VitalRecord {
                id: row.get(0)?,
                seq: row.get(1)?,
                patient_id: row.get(2)?,
                timestamp: row.get(3)?,
                heart_rate: row.get(4)?,
                spo2: row.get(5)?,
                bp_sys: row.get(6)?,
                bp_dia: row.get(7)?,
                heart_risk: row.get(8)?,
                respiratory_risk: row.get(9)?,
                stress_level: row.get(10)?,
            })
        })?;

        let mut result = Vec::new();
        for record in records {
            result.push(record?);
        }

        Ok(result)
    }
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<PatientRecord> {
    Ok(PatientRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        contact: row.get(4)?,
        conditions: json_column(row, 5)?,
        created_at: row.get(6)?,
    })
}

/// Decode a JSON-encoded list column
fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
