use chrono::{DateTime, SecondsFormat, Utc};
use twin_care_data::models::{ehr as data_ehr, patient as data_patient, vitals as data_vitals};

use crate::entities::ehr::{CreateEhrRecordRequest, EhrRecord};
use crate::entities::patient::Patient;
use crate::entities::vitals::{RiskScore, VitalReading, VitalRecord};

/// Conversion functions between domain entities and data models.
/// Functions follow the pattern convert_to_[target_layer]_[model_name].

/// Parse a stored RFC 3339 timestamp
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| format!("Invalid timestamp format: {}", raw))
}

/// Format a timestamp the way the data layer stores it
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Convert a domain patient to its storage model
pub fn convert_to_data_patient(patient: &Patient) -> data_patient::PatientRecord {
    data_patient::PatientRecord {
        id: patient.id.clone(),
        name: patient.name.clone(),
        age: patient.age,
        gender: patient.gender.clone(),
        contact: patient.contact.clone(),
        conditions: patient.conditions.clone(),
        created_at: format_timestamp(&patient.created_at),
    }
}

/// Convert a stored patient to the domain entity
pub fn convert_to_domain_patient(record: data_patient::PatientRecord) -> Result<Patient, String> {
    Ok(Patient {
        created_at: parse_timestamp(&record.created_at)?,
        id: record.id,
        name: record.name,
        age: record.age,
        gender: record.gender,
        contact: record.contact,
        conditions: record.conditions,
    })
}

/// Convert an EHR form to the data layer request, stamping the time when missing
pub fn convert_to_data_ehr_request(request: &CreateEhrRecordRequest) -> data_ehr::CreateEhrRecordRequest {
    data_ehr::CreateEhrRecordRequest {
        timestamp: format_timestamp(&request.timestamp.unwrap_or_else(Utc::now)),
        diagnosis: request.diagnosis.trim().to_string(),
        treatment: non_blank(&request.treatment),
        medications: request.medications.clone(),
        notes: non_blank(&request.notes),
    }
}

/// Convert a stored EHR record to the domain entity
pub fn convert_to_domain_ehr_record(record: data_ehr::EhrRecord) -> Result<EhrRecord, String> {
    Ok(EhrRecord {
        timestamp: parse_timestamp(&record.timestamp)?,
        id: record.id,
        patient_id: record.patient_id,
        diagnosis: record.diagnosis,
        treatment: record.treatment,
        medications: record.medications,
        notes: record.notes,
    })
}

/// Convert a reading and its score to the data layer append request
pub fn convert_to_data_vital_request(reading: &VitalReading, score: &RiskScore) -> data_vitals::CreateVitalRecordRequest {
    data_vitals::CreateVitalRecordRequest {
        heart_rate: reading.heart_rate,
        spo2: reading.spo2,
        bp_sys: reading.bp_sys,
        bp_dia: reading.bp_dia,
        heart_risk: score.heart_risk,
        respiratory_risk: score.respiratory_risk,
        stress_level: score.stress_level,
    }
}

/// Convert a stored vitals entry to the domain entity
pub fn convert_to_domain_vital_record(record: data_vitals::VitalRecord) -> Result<VitalRecord, String> {
    Ok(VitalRecord {
        timestamp: parse_timestamp(&record.timestamp)?,
        reading: VitalReading {
            heart_rate: record.heart_rate,
            spo2: record.spo2,
            bp_sys: record.bp_sys,
            bp_dia: record.bp_dia,
        },
        score: RiskScore {
            heart_risk: record.heart_risk,
            respiratory_risk: record.respiratory_risk,
            stress_level: record.stress_level,
        },
        id: record.id,
        patient_id: record.patient_id,
    })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_patient_round_trip_keeps_timestamp() {
        let patient = Patient {
            id: "jane_doe_20240301090000".to_string(),
            name: "Jane Doe".to_string(),
            age: 42,
            gender: "Female".to_string(),
            contact: None,
            conditions: vec!["asthma".to_string()],
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        };

        let stored = convert_to_data_patient(&patient);
        assert_eq!(stored.created_at, "2024-03-01T09:00:00.000000Z");
        assert_eq!(convert_to_domain_patient(stored).unwrap(), patient);
    }

    #[test]
    fn test_invalid_timestamp_is_reported() {
        let record = data_ehr::EhrRecord {
            id: "e1".to_string(),
            patient_id: "p1".to_string(),
            timestamp: "yesterday".to_string(),
            diagnosis: "flu".to_string(),
            treatment: None,
            medications: Vec::new(),
            notes: None,
        };

        let err = convert_to_domain_ehr_record(record).unwrap_err();
        assert!(err.contains("yesterday"));
    }

    #[test]
    fn test_ehr_request_drops_blank_optionals() {
        let request = CreateEhrRecordRequest {
            diagnosis: " flu ".to_string(),
            treatment: Some("  ".to_string()),
            medications: vec!["rest".to_string()],
            notes: Some("follow up".to_string()),
            timestamp: None,
        };

        let data_request = convert_to_data_ehr_request(&request);
        assert_eq!(data_request.diagnosis, "flu");
        assert_eq!(data_request.treatment, None);
        assert_eq!(data_request.notes.as_deref(), Some("follow up"));
        assert!(parse_timestamp(&data_request.timestamp).is_ok());
    }

    #[test]
    fn test_vital_record_conversion() {
        let stored = data_vitals::VitalRecord {
            id: "v1".to_string(),
            seq: 3,
            patient_id: "p1".to_string(),
            timestamp: "2024-03-01T09:00:00.123456Z".to_string(),
            heart_rate: 90,
            spo2: 96,
            bp_sys: 130,
            bp_dia: 85,
            heart_risk: 0.42,
            respiratory_risk: 0.1,
            stress_level: 1,
        };

        let record = convert_to_domain_vital_record(stored).unwrap();
        assert_eq!(record.reading, VitalReading { heart_rate: 90, spo2: 96, bp_sys: 130, bp_dia: 85 });
        assert_eq!(record.score.stress_level, 1);
        assert_eq!(record.timestamp.timestamp_subsec_micros(), 123456);
    }
}
