use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A gym student as exchanged with clients.
///
/// Field names match the JSON the front desk client already speaks, which
/// mixes camelCase with a few Spanish names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// National identity document number, unique per student
    pub dni: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(deserialize_with = "flexible_date::date")]
    pub birth_date: NaiveDate,
    /// Current medication, "Ninguno" when none was given
    #[serde(rename = "medicamento")]
    pub medication: String,
    /// Known medical conditions, "Ninguna" when none was given
    #[serde(rename = "patologias")]
    pub conditions: String,
    pub plan_type: String,
    #[serde(rename = "activo")]
    pub active: bool,
    pub join_date: DateTime<Utc>,
    /// Check-in timestamps in insertion order
    #[serde(rename = "asistencias")]
    pub attendance_log: Vec<DateTime<Utc>>,
    pub payment_history: Vec<PaymentRecord>,
    pub payment_due_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: Uuid,
    pub payment_date: DateTime<Utc>,
    pub amount: f64,
}

/// Payment supplied at enrollment time, before it has been assigned an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentRecord {
    /// Defaults to the enrollment moment when omitted
    #[serde(default, deserialize_with = "flexible_date::timestamp_opt")]
    pub payment_date: Option<DateTime<Utc>>,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub dni: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(deserialize_with = "flexible_date::date")]
    pub birth_date: NaiveDate,
    #[serde(default, rename = "medicamento")]
    pub medication: Option<String>,
    #[serde(default, rename = "patologias")]
    pub conditions: Option<String>,
    pub plan_type: String,
    #[serde(default, rename = "activo")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "flexible_date::timestamp_opt")]
    pub join_date: Option<DateTime<Utc>>,
    /// Defaults to 30 days after enrollment when omitted
    #[serde(default, deserialize_with = "flexible_date::timestamp_opt")]
    pub payment_due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_history: Vec<NewPaymentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentResponse {
    pub success: bool,
    pub message: String,
    pub new_student: Student,
}

/// Partial update of a student. Absent fields are left untouched; the DNI
/// itself cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::date_opt")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, rename = "medicamento")]
    pub medication: Option<String>,
    #[serde(default, rename = "patologias")]
    pub conditions: Option<String>,
    #[serde(default)]
    pub plan_type: Option<String>,
    #[serde(default, rename = "activo")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "flexible_date::timestamp_opt")]
    pub join_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_date::timestamp_opt")]
    pub payment_due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentResponse {
    pub success: bool,
    pub message: String,
    pub updated_student: Student,
}

/// Amount sent with a payment. Clients send either a JSON number or a
/// numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentAmount {
    Number(f64),
    Text(String),
}

impl PaymentAmount {
    /// Numeric value of the amount, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PaymentAmount::Number(value) => Some(*value),
            PaymentAmount::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPaymentRequest {
    #[serde(default)]
    pub amount: Option<PaymentAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPaymentResponse {
    pub success: bool,
    pub message: String,
    pub student: Student,
    #[serde(rename = "nuevoVencimiento")]
    pub next_due_date: DateTime<Utc>,
}

/// Acknowledgement for operations that do not return a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Lenient date parsing for incoming JSON.
///
/// Accepts RFC 3339 timestamps as well as bare `YYYY-MM-DD` dates, which
/// are read as midnight UTC.
pub mod flexible_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
        let input = input.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
            return Some(timestamp.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn parse_date(input: &str) -> Option<NaiveDate> {
        let input = input.trim();
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .or_else(|| parse_timestamp(input).map(|timestamp| timestamp.date_naive()))
    }

    pub fn date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
    }

    pub fn date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: {raw}"))),
            None => Ok(None),
        }
    }

    pub fn timestamp_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}
