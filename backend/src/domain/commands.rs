//! Domain-level command and result types.
//!
//! These structs are used by services inside the domain layer and are not
//! exposed over the public API. The REST layer maps the DTOs defined in the
//! `shared` crate to these internal types.

use chrono::{DateTime, NaiveDate, Utc};

use super::models::student::{Payment, Student};

/// Payment captured as part of enrollment
#[derive(Debug, Clone, PartialEq)]
pub struct InitialPayment {
    pub payment_date: Option<DateTime<Utc>>,
    pub amount: f64,
}

/// Input for enrolling a new student. Optional fields fall back to the
/// enrollment defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollStudentCommand {
    pub dni: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub medication: Option<String>,
    pub conditions: Option<String>,
    pub plan_type: String,
    pub active: Option<bool>,
    pub join_date: Option<DateTime<Utc>>,
    pub payment_due_date: Option<DateTime<Utc>>,
    pub payment_history: Vec<InitialPayment>,
}

/// Partial profile update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateStudentCommand {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub medication: Option<String>,
    pub conditions: Option<String>,
    pub plan_type: Option<String>,
    pub active: Option<bool>,
    pub join_date: Option<DateTime<Utc>>,
    pub payment_due_date: Option<DateTime<Utc>>,
}

/// The payment that was appended and the due date it produced
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPayment {
    pub payment: Payment,
    pub next_due_date: DateTime<Utc>,
}

/// Result of adding a payment through the service
#[derive(Debug, Clone)]
pub struct AddPaymentResult {
    pub student: Student,
    pub next_due_date: DateTime<Utc>,
}
