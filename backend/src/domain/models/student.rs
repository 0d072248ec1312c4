//! Domain model for a gym student.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::attendance::record_check_in;
use crate::domain::commands::{EnrollStudentCommand, UpdateStudentCommand};
use crate::domain::errors::StudentError;

pub const DEFAULT_MEDICATION: &str = "Ninguno";
pub const DEFAULT_CONDITIONS: &str = "Ninguna";
/// Days between enrollment and the first due date when none is given
pub const DEFAULT_DUE_DAYS: i64 = 30;
pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub payment_date: DateTime<Utc>,
    pub amount: f64,
}

impl Payment {
    pub fn new(payment_date: DateTime<Utc>, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            payment_date,
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub dni: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub medication: String,
    pub conditions: String,
    pub plan_type: String,
    pub active: bool,
    pub join_date: DateTime<Utc>,
    pub attendance_log: Vec<DateTime<Utc>>,
    pub payment_history: Vec<Payment>,
    /// Absent only on records that predate due-date tracking
    pub payment_due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Build a new student from an enrollment command, filling every unset
    /// optional field with its default:
    ///
    /// - medication: `"Ninguno"`, conditions: `"Ninguna"`
    /// - active: `true`
    /// - join date: `now`
    /// - payment due date: `now` + 30 days
    /// - payment dates of initial payments: `now`
    pub fn enroll(command: EnrollStudentCommand, now: DateTime<Utc>) -> Result<Self, StudentError> {
        let dni = command.dni.trim().to_string();
        if dni.is_empty() {
            return Err(StudentError::validation("El DNI es obligatorio"));
        }

        let name = required_name(&command.name, "nombre")?;
        let last_name = required_name(&command.last_name, "apellido")?;
        let email = required_text(&command.email, "email")?;
        let phone = required_text(&command.phone, "teléfono")?;
        let plan_type = required_text(&command.plan_type, "plan")?;
        validate_birth_date(command.birth_date, now)?;

        let mut payment_history = Vec::with_capacity(command.payment_history.len());
        for initial in command.payment_history {
            validate_amount(initial.amount)?;
            payment_history.push(Payment::new(
                initial.payment_date.unwrap_or(now),
                initial.amount,
            ));
        }

        Ok(Self {
            dni,
            name,
            last_name,
            email,
            phone,
            birth_date: command.birth_date,
            medication: text_or_default(command.medication, DEFAULT_MEDICATION),
            conditions: text_or_default(command.conditions, DEFAULT_CONDITIONS),
            plan_type,
            active: command.active.unwrap_or(true),
            join_date: command.join_date.unwrap_or(now),
            attendance_log: Vec::new(),
            payment_history,
            payment_due_date: Some(
                command
                    .payment_due_date
                    .unwrap_or(now + Duration::days(DEFAULT_DUE_DAYS)),
            ),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. Validation happens before any field changes,
    /// so a rejected update leaves the student untouched.
    pub fn apply_update(&mut self, command: UpdateStudentCommand, now: DateTime<Utc>) -> Result<(), StudentError> {
        let name = command
            .name
            .as_deref()
            .map(|name| required_name(name, "nombre"))
            .transpose()?;
        let last_name = command
            .last_name
            .as_deref()
            .map(|last_name| required_name(last_name, "apellido"))
            .transpose()?;
        let email = command
            .email
            .as_deref()
            .map(|email| required_text(email, "email"))
            .transpose()?;
        let phone = command
            .phone
            .as_deref()
            .map(|phone| required_text(phone, "teléfono"))
            .transpose()?;
        let plan_type = command
            .plan_type
            .as_deref()
            .map(|plan| required_text(plan, "plan"))
            .transpose()?;
        if let Some(birth_date) = command.birth_date {
            validate_birth_date(birth_date, now)?;
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(plan_type) = plan_type {
            self.plan_type = plan_type;
        }
        if let Some(birth_date) = command.birth_date {
            self.birth_date = birth_date;
        }
        if let Some(medication) = command.medication {
            self.medication = text_or_default(Some(medication), DEFAULT_MEDICATION);
        }
        if let Some(conditions) = command.conditions {
            self.conditions = text_or_default(Some(conditions), DEFAULT_CONDITIONS);
        }
        if let Some(active) = command.active {
            self.active = active;
        }
        if let Some(join_date) = command.join_date {
            self.join_date = join_date;
        }
        if let Some(payment_due_date) = command.payment_due_date {
            self.payment_due_date = Some(payment_due_date);
        }

        self.updated_at = now;
        Ok(())
    }

    /// Check the student in at `now`, returning the recorded timestamp.
    pub fn check_in<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<DateTime<Utc>, StudentError> {
        self.attendance_log = record_check_in(&self.attendance_log, now)?;
        Ok(now.with_timezone(&Utc))
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.updated_at = now;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}

/// Reject amounts that are not positive finite numbers
pub fn validate_amount(amount: f64) -> Result<f64, StudentError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(StudentError::InvalidAmount)
    }
}

fn required_text(value: &str, field: &str) -> Result<String, StudentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StudentError::validation(format!("El campo {field} es obligatorio")));
    }
    Ok(trimmed.to_string())
}

fn required_name(value: &str, field: &str) -> Result<String, StudentError> {
    let trimmed = required_text(value, field)?;
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(StudentError::validation(format!(
            "El campo {field} no puede superar {MAX_NAME_LENGTH} caracteres"
        )));
    }
    Ok(trimmed)
}

fn validate_birth_date(birth_date: NaiveDate, now: DateTime<Utc>) -> Result<(), StudentError> {
    if birth_date > now.date_naive() {
        return Err(StudentError::validation(
            "La fecha de nacimiento no puede ser futura",
        ));
    }
    Ok(())
}

fn text_or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::InitialPayment;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 15, 0, 0).unwrap()
    }

    fn enroll_command() -> EnrollStudentCommand {
        EnrollStudentCommand {
            dni: " 12345678 ".to_string(),
            name: "Juan".to_string(),
            last_name: "Pérez".to_string(),
            email: "juan@example.com".to_string(),
            phone: "555-1234".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            medication: None,
            conditions: None,
            plan_type: "Premium".to_string(),
            active: None,
            join_date: None,
            payment_due_date: None,
            payment_history: vec![],
        }
    }

    #[test]
    fn test_enroll_applies_defaults() {
        let student = Student::enroll(enroll_command(), now()).unwrap();

        assert_eq!(student.dni, "12345678");
        assert_eq!(student.medication, DEFAULT_MEDICATION);
        assert_eq!(student.conditions, DEFAULT_CONDITIONS);
        assert!(student.active);
        assert_eq!(student.join_date, now());
        assert_eq!(student.payment_due_date, Some(now() + Duration::days(30)));
        assert!(student.attendance_log.is_empty());
        assert!(student.payment_history.is_empty());
    }

    #[test]
    fn test_enroll_keeps_explicit_values() {
        let join = Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2023, 2, 28, 0, 0, 0).unwrap();
        let command = EnrollStudentCommand {
            medication: Some("Salbutamol".to_string()),
            conditions: Some("Asma".to_string()),
            active: Some(false),
            join_date: Some(join),
            payment_due_date: Some(due),
            payment_history: vec![
                InitialPayment { payment_date: Some(join), amount: 5000.0 },
                InitialPayment { payment_date: None, amount: 3000.0 },
            ],
            ..enroll_command()
        };

        let student = Student::enroll(command, now()).unwrap();

        assert_eq!(student.medication, "Salbutamol");
        assert_eq!(student.conditions, "Asma");
        assert!(!student.active);
        assert_eq!(student.join_date, join);
        assert_eq!(student.payment_due_date, Some(due));
        assert_eq!(student.payment_history.len(), 2);
        assert_eq!(student.payment_history[0].payment_date, join);
        assert_eq!(student.payment_history[1].payment_date, now());
    }

    #[test]
    fn test_enroll_blank_medical_notes_fall_back_to_defaults() {
        let command = EnrollStudentCommand {
            medication: Some("   ".to_string()),
            conditions: Some(String::new()),
            ..enroll_command()
        };

        let student = Student::enroll(command, now()).unwrap();

        assert_eq!(student.medication, DEFAULT_MEDICATION);
        assert_eq!(student.conditions, DEFAULT_CONDITIONS);
    }

    #[test]
    fn test_enroll_validation_errors() {
        let missing_dni = EnrollStudentCommand { dni: "  ".to_string(), ..enroll_command() };
        assert!(matches!(Student::enroll(missing_dni, now()), Err(StudentError::Validation(_))));

        let missing_name = EnrollStudentCommand { name: String::new(), ..enroll_command() };
        assert!(matches!(Student::enroll(missing_name, now()), Err(StudentError::Validation(_))));

        let long_name = EnrollStudentCommand { name: "a".repeat(101), ..enroll_command() };
        assert!(matches!(Student::enroll(long_name, now()), Err(StudentError::Validation(_))));

        let future_birth = EnrollStudentCommand {
            birth_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            ..enroll_command()
        };
        assert!(matches!(Student::enroll(future_birth, now()), Err(StudentError::Validation(_))));

        let bad_payment = EnrollStudentCommand {
            payment_history: vec![InitialPayment { payment_date: None, amount: 0.0 }],
            ..enroll_command()
        };
        assert!(matches!(Student::enroll(bad_payment, now()), Err(StudentError::InvalidAmount)));
    }

    #[test]
    fn test_apply_update_changes_only_given_fields() {
        let mut student = Student::enroll(enroll_command(), now()).unwrap();
        let later = now() + Duration::days(3);

        student
            .apply_update(
                UpdateStudentCommand {
                    phone: Some("555-9999".to_string()),
                    plan_type: Some("Gold".to_string()),
                    ..Default::default()
                },
                later,
            )
            .unwrap();

        assert_eq!(student.phone, "555-9999");
        assert_eq!(student.plan_type, "Gold");
        assert_eq!(student.name, "Juan");
        assert_eq!(student.updated_at, later);
        assert_eq!(student.created_at, now());
    }

    #[test]
    fn test_rejected_update_leaves_student_untouched() {
        let mut student = Student::enroll(enroll_command(), now()).unwrap();
        let before = student.clone();

        let result = student.apply_update(
            UpdateStudentCommand {
                phone: Some("555-0000".to_string()),
                name: Some("   ".to_string()),
                ..Default::default()
            },
            now() + Duration::days(1),
        );

        assert!(matches!(result, Err(StudentError::Validation(_))));
        assert_eq!(student, before);
    }

    #[test]
    fn test_check_in_twice_same_day() {
        let mut student = Student::enroll(enroll_command(), now()).unwrap();

        let recorded = student.check_in(&now()).unwrap();
        assert_eq!(recorded, now());

        let again = student.check_in(&(now() + Duration::hours(2)));
        assert!(matches!(again, Err(StudentError::AlreadyCheckedInToday)));
        assert_eq!(student.attendance_log, vec![now()]);
    }

    #[test]
    fn test_deactivate() {
        let mut student = Student::enroll(enroll_command(), now()).unwrap();
        student.deactivate(now());

        assert!(!student.active);
        assert_eq!(student.full_name(), "Juan Pérez");
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount(100.0).unwrap(), 100.0);
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-5.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }
}
