use shared::{
    CreateStudentRequest, NewPaymentRecord, PaymentRecord, Student as SharedStudent, UpdateStudentRequest,
};

use crate::domain::commands::{EnrollStudentCommand, InitialPayment, UpdateStudentCommand};
use crate::domain::models::student::{Payment, Student as DomainStudent};

/// Mapper to convert between shared student DTOs and domain types.
pub struct StudentMapper;

impl StudentMapper {
    /// Converts a domain Student to a shared Student DTO.
    pub fn to_dto(domain: DomainStudent) -> SharedStudent {
        // Records without a due date have never been billed; report the join
        // date, which is also what the next payment will roll from.
        let payment_due_date = domain.payment_due_date.unwrap_or(domain.join_date);

        SharedStudent {
            dni: domain.dni,
            name: domain.name,
            last_name: domain.last_name,
            email: domain.email,
            phone: domain.phone,
            birth_date: domain.birth_date,
            medication: domain.medication,
            conditions: domain.conditions,
            plan_type: domain.plan_type,
            active: domain.active,
            join_date: domain.join_date,
            attendance_log: domain.attendance_log,
            payment_history: domain.payment_history.into_iter().map(Self::payment_to_dto).collect(),
            payment_due_date,
        }
    }

    pub fn to_dto_list(domain_students: Vec<DomainStudent>) -> Vec<SharedStudent> {
        domain_students.into_iter().map(Self::to_dto).collect()
    }

    pub fn payment_to_dto(domain: Payment) -> PaymentRecord {
        PaymentRecord {
            id: domain.id,
            payment_date: domain.payment_date,
            amount: domain.amount,
        }
    }

    pub fn to_enroll_command(dto: CreateStudentRequest) -> EnrollStudentCommand {
        EnrollStudentCommand {
            dni: dto.dni,
            name: dto.name,
            last_name: dto.last_name,
            email: dto.email,
            phone: dto.phone,
            birth_date: dto.birth_date,
            medication: dto.medication,
            conditions: dto.conditions,
            plan_type: dto.plan_type,
            active: dto.active,
            join_date: dto.join_date,
            payment_due_date: dto.payment_due_date,
            payment_history: dto
                .payment_history
                .into_iter()
                .map(Self::initial_payment_to_domain)
                .collect(),
        }
    }

    fn initial_payment_to_domain(dto: NewPaymentRecord) -> InitialPayment {
        InitialPayment {
            payment_date: dto.payment_date,
            amount: dto.amount,
        }
    }

    pub fn to_update_command(dto: UpdateStudentRequest) -> UpdateStudentCommand {
        UpdateStudentCommand {
            name: dto.name,
            last_name: dto.last_name,
            email: dto.email,
            phone: dto.phone,
            birth_date: dto.birth_date,
            medication: dto.medication,
            conditions: dto.conditions,
            plan_type: dto.plan_type,
            active: dto.active,
            join_date: dto.join_date,
            payment_due_date: dto.payment_due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn domain_student() -> DomainStudent {
        let joined = Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap();
        DomainStudent {
            dni: "1".to_string(),
            name: "Ana".to_string(),
            last_name: "Gómez".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 9, 22).unwrap(),
            medication: "Ninguno".to_string(),
            conditions: "Ninguna".to_string(),
            plan_type: "Familiar".to_string(),
            active: true,
            join_date: joined,
            attendance_log: vec![joined],
            payment_history: vec![Payment::new(joined, 2500.0)],
            payment_due_date: None,
            created_at: joined,
            updated_at: joined,
        }
    }

    #[test]
    fn test_to_dto_copies_history() {
        let domain = domain_student();
        let payment_id = domain.payment_history[0].id;

        let dto = StudentMapper::to_dto(domain.clone());

        assert_eq!(dto.dni, domain.dni);
        assert_eq!(dto.attendance_log, domain.attendance_log);
        assert_eq!(dto.payment_history.len(), 1);
        assert_eq!(dto.payment_history[0].id, payment_id);
        assert_eq!(dto.payment_history[0].amount, 2500.0);
    }

    #[test]
    fn test_to_dto_reports_join_date_when_due_date_missing() {
        let domain = domain_student();

        let dto = StudentMapper::to_dto(domain.clone());

        assert_eq!(dto.payment_due_date, domain.join_date);
    }

    #[test]
    fn test_to_enroll_command() {
        let request = CreateStudentRequest {
            dni: "1".to_string(),
            name: "Ana".to_string(),
            last_name: "Gómez".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 9, 22).unwrap(),
            medication: None,
            conditions: Some("Asma".to_string()),
            plan_type: "Básico".to_string(),
            active: None,
            join_date: None,
            payment_due_date: None,
            payment_history: vec![NewPaymentRecord {
                payment_date: None,
                amount: 3000.0,
            }],
        };

        let command = StudentMapper::to_enroll_command(request);

        assert_eq!(command.conditions.as_deref(), Some("Asma"));
        assert!(command.medication.is_none());
        assert_eq!(
            command.payment_history,
            vec![InitialPayment {
                payment_date: None,
                amount: 3000.0
            }]
        );
    }
}
