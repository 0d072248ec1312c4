//! Student service: orchestrates lookups, the pure domain rules and persistence.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::attendance::local_day_bounds;
use crate::domain::clock::Clock;
use crate::domain::commands::{AddPaymentResult, EnrollStudentCommand, UpdateStudentCommand};
use crate::domain::errors::StudentError;
use crate::domain::models::student::Student;
use crate::domain::payments::record_payment;
use crate::storage::{Connection, StudentStorage};

/// Read-modify-write attempts before a write that keeps losing to concurrent
/// changes of the same student gives up with `ConcurrentUpdate`.
const MAX_WRITE_ATTEMPTS: usize = 5;

/// Service for managing gym students
#[derive(Clone)]
pub struct StudentService<C: Connection> {
    student_repository: C::StudentRepository,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> StudentService<C> {
    pub fn new(connection: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            clock,
        }
    }

    /// Enroll a new student, applying defaults for every unset optional field
    pub async fn enroll_student(&self, command: EnrollStudentCommand) -> Result<Student, StudentError> {
        info!("Enrolling student: dni={}", command.dni.trim());

        let student = Student::enroll(command, self.clock.now())?;

        if self.student_repository.get_student(&student.dni).await?.is_some() {
            warn!("Student already exists: {}", student.dni);
            return Err(StudentError::AlreadyExists { dni: student.dni });
        }

        self.student_repository.store_student(&student).await?;

        info!("Enrolled student: {} with DNI: {}", student.full_name(), student.dni);
        Ok(student)
    }

    /// Get a student by DNI
    pub async fn get_student(&self, dni: &str) -> Result<Student, StudentError> {
        match self.student_repository.get_student(dni).await? {
            Some(student) => Ok(student),
            None => {
                warn!("Student not found: {}", dni);
                Err(StudentError::not_found(dni))
            }
        }
    }

    /// List all students
    pub async fn list_students(&self) -> Result<Vec<Student>, StudentError> {
        let students = self.student_repository.list_students().await?;
        info!("Found {} students", students.len());
        Ok(students)
    }

    /// Update profile fields of an existing student
    pub async fn update_student(&self, dni: &str, command: UpdateStudentCommand) -> Result<Student, StudentError> {
        info!("Updating student: {}", dni);

        let student = self
            .modify_student(dni, |student, now| student.apply_update(command.clone(), now))
            .await?;

        info!("Updated student: {} with DNI: {}", student.full_name(), student.dni);
        Ok(student)
    }

    /// Register today's check-in. A second check-in on the same local
    /// calendar day is rejected.
    pub async fn check_in(&self, dni: &str) -> Result<Student, StudentError> {
        let mut student = self.get_student(dni).await?;
        let now = self.clock.now_local();

        let checked_in_at = match student.check_in(&now) {
            Ok(checked_in_at) => checked_in_at,
            Err(e) => {
                warn!("Rejected check-in for {}: {}", dni, e);
                return Err(e);
            }
        };

        // Storage re-checks the day, so a concurrent check-in cannot slip in twice.
        let day = local_day_bounds(&now)?;
        if !self.student_repository.append_attendance(dni, checked_in_at, day).await? {
            warn!("Rejected check-in for {}: recorded concurrently", dni);
            return Err(StudentError::AlreadyCheckedInToday);
        }

        info!("Checked in student {} at {}", dni, checked_in_at);
        Ok(student)
    }

    /// Record a payment and roll the due date forward one month.
    ///
    /// `amount` is `None` when the request carried no usable number.
    pub async fn add_payment(&self, dni: &str, amount: Option<f64>) -> Result<AddPaymentResult, StudentError> {
        info!("Adding payment for {}: {:?}", dni, amount);

        let mut student = self.get_student(dni).await?;
        let amount = amount.ok_or(StudentError::InvalidAmount)?;

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let expected_due_date = student.payment_due_date;
            let recorded = record_payment(&mut student, amount, self.clock.now())?;

            let written = self
                .student_repository
                .append_payment(dni, &recorded.payment, expected_due_date, recorded.next_due_date)
                .await?;
            if written {
                info!(
                    "Recorded payment of {:.2} for {}; next due date {}",
                    recorded.payment.amount, dni, recorded.next_due_date
                );
                return Ok(AddPaymentResult {
                    student,
                    next_due_date: recorded.next_due_date,
                });
            }

            warn!("Due date of {} changed during payment (attempt {}), reloading", dni, attempt);
            student = self.get_student(dni).await?;
        }

        warn!("Giving up payment for {} after {} attempts", dni, MAX_WRITE_ATTEMPTS);
        Err(StudentError::ConcurrentUpdate { dni: dni.to_string() })
    }

    /// Soft delete: mark the student inactive and keep the record
    pub async fn deactivate_student(&self, dni: &str) -> Result<Student, StudentError> {
        info!("Deactivating student: {}", dni);

        self.modify_student(dni, |student, now| {
            student.deactivate(now);
            Ok(())
        })
        .await
    }

    /// Hard delete: remove the student and all of its history
    pub async fn delete_student(&self, dni: &str) -> Result<Student, StudentError> {
        info!("Deleting student: {}", dni);

        let student = self.get_student(dni).await?;
        if !self.student_repository.delete_student(dni).await? {
            return Err(StudentError::not_found(dni));
        }

        info!("Deleted student: {} with DNI: {}", student.full_name(), student.dni);
        Ok(student)
    }

    /// Load, change and write back a student's profile. The write only lands
    /// if no payment moved the due date in between; otherwise it reloads and
    /// reapplies `change`.
    async fn modify_student<F>(&self, dni: &str, mut change: F) -> Result<Student, StudentError>
    where
        F: FnMut(&mut Student, DateTime<Utc>) -> Result<(), StudentError> + Send,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut student = self.get_student(dni).await?;
            let expected_due_date = student.payment_due_date;
            change(&mut student, self.clock.now())?;

            if self.student_repository.update_student(&student, expected_due_date).await? {
                return Ok(student);
            }
            warn!("Student {} changed during update (attempt {}), reloading", dni, attempt);
        }

        warn!("Giving up update of {} after {} attempts", dni, MAX_WRITE_ATTEMPTS);
        Err(StudentError::ConcurrentUpdate { dni: dni.to_string() })
    }
}
