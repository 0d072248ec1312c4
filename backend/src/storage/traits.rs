//! # Storage Traits
//!
//! Storage abstraction used by the domain layer, so the student service does
//! not depend on a particular database.

use std::ops::Range;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::student::{Payment, Student};

/// Trait defining the interface for student storage operations
#[async_trait]
pub trait StudentStorage: Send + Sync {
    /// Store a new student together with any initial payments and check-ins
    async fn store_student(&self, student: &Student) -> Result<()>;

    /// Retrieve a student by DNI, including attendance and payment history
    async fn get_student(&self, dni: &str) -> Result<Option<Student>>;

    /// List all students ordered by last name, then name
    async fn list_students(&self) -> Result<Vec<Student>>;

    /// Overwrite the profile fields of an existing student.
    /// Attendance and payment history are not touched.
    ///
    /// Writes only if the stored due date still equals `expected_due_date`;
    /// returns false, writing nothing, when it changed or the student is gone.
    async fn update_student(&self, student: &Student, expected_due_date: Option<DateTime<Utc>>) -> Result<bool>;

    /// Append one entry to the attendance log unless the student already has
    /// one inside `day`. Returns false when the day was already taken.
    async fn append_attendance(
        &self,
        dni: &str,
        checked_in_at: DateTime<Utc>,
        day: Range<DateTime<Utc>>,
    ) -> Result<bool>;

    /// Append a payment and move the due date from `expected_due_date` to
    /// `next_due_date` in one transaction.
    ///
    /// Returns false, writing nothing, when the stored due date no longer
    /// equals `expected_due_date` or the student is gone.
    async fn append_payment(
        &self,
        dni: &str,
        payment: &Payment,
        expected_due_date: Option<DateTime<Utc>>,
        next_due_date: DateTime<Utc>,
    ) -> Result<bool>;

    /// Remove a student and all of its history.
    /// Returns true if the student existed.
    async fn delete_student(&self, dni: &str) -> Result<bool>;
}

/// Trait defining the interface for storage connections
///
/// Abstracts the connection type and acts as a factory for repositories,
/// so the domain layer can work with any storage backend.
pub trait Connection: Send + Sync + Clone {
    /// The type of StudentStorage this connection creates
    type StudentRepository: StudentStorage + Clone;

    /// Create a new student repository for this connection
    fn create_student_repository(&self) -> Self::StudentRepository;
}
