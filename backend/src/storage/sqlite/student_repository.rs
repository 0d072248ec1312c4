use std::collections::HashMap;
use std::ops::Range;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

use super::connection::DbConnection;
use crate::domain::models::student::{Payment, Student};
use crate::storage::traits::StudentStorage;

const STUDENT_COLUMNS: &str = r#"
    dni, name, last_name, email, phone, birth_date, medication, conditions,
    plan_type, active, join_date, payment_due_date, created_at, updated_at
"#;

/// SQLite repository for students and their attendance and payment history
#[derive(Clone)]
pub struct StudentRepository {
    db: DbConnection,
}

impl StudentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Map a `students` row; history is attached by the caller
    fn student_from_row(row: &SqliteRow) -> Result<Student> {
        Ok(Student {
            dni: row.try_get("dni")?,
            name: row.try_get("name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            birth_date: row.try_get("birth_date")?,
            medication: row.try_get("medication")?,
            conditions: row.try_get("conditions")?,
            plan_type: row.try_get("plan_type")?,
            active: row.try_get("active")?,
            join_date: row.try_get("join_date")?,
            attendance_log: Vec::new(),
            payment_history: Vec::new(),
            payment_due_date: row.try_get("payment_due_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn payment_from_row(row: &SqliteRow) -> Result<Payment> {
        Ok(Payment {
            id: row.try_get("id")?,
            payment_date: row.try_get("payment_date")?,
            amount: row.try_get("amount")?,
        })
    }

    async fn attendance_for(conn: &mut SqliteConnection, dni: &str) -> Result<Vec<DateTime<Utc>>> {
        let rows = sqlx::query(
            r#"
            SELECT checked_in_at
            FROM attendance
            WHERE dni = ?
            ORDER BY id ASC
            "#,
        )
        .bind(dni)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<DateTime<Utc>, _>("checked_in_at")?))
            .collect()
    }

    async fn payments_for(conn: &mut SqliteConnection, dni: &str) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, payment_date, amount
            FROM payments
            WHERE dni = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(dni)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(Self::payment_from_row).collect()
    }
}

#[async_trait]
impl StudentStorage for StudentRepository {
    async fn store_student(&self, student: &Student) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(&format!(
            "INSERT INTO students ({STUDENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&student.dni)
        .bind(&student.name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.birth_date)
        .bind(&student.medication)
        .bind(&student.conditions)
        .bind(&student.plan_type)
        .bind(student.active)
        .bind(student.join_date)
        .bind(student.payment_due_date)
        .bind(student.created_at)
        .bind(student.updated_at)
        .execute(&mut *tx)
        .await?;

        for checked_in_at in &student.attendance_log {
            sqlx::query("INSERT INTO attendance (dni, checked_in_at) VALUES (?, ?)")
                .bind(&student.dni)
                .bind(checked_in_at)
                .execute(&mut *tx)
                .await?;
        }

        for payment in &student.payment_history {
            sqlx::query("INSERT INTO payments (id, dni, payment_date, amount) VALUES (?, ?, ?, ?)")
                .bind(payment.id)
                .bind(&student.dni)
                .bind(payment.payment_date)
                .bind(payment.amount)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_student(&self, dni: &str) -> Result<Option<Student>> {
        // One transaction so the profile and both histories come from the same snapshot
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(&format!("SELECT {STUDENT_COLUMNS} FROM students WHERE dni = ?"))
            .bind(dni)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut student = Self::student_from_row(&row)?;
        student.attendance_log = Self::attendance_for(&mut tx, dni).await?;
        student.payment_history = Self::payments_for(&mut tx, dni).await?;

        tx.commit().await?;
        Ok(Some(student))
    }

    async fn list_students(&self) -> Result<Vec<Student>> {
        let mut tx = self.db.pool().begin().await?;

        let rows = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY last_name ASC, name ASC"
        ))
        .fetch_all(&mut *tx)
        .await?;

        let mut attendance: HashMap<String, Vec<DateTime<Utc>>> = HashMap::new();
        for row in sqlx::query("SELECT dni, checked_in_at FROM attendance ORDER BY id ASC")
            .fetch_all(&mut *tx)
            .await?
        {
            let dni: String = row.try_get("dni")?;
            attendance.entry(dni).or_default().push(row.try_get("checked_in_at")?);
        }

        let mut payments: HashMap<String, Vec<Payment>> = HashMap::new();
        for row in sqlx::query("SELECT dni, id, payment_date, amount FROM payments ORDER BY seq ASC")
            .fetch_all(&mut *tx)
            .await?
        {
            let dni: String = row.try_get("dni")?;
            payments.entry(dni).or_default().push(Self::payment_from_row(&row)?);
        }

        tx.commit().await?;

        rows.iter()
            .map(|row| {
                let mut student = Self::student_from_row(row)?;
                student.attendance_log = attendance.remove(&student.dni).unwrap_or_default();
                student.payment_history = payments.remove(&student.dni).unwrap_or_default();
                Ok(student)
            })
            .collect()
    }

    async fn update_student(&self, student: &Student, expected_due_date: Option<DateTime<Utc>>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET name = ?, last_name = ?, email = ?, phone = ?, birth_date = ?,
                medication = ?, conditions = ?, plan_type = ?, active = ?,
                join_date = ?, payment_due_date = ?, updated_at = ?
            WHERE dni = ? AND payment_due_date IS ?
            "#,
        )
        .bind(&student.name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.birth_date)
        .bind(&student.medication)
        .bind(&student.conditions)
        .bind(&student.plan_type)
        .bind(student.active)
        .bind(student.join_date)
        .bind(student.payment_due_date)
        .bind(student.updated_at)
        .bind(&student.dni)
        .bind(expected_due_date)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_attendance(
        &self,
        dni: &str,
        checked_in_at: DateTime<Utc>,
        day: Range<DateTime<Utc>>,
    ) -> Result<bool> {
        // Timestamps are stored as UTC RFC 3339 text, which sorts chronologically.
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (dni, checked_in_at)
            SELECT ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM attendance
                WHERE dni = ? AND checked_in_at >= ? AND checked_in_at < ?
            )
            "#,
        )
        .bind(dni)
        .bind(checked_in_at)
        .bind(dni)
        .bind(day.start)
        .bind(day.end)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_payment(
        &self,
        dni: &str,
        payment: &Payment,
        expected_due_date: Option<DateTime<Utc>>,
        next_due_date: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE students
            SET payment_due_date = ?, updated_at = ?
            WHERE dni = ? AND payment_due_date IS ?
            "#,
        )
        .bind(next_due_date)
        .bind(payment.payment_date)
        .bind(dni)
        .bind(expected_due_date)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Ok(false);
        }

        sqlx::query("INSERT INTO payments (id, dni, payment_date, amount) VALUES (?, ?, ?, ?)")
            .bind(payment.id)
            .bind(dni)
            .bind(payment.payment_date)
            .bind(payment.amount)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_student(&self, dni: &str) -> Result<bool> {
        // Attendance and payments go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM students WHERE dni = ?")
            .bind(dni)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
