//! Payment recording and due-date rollover.

use chrono::{DateTime, Utc};

use crate::domain::calendar::advance_due_date;
use crate::domain::commands::RecordedPayment;
use crate::domain::errors::StudentError;
use crate::domain::models::student::{validate_amount, Payment, Student};

/// Append a payment of `amount` made at `now` and roll the due date forward
/// one month from the current due date, or from the join date when the
/// student has none.
///
/// On error the student is left unchanged.
pub fn record_payment(student: &mut Student, amount: f64, now: DateTime<Utc>) -> Result<RecordedPayment, StudentError> {
    let amount = validate_amount(amount)?;
    let base = student.payment_due_date.unwrap_or(student.join_date);
    let next_due_date = advance_due_date(&base)?;

    let payment = Payment::new(now, amount);
    student.payment_history.push(payment.clone());
    student.payment_due_date = Some(next_due_date);
    student.updated_at = now;

    Ok(RecordedPayment {
        payment,
        next_due_date,
    })
}
