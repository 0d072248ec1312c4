//! # Domain Module
//!
//! Business rules for the gym backend, independent of HTTP and of the
//! storage engine.
//!
//! ## Module Organization
//!
//! - **models**: the `Student` record and its enrollment defaults
//! - **attendance**: one check-in per local calendar day
//! - **calendar**: month arithmetic and the due-date rollover
//! - **payments**: payment validation and recording
//! - **student_service**: orchestration over storage for the REST layer
//! - **commands**: internal input/result types mapped from the public DTOs
//! - **clock**: injectable source of "now"
//!
//! ## Business Rules
//!
//! - A student is identified by DNI
//! - A student checks in at most once per calendar day
//! - Payments must be positive; each one moves the due date one month
//!   forward, keeping the billing day when the next month has it

pub mod attendance;
pub mod calendar;
pub mod clock;
pub mod commands;
pub mod errors;
pub mod models;
pub mod payments;
pub mod student_service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::StudentError;
pub use student_service::StudentService;
