pub mod student;

pub use student::{Payment, Student};
