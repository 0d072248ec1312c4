pub mod error;
pub mod mappers;
pub mod student_apis;

pub use error::ApiError;
