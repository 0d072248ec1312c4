pub mod connection;
pub mod student_repository;

pub use connection::DbConnection;
pub use student_repository::StudentRepository;
