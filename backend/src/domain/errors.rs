use thiserror::Error;

/// Failures surfaced by student operations.
///
/// Display strings are the messages returned to clients.
#[derive(Debug, Error)]
pub enum StudentError {
    #[error("Ya se registró un ingreso hoy")]
    AlreadyCheckedInToday,

    #[error("El monto debe ser un número positivo")]
    InvalidAmount,

    #[error("Estudiante no encontrado")]
    NotFound { dni: String },

    #[error("El estudiante ya existe")]
    AlreadyExists { dni: String },

    #[error("{0}")]
    Validation(String),

    #[error("El estudiante fue modificado al mismo tiempo, intente nuevamente")]
    ConcurrentUpdate { dni: String },

    #[error("La fecha de vencimiento está fuera de rango")]
    DateOutOfRange,

    #[error("Error de almacenamiento: {0}")]
    Storage(#[from] anyhow::Error),
}

impl StudentError {
    pub fn not_found(dni: &str) -> Self {
        StudentError::NotFound {
            dni: dni.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        StudentError::Validation(message.into())
    }
}
