//! # REST API for Student Management
//!
//! Endpoints for enrolling, retrieving, updating, checking in, billing and
//! removing students. Paths keep the names the front desk client already
//! calls.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::{
    AddPaymentRequest, AddPaymentResponse, CreateStudentRequest, CreateStudentResponse, StatusResponse,
    UpdateStudentRequest, UpdateStudentResponse,
};
use tracing::info;

use super::error::ApiError;
use super::mappers::StudentMapper;
use crate::AppState;

/// Liveness check
pub async fn health() -> &'static str {
    "Gym management backend running"
}

/// List all students
pub async fn list_students(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/students");

    let students = state.student_service.list_students().await?;
    Ok(Json(StudentMapper::to_dto_list(students)))
}

/// Enroll a new student
pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    info!("POST /api/students/nuevo - dni: {}", request.dni);

    let command = StudentMapper::to_enroll_command(request);
    let student = state.student_service.enroll_student(command).await?;

    let response = CreateStudentResponse {
        success: true,
        message: "Estudiante creado exitosamente".to_string(),
        new_student: StudentMapper::to_dto(student),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a student by DNI
pub async fn get_student(
    State(state): State<AppState>,
    Path(dni): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/students/alumno/{}", dni);

    let student = state.student_service.get_student(&dni).await?;
    Ok(Json(StudentMapper::to_dto(student)))
}

/// Update a student's profile
pub async fn update_student(
    State(state): State<AppState>,
    Path(dni): Path<String>,
    payload: Result<Json<UpdateStudentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    info!("PUT /api/students/actualizar/{} - request: {:?}", dni, request);

    let command = StudentMapper::to_update_command(request);
    let student = state.student_service.update_student(&dni, command).await?;

    Ok(Json(UpdateStudentResponse {
        success: true,
        message: "Estudiante actualizado exitosamente".to_string(),
        updated_student: StudentMapper::to_dto(student),
    }))
}

/// Record a payment and advance the due date
pub async fn add_payment(
    State(state): State<AppState>,
    Path(dni): Path<String>,
    payload: Result<Json<AddPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    info!("POST /api/students/agregar-pago/{} - amount: {:?}", dni, request.amount);

    let amount = request.amount.and_then(|amount| amount.as_f64());
    let result = state.student_service.add_payment(&dni, amount).await?;

    Ok(Json(AddPaymentResponse {
        success: true,
        message: "Pago agregado exitosamente".to_string(),
        student: StudentMapper::to_dto(result.student),
        next_due_date: result.next_due_date,
    }))
}

/// Register a check-in for today
pub async fn check_in(
    State(state): State<AppState>,
    Path(dni): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("/api/students/ingresa/{}", dni);

    let student = state.student_service.check_in(&dni).await?;
    Ok(Json(StudentMapper::to_dto(student)))
}

/// Soft delete: mark the student inactive
pub async fn deactivate_student(
    State(state): State<AppState>,
    Path(dni): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/students/baja/{}", dni);

    let student = state.student_service.deactivate_student(&dni).await?;
    Ok(Json(StatusResponse {
        success: true,
        message: format!("Estudiante {} dado de baja", student.full_name()),
    }))
}

/// Hard delete: remove the student and its history
pub async fn delete_student(
    State(state): State<AppState>,
    Path(dni): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/students/eliminar/{}", dni);

    let student = state.student_service.delete_student(&dni).await?;
    Ok(Json(StatusResponse {
        success: true,
        message: format!("Estudiante {} eliminado", student.full_name()),
    }))
}
