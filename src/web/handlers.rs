use std::sync::Arc;

use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::reject_submission;
use crate::core::enrollment::{EnrollmentService, WRONG_DATA_MESSAGE};
use crate::core::{
    AddStudentOutcome, Enrollment, EnrollmentForm, EnrollmentRepository, EnrollmentView, Lookups,
    StudentMatch,
};
use crate::utils::error::{EnrollError, Result};
use crate::utils::validation::{self, FieldErrors};

type Service<R> = State<Arc<EnrollmentService<R>>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterQuery {
    pub course_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentRequest {
    pub course_id: Option<i32>,
    pub student_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub term: String,
}

fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn require_id(raw: &str) -> Result<i32> {
    parse_id(raw)
        .ok_or_else(|| EnrollError::bad_request(format!("'{}' is not a valid enrollment id", raw)))
}

fn json_body(payload: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| EnrollError::bad_request(rejection.body_text()))
}

fn query_from<T>(payload: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    payload
        .map(|Query(query)| query)
        .map_err(|rejection| EnrollError::bad_request(rejection.body_text()))
}

fn form_params<T>(payload: std::result::Result<Form<T>, FormRejection>) -> Result<T> {
    payload
        .map(|Form(params)| params)
        .map_err(|rejection| EnrollError::bad_request(rejection.body_text()))
}

fn integer_field(fields: &Map<String, Value>, name: &str) -> Result<Option<i32>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| EnrollError::InvalidValueError {
                field: name.to_string(),
                value: value.to_string(),
                reason: "expected integer".to_string(),
            }),
    }
}

fn number_field(fields: &Map<String, Value>, name: &str) -> Result<Option<f64>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| EnrollError::InvalidValueError {
                field: name.to_string(),
                value: value.to_string(),
                reason: "expected number".to_string(),
            }),
    }
}

fn required_integer(fields: &Map<String, Value>, name: &str) -> Result<Option<i32>> {
    let value = integer_field(fields, name)?;
    validation::validate_required_field(name, &value)?;
    Ok(value)
}

/// Binds a submitted enrollment field by field, so that every missing or
/// wrongly typed value is reported at once. Only a body that is not a JSON
/// object is a bad request.
fn bind_form(body: &Value) -> Result<EnrollmentForm> {
    let fields = body
        .as_object()
        .ok_or_else(|| EnrollError::bad_request("Expected a JSON object"))?;

    let mut errors = FieldErrors::new();
    let form = EnrollmentForm {
        id: errors.check(integer_field(fields, "id")).flatten(),
        course_id: errors.check(required_integer(fields, "courseId")).flatten(),
        student_id: errors.check(required_integer(fields, "studentId")).flatten(),
        lecturer_id: errors.check(integer_field(fields, "lecturerId")).flatten(),
        grade: errors.check(number_field(fields, "grade")).flatten(),
    };
    errors.into_result()?;
    Ok(form)
}

pub async fn list<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
) -> Result<Json<Vec<EnrollmentView>>> {
    Ok(Json(service.list().await?))
}

pub async fn roster<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
    query: std::result::Result<Query<RosterQuery>, QueryRejection>,
) -> Result<Json<Vec<EnrollmentView>>> {
    let query = query_from(query)?;
    Ok(Json(service.list_by_course(query.course_id).await?))
}

pub async fn details<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
    Path(raw): Path<String>,
) -> Result<Json<Enrollment>> {
    Ok(Json(service.get(parse_id(&raw)).await?))
}

pub async fn create<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match json_body(payload) {
        Ok(body) => body,
        Err(e) => return e.into_response(),
    };
    let form = match bind_form(&body) {
        Ok(form) => form,
        Err(e) => return reject_submission(body, e),
    };

    match service.create(&form).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => reject_submission(body, e),
    }
}

pub async fn add_student<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
    payload: std::result::Result<Json<AddStudentRequest>, JsonRejection>,
) -> Json<AddStudentOutcome> {
    match payload {
        Ok(Json(request)) => Json(
            service
                .add_student_to_course(request.course_id, request.student_id)
                .await,
        ),
        Err(rejection) => {
            tracing::debug!("Guarded add rejected: {}", rejection.body_text());
            Json(AddStudentOutcome::failure(WRONG_DATA_MESSAGE))
        }
    }
}

pub async fn edit<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
    Path(raw): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    let (id, body) = match require_id(&raw).and_then(|id| Ok((id, json_body(payload)?))) {
        Ok(parsed) => parsed,
        Err(e) => return e.into_response(),
    };
    let form = match bind_form(&body) {
        Ok(form) => form,
        Err(e) => return reject_submission(body, e),
    };

    match service.update(id, &form).await {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => reject_submission(body, e),
    }
}

pub async fn remove<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
    Path(raw): Path<String>,
) -> Result<StatusCode> {
    service.delete(require_id(&raw)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_students<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<StudentMatch>>> {
    let query = query_from(query)?;
    Ok(Json(service.search_students_by_name(&query.term).await?))
}

pub async fn search_students_form<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
    params: std::result::Result<Form<SearchQuery>, FormRejection>,
) -> Result<Json<Vec<StudentMatch>>> {
    let query = form_params(params)?;
    Ok(Json(service.search_students_by_name(&query.term).await?))
}

pub async fn lookups<R: EnrollmentRepository + 'static>(
    State(service): Service<R>,
) -> Result<Json<Lookups>> {
    Ok(Json(service.lookups().await?))
}
