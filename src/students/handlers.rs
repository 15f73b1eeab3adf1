use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    auth::extractors::{AdminSession, CurrentSession},
    error::AppError,
    state::AppState,
    storage::RecordStore,
};

use super::dto::{
    DashboardView, DeleteParams, DeleteResponse, FormMode, FormView, SearchQuery, StudentForm,
    ValidateFieldRequest, ValidateFieldResponse, STUDENT_RECORDS,
};
use super::services::{self, DeleteOutcome, SubmitError, DELETE_PROMPT};
use super::validation::{self, FieldErrors};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/students/:id", delete(remove_student))
        .route("/add-student", get(new_student).post(create_student))
        .route("/edit-student/:id", get(edit_student).post(update_student))
        .route("/validate-field", post(validate_field))
}

#[instrument(skip(state, session))]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(search): Query<SearchQuery>,
) -> Json<DashboardView> {
    let caps = session.capabilities();
    let view = services::load_dashboard(state.records.as_ref(), &session, caps, &search.q).await;
    Json(view)
}

#[instrument(skip(state, session))]
pub async fn remove_student(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Json<DeleteResponse> {
    let caps = session.capabilities();
    let store = state.records.as_ref();
    let response = match services::delete_student(store, caps, &id, params.confirm).await {
        DeleteOutcome::Ignored => DeleteResponse::Ignored,
        DeleteOutcome::ConfirmationRequired => DeleteResponse::ConfirmationRequired {
            prompt: DELETE_PROMPT,
        },
        DeleteOutcome::Deleted => DeleteResponse::Deleted {
            dashboard: services::load_dashboard(store, &session, caps, "").await,
        },
        DeleteOutcome::Failed => DeleteResponse::Failed,
    };
    Json(response)
}

pub async fn new_student(AdminSession(_): AdminSession) -> Json<FormView> {
    Json(FormView {
        mode: FormMode::Add,
        values: StudentForm::default(),
        errors: FieldErrors::new(),
    })
}

#[instrument(skip(state, form))]
pub async fn create_student(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(form): Json<StudentForm>,
) -> Result<Redirect, AppError> {
    save(&state, FormMode::Add, form).await
}

#[instrument(skip(state))]
pub async fn edit_student(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Json<FormView>, AppError> {
    match state.records.get_by_id(STUDENT_RECORDS, &id).await {
        Ok(record) => Ok(Json(FormView {
            values: StudentForm::from_record(&record),
            mode: FormMode::Edit { id },
            errors: FieldErrors::new(),
        })),
        Err(e) => {
            error!(error = %e, %id, "loading student failed");
            Err(AppError::Alert {
                message: "Failed to load student record",
                redirect: Some("/dashboard"),
            })
        }
    }
}

#[instrument(skip(state, form))]
pub async fn update_student(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
    Json(form): Json<StudentForm>,
) -> Result<Redirect, AppError> {
    save(&state, FormMode::Edit { id }, form).await
}

pub async fn validate_field(
    AdminSession(_): AdminSession,
    Json(req): Json<ValidateFieldRequest>,
) -> Json<ValidateFieldResponse> {
    let error = validation::validate_field(req.field, &req.value, &req.form).unwrap_or_default();
    Json(ValidateFieldResponse {
        field: req.field,
        error,
    })
}

async fn save(state: &AppState, mode: FormMode, form: StudentForm) -> Result<Redirect, AppError> {
    match services::submit(state.records.as_ref(), &mode, &form).await {
        Ok(_) => Ok(Redirect::to("/dashboard")),
        Err(SubmitError::Invalid(errors)) => Err(AppError::Validation(Box::new(FormView {
            mode,
            values: form,
            errors,
        }))),
        Err(SubmitError::Backend(e)) => {
            error!(error = %e, ?mode, "saving student failed");
            let message = match mode {
                FormMode::Add => "Failed to create student record. Please try again.",
                FormMode::Edit { .. } => "Failed to update student record. Please try again.",
            };
            Err(AppError::Alert {
                message,
                redirect: None,
            })
        }
    }
}
