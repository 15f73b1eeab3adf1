use tracing::{error, info};

use crate::auth::session::{Capabilities, Session};
use crate::storage::RecordStore;

use super::dto::{
    DashboardView, FormMode, StudentCard, StudentForm, StudentRecord, STUDENT_RECORDS,
};
use super::search::{attendance_percentage, filter_records, DashboardStats, GradeTier};
use super::validation::{validate_form, FieldErrors};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this student record?";

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("form has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The caller may not mutate; nothing was asked or sent.
    Ignored,
    ConfirmationRequired,
    Deleted,
    Failed,
}

/// Fetches every record. A failing fetch is logged and shows as an empty list.
pub async fn load_records(store: &dyn RecordStore) -> Vec<StudentRecord> {
    match store.get_all(STUDENT_RECORDS).await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "loading students failed");
            Vec::new()
        }
    }
}

pub fn build_dashboard(
    session: &Session,
    caps: Capabilities,
    records: &[StudentRecord],
    query: &str,
) -> DashboardView {
    let stats = DashboardStats::compute(records);
    let students: Vec<StudentCard> = filter_records(records, query)
        .into_iter()
        .map(|r| StudentCard {
            attendance_percent: attendance_percentage(
                r.fields.classes_attended,
                r.fields.total_classes,
            ),
            grade_tier: GradeTier::of(r.fields.overall_grade.as_deref()),
            record: r.clone(),
        })
        .collect();

    let searching = !query.trim().is_empty();
    let empty_message = students.is_empty().then_some(if searching {
        "No students found matching your search"
    } else {
        "No student records yet"
    });

    DashboardView {
        username: session.username.clone(),
        role: session.role.as_str(),
        heading: if caps.can_mutate {
            "Administrator Panel"
        } else {
            "Viewer Mode"
        },
        can_mutate: caps.can_mutate,
        query: query.to_string(),
        stats,
        show_add_first: caps.can_mutate && !searching && students.is_empty(),
        empty_message,
        students,
    }
}

pub async fn load_dashboard(
    store: &dyn RecordStore,
    session: &Session,
    caps: Capabilities,
    query: &str,
) -> DashboardView {
    let records = load_records(store).await;
    build_dashboard(session, caps, &records, query)
}

/// Validates the form and, only when it is clean, creates or updates the record.
pub async fn submit(
    store: &dyn RecordStore,
    mode: &FormMode,
    form: &StudentForm,
) -> Result<StudentRecord, SubmitError> {
    let errors = validate_form(form);
    if !errors.is_empty() {
        return Err(SubmitError::Invalid(errors));
    }

    let fields = form.to_fields();
    let saved = match mode {
        FormMode::Add => store.create(STUDENT_RECORDS, &fields).await?,
        FormMode::Edit { id } => {
            store
                .update(STUDENT_RECORDS, &StudentRecord::for_update(id.clone(), fields))
                .await?
        }
    };
    info!(id = %saved.id, ?mode, "student saved");
    Ok(saved)
}

pub async fn delete_student(
    store: &dyn RecordStore,
    caps: Capabilities,
    id: &str,
    confirmed: bool,
) -> DeleteOutcome {
    if !caps.can_mutate {
        return DeleteOutcome::Ignored;
    }
    if !confirmed {
        return DeleteOutcome::ConfirmationRequired;
    }
    match store.delete(STUDENT_RECORDS, id).await {
        Ok(()) => {
            info!(%id, "student deleted");
            DeleteOutcome::Deleted
        }
        Err(e) => {
            error!(error = %e, %id, "deleting student failed");
            DeleteOutcome::Failed
        }
    }
}
