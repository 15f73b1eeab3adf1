use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::search::{DashboardStats, GradeTier};
use super::validation::{Field, FieldErrors};

/// Collection holding student records in the CRUD service.
pub const STUDENT_RECORDS: &str = "studentrecords";

/// Editable part of a student record, as sent to the CRUD service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "birth_date")]
    pub date_of_birth: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_classes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes_attended: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject1_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject1_marks: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject2_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject2_marks: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_grade: Option<String>,
}

/// A stored student record. The id and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(
        rename = "_createdDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub created_date: Option<OffsetDateTime>,
    #[serde(
        rename = "_updatedDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub updated_date: Option<OffsetDateTime>,
    #[serde(flatten)]
    pub fields: StudentFields,
}

impl StudentRecord {
    /// Record as sent on update: id plus editable fields, store timestamps dropped.
    pub fn for_update(id: impl Into<String>, fields: StudentFields) -> Self {
        Self {
            id: id.into(),
            created_date: None,
            updated_date: None,
            fields,
        }
    }
}

/// Raw form state. Every value is kept exactly as typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentForm {
    pub student_name: String,
    pub roll_number: String,
    pub semester: String,
    pub date_of_birth: String,
    pub email_address: String,
    pub total_classes: String,
    pub classes_attended: String,
    pub subject1_name: String,
    pub subject1_marks: String,
    pub subject2_name: String,
    pub subject2_marks: String,
    pub overall_grade: String,
}

impl StudentForm {
    pub fn from_record(record: &StudentRecord) -> Self {
        let f = &record.fields;
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let number = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
        Self {
            student_name: text(&f.student_name),
            roll_number: number(f.roll_number),
            semester: text(&f.semester),
            date_of_birth: f.date_of_birth.map(birth_date::format).unwrap_or_default(),
            email_address: text(&f.email_address),
            total_classes: number(f.total_classes),
            classes_attended: number(f.classes_attended),
            subject1_name: text(&f.subject1_name),
            subject1_marks: number(f.subject1_marks),
            subject2_name: text(&f.subject2_name),
            subject2_marks: number(f.subject2_marks),
            overall_grade: text(&f.overall_grade),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::StudentName => &self.student_name,
            Field::RollNumber => &self.roll_number,
            Field::Semester => &self.semester,
            Field::DateOfBirth => &self.date_of_birth,
            Field::EmailAddress => &self.email_address,
            Field::TotalClasses => &self.total_classes,
            Field::ClassesAttended => &self.classes_attended,
            Field::Subject1Name => &self.subject1_name,
            Field::Subject1Marks => &self.subject1_marks,
            Field::Subject2Name => &self.subject2_name,
            Field::Subject2Marks => &self.subject2_marks,
            Field::OverallGrade => &self.overall_grade,
        }
    }

    /// Converts validated form state. Blank values become absent.
    pub fn to_fields(&self) -> StudentFields {
        let text = |v: &str| Some(v.trim()).filter(|s| !s.is_empty()).map(str::to_string);
        let number = |v: &str| v.trim().parse::<i64>().ok();
        StudentFields {
            student_name: text(&self.student_name),
            roll_number: number(&self.roll_number),
            semester: text(&self.semester),
            date_of_birth: birth_date::parse(&self.date_of_birth),
            email_address: text(&self.email_address),
            total_classes: number(&self.total_classes),
            classes_attended: number(&self.classes_attended),
            subject1_name: text(&self.subject1_name),
            subject1_marks: number(&self.subject1_marks),
            subject2_name: text(&self.subject2_name),
            subject2_marks: number(&self.subject2_marks),
            overall_grade: text(&self.overall_grade),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormMode {
    Add,
    Edit { id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub mode: FormMode,
    pub values: StudentForm,
    pub errors: FieldErrors,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct ValidateFieldRequest {
    pub field: Field,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub form: StudentForm,
}

#[derive(Debug, Serialize)]
pub struct ValidateFieldResponse {
    pub field: Field,
    /// Empty when the value passes.
    pub error: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCard {
    #[serde(flatten)]
    pub record: StudentRecord,
    pub attendance_percent: i64,
    pub grade_tier: GradeTier,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub username: String,
    pub role: &'static str,
    pub heading: &'static str,
    pub can_mutate: bool,
    pub query: String,
    pub stats: DashboardStats,
    pub students: Vec<StudentCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
    pub show_add_first: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteResponse {
    Ignored,
    ConfirmationRequired { prompt: &'static str },
    Deleted { dashboard: DashboardView },
    Failed,
}

/// `YYYY-MM-DD` dates. Also accepts a full ISO timestamp and keeps its date part.
pub(crate) mod birth_date {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn parse(raw: &str) -> Option<Date> {
        let raw = raw.trim();
        let day = raw.get(..10)?;
        if raw.len() > 10 && !raw[10..].starts_with('T') {
            return None;
        }
        Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
    }

    pub fn format(date: Date) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }

    pub fn serialize<S: Serializer>(value: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&format(*date)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date `{s}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn record_reads_store_payload() {
        let json = r#"{
            "_id": "rec-1",
            "_createdDate": "2024-09-01T10:00:00Z",
            "studentName": "Ada Lovelace",
            "rollNumber": 42,
            "semester": "Fall 2024",
            "dateOfBirth": "2003-12-10T00:00:00.000Z",
            "totalClasses": 40,
            "classesAttended": 38,
            "overallGrade": "A+"
        }"#;
        let rec: StudentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.id, "rec-1");
        assert!(rec.created_date.is_some());
        assert!(rec.updated_date.is_none());
        assert_eq!(rec.fields.student_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(rec.fields.roll_number, Some(42));
        assert_eq!(rec.fields.date_of_birth, Some(date!(2003 - 12 - 10)));
        assert_eq!(rec.fields.email_address, None);
    }

    #[test]
    fn fields_omit_absent_values_and_never_carry_an_id() {
        let fields = StudentFields {
            student_name: Some("Ada".into()),
            date_of_birth: Some(date!(2001 - 02 - 03)),
            ..Default::default()
        };
        let v = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            v,
            serde_json::json!({ "studentName": "Ada", "dateOfBirth": "2001-02-03" })
        );
        assert!(v.get("_id").is_none());
    }

    #[test]
    fn update_payload_carries_id_without_timestamps() {
        let rec = StudentRecord::for_update("abc", StudentFields::default());
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v, serde_json::json!({ "_id": "abc" }));
    }

    #[test]
    fn form_prefills_from_record() {
        let rec = StudentRecord {
            id: "x".into(),
            created_date: None,
            updated_date: None,
            fields: StudentFields {
                student_name: Some("Grace".into()),
                roll_number: Some(7),
                date_of_birth: Some(date!(1999 - 01 - 05)),
                subject1_marks: Some(0),
                ..Default::default()
            },
        };
        let form = StudentForm::from_record(&rec);
        assert_eq!(form.student_name, "Grace");
        assert_eq!(form.roll_number, "7");
        assert_eq!(form.date_of_birth, "1999-01-05");
        assert_eq!(form.subject1_marks, "0");
        assert_eq!(form.semester, "");
        assert_eq!(form.total_classes, "");
    }

    #[test]
    fn form_converts_blank_values_to_absent() {
        let form = StudentForm {
            student_name: " Grace ".into(),
            roll_number: "12".into(),
            semester: "Spring 2025".into(),
            total_classes: "0".into(),
            email_address: "   ".into(),
            ..Default::default()
        };
        let fields = form.to_fields();
        assert_eq!(fields.student_name.as_deref(), Some("Grace"));
        assert_eq!(fields.roll_number, Some(12));
        assert_eq!(fields.total_classes, Some(0));
        assert_eq!(fields.email_address, None);
        assert_eq!(fields.date_of_birth, None);
    }

    #[test]
    fn birth_date_rejects_garbage() {
        assert_eq!(birth_date::parse("2024-02-30"), None);
        assert_eq!(birth_date::parse("12/01/2004"), None);
        assert_eq!(birth_date::parse("2004-01-12x"), None);
        assert_eq!(birth_date::parse("2004-01-12"), Some(date!(2004 - 01 - 12)));
    }
}
