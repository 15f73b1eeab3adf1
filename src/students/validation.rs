use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::dto::{birth_date, StudentForm};

/// Form fields of a student record, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    StudentName,
    RollNumber,
    Semester,
    DateOfBirth,
    EmailAddress,
    TotalClasses,
    ClassesAttended,
    Subject1Name,
    Subject1Marks,
    Subject2Name,
    Subject2Marks,
    OverallGrade,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::StudentName,
        Field::RollNumber,
        Field::Semester,
        Field::DateOfBirth,
        Field::EmailAddress,
        Field::TotalClasses,
        Field::ClassesAttended,
        Field::Subject1Name,
        Field::Subject1Marks,
        Field::Subject2Name,
        Field::Subject2Marks,
        Field::OverallGrade,
    ];
}

pub type FieldErrors = BTreeMap<Field, &'static str>;

/// A single check. `violated` sees the non-blank value and the whole form.
#[derive(Clone, Copy)]
pub struct Rule {
    pub violated: fn(&str, &StudentForm) -> bool,
    pub message: &'static str,
}

lazy_static! {
    static ref DIGIT_RE: Regex = Regex::new(r"[0-9]").unwrap();
    static ref ONLY_DIGITS_RE: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

fn integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn has_digit(value: &str, _: &StudentForm) -> bool {
    DIGIT_RE.is_match(value)
}

fn only_digits(value: &str, _: &StudentForm) -> bool {
    ONLY_DIGITS_RE.is_match(value.trim())
}

fn not_a_number(value: &str, _: &StudentForm) -> bool {
    integer(value).is_none()
}

fn negative(value: &str, _: &StudentForm) -> bool {
    integer(value).is_some_and(|n| n < 0)
}

fn outside_marks_range(value: &str, _: &StudentForm) -> bool {
    integer(value).is_some_and(|n| !(0..=100).contains(&n))
}

fn exceeds_total(value: &str, form: &StudentForm) -> bool {
    match (integer(value), integer(&form.total_classes)) {
        (Some(attended), Some(total)) => attended > total,
        _ => false,
    }
}

fn bad_email(value: &str, _: &StudentForm) -> bool {
    !EMAIL_RE.is_match(value)
}

fn bad_date(value: &str, _: &StudentForm) -> bool {
    birth_date::parse(value).is_none()
}

const NOT_A_NUMBER: Rule = Rule {
    violated: not_a_number,
    message: "Must be a valid number",
};
const NEGATIVE: Rule = Rule {
    violated: negative,
    message: "Cannot be negative",
};

const NAME_RULES: &[Rule] = &[Rule {
    violated: has_digit,
    message: "Cannot contain numbers",
}];
const SEMESTER_RULES: &[Rule] = &[Rule {
    violated: only_digits,
    message: "Semester should be like \"Fall 2024\" or \"Spring 2025\"",
}];
const COUNT_RULES: &[Rule] = &[NOT_A_NUMBER, NEGATIVE];
const ATTENDED_RULES: &[Rule] = &[
    NOT_A_NUMBER,
    NEGATIVE,
    Rule {
        violated: exceeds_total,
        message: "Cannot exceed total classes",
    },
];
const MARKS_RULES: &[Rule] = &[
    NOT_A_NUMBER,
    NEGATIVE,
    Rule {
        violated: outside_marks_range,
        message: "Marks must be between 0 and 100",
    },
];
const EMAIL_RULES: &[Rule] = &[Rule {
    violated: bad_email,
    message: "Invalid email format",
}];
const DATE_RULES: &[Rule] = &[Rule {
    violated: bad_date,
    message: "Must be a valid date (YYYY-MM-DD)",
}];

const REQUIRED: [(Field, &str); 3] = [
    (Field::StudentName, "Student name is required"),
    (Field::RollNumber, "Roll number is required"),
    (Field::Semester, "Semester is required"),
];

pub fn rules(field: Field) -> &'static [Rule] {
    match field {
        Field::StudentName | Field::Subject1Name | Field::Subject2Name => NAME_RULES,
        Field::Semester => SEMESTER_RULES,
        Field::RollNumber | Field::TotalClasses => COUNT_RULES,
        Field::ClassesAttended => ATTENDED_RULES,
        Field::Subject1Marks | Field::Subject2Marks => MARKS_RULES,
        Field::EmailAddress => EMAIL_RULES,
        Field::DateOfBirth => DATE_RULES,
        Field::OverallGrade => &[],
    }
}

/// Checks one field as it changes. Blank values always pass.
pub fn validate_field(field: Field, value: &str, form: &StudentForm) -> Option<&'static str> {
    if value.trim().is_empty() {
        return None;
    }
    rules(field)
        .iter()
        .find(|rule| (rule.violated)(value, form))
        .map(|rule| rule.message)
}

/// Full check run on submit: every field's rules, then required fields.
pub fn validate_form(form: &StudentForm) -> FieldErrors {
    let mut errors: FieldErrors = Field::ALL
        .iter()
        .filter_map(|&field| validate_field(field, form.value(field), form).map(|m| (field, m)))
        .collect();
    for (field, message) in REQUIRED {
        if form.value(field).trim().is_empty() {
            errors.insert(field, message);
        }
    }
    errors
}
