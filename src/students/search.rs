use serde::Serialize;

use super::dto::StudentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeTier {
    Top,
    Good,
    Other,
    None,
}

impl GradeTier {
    pub fn of(grade: Option<&str>) -> Self {
        let Some(grade) = grade.filter(|g| !g.is_empty()) else {
            return GradeTier::None;
        };
        match grade.to_uppercase().as_str() {
            "A" | "A+" => GradeTier::Top,
            "B" | "B+" => GradeTier::Good,
            _ => GradeTier::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub average_attendance: i64,
    pub high_performers: usize,
}

impl DashboardStats {
    pub fn compute(records: &[StudentRecord]) -> Self {
        let total = records.len();
        let average_attendance = if total == 0 {
            0
        } else {
            // Store data is unchecked, so large ratios must not overflow the sum.
            let sum: f64 = records
                .iter()
                .map(|r| attendance_percentage(r.fields.classes_attended, r.fields.total_classes) as f64)
                .sum();
            (sum / total as f64).round() as i64
        };
        let high_performers = records
            .iter()
            .filter(|r| {
                r.fields
                    .overall_grade
                    .as_deref()
                    .is_some_and(|g| g.to_uppercase().starts_with('A'))
            })
            .count();
        Self {
            total,
            average_attendance,
            high_performers,
        }
    }
}

/// `round(100 * attended / total)`, or 0 when either side is missing or total is 0.
pub fn attendance_percentage(attended: Option<i64>, total: Option<i64>) -> i64 {
    match (attended, total) {
        (Some(attended), Some(total)) if total != 0 => {
            (attended as f64 / total as f64 * 100.0).round() as i64
        }
        _ => 0,
    }
}

fn matches(record: &StudentRecord, needle: &str) -> bool {
    let f = &record.fields;
    let text_hit = |v: &Option<String>| {
        v.as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
    };
    text_hit(&f.student_name)
        || text_hit(&f.semester)
        || f
            .roll_number
            .is_some_and(|n| n.to_string().contains(needle))
}

/// Records matching `query` by name, semester or roll number. A blank query keeps everything.
pub fn filter_records<'a>(records: &'a [StudentRecord], query: &str) -> Vec<&'a StudentRecord> {
    if query.trim().is_empty() {
        return records.iter().collect();
    }
    let needle = query.to_lowercase();
    records.iter().filter(|r| matches(r, &needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::dto::StudentFields;

    fn record(id: &str, name: &str, roll: i64, semester: &str) -> StudentRecord {
        StudentRecord {
            id: id.into(),
            created_date: None,
            updated_date: None,
            fields: StudentFields {
                student_name: Some(name.into()),
                roll_number: Some(roll),
                semester: Some(semester.into()),
                ..Default::default()
            },
        }
    }

    fn sample() -> Vec<StudentRecord> {
        vec![
            record("1", "Ada Lovelace", 101, "Fall 2024"),
            record("2", "Alan Turing", 202, "Spring 2025"),
            record("3", "Grace Hopper", 303, "Fall 2024"),
        ]
    }

    fn ids(found: &[&StudentRecord]) -> Vec<String> {
        found.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn blank_query_keeps_full_set() {
        let records = sample();
        assert_eq!(filter_records(&records, "").len(), 3);
        assert_eq!(filter_records(&records, "   ").len(), 3);
    }

    #[test]
    fn matches_name_semester_and_roll_number_case_insensitively() {
        let records = sample();
        assert_eq!(ids(&filter_records(&records, "ADA")), ["1"]);
        assert_eq!(ids(&filter_records(&records, "fall")), ["1", "3"]);
        assert_eq!(ids(&filter_records(&records, "20")), ["1", "2", "3"]);
        assert_eq!(ids(&filter_records(&records, "303")), ["3"]);
        assert!(filter_records(&records, "nobody").is_empty());
    }

    #[test]
    fn filtered_set_is_a_subset() {
        let records = sample();
        for q in ["a", "2", "spring", "zzz", "Hopper", "1"] {
            let found = filter_records(&records, q);
            assert!(found.len() <= records.len());
            assert!(found.iter().all(|f| records.iter().any(|r| r == *f)));
        }
    }

    #[test]
    fn missing_fields_never_match() {
        let records = vec![StudentRecord {
            id: "x".into(),
            created_date: None,
            updated_date: None,
            fields: StudentFields::default(),
        }];
        assert!(filter_records(&records, "a").is_empty());
    }

    #[test]
    fn attendance_percentage_rounds() {
        assert_eq!(attendance_percentage(Some(38), Some(40)), 95);
        assert_eq!(attendance_percentage(Some(1), Some(3)), 33);
        assert_eq!(attendance_percentage(Some(2), Some(3)), 67);
        assert_eq!(attendance_percentage(Some(1), Some(8)), 13);
        assert_eq!(attendance_percentage(Some(5), Some(0)), 0);
        assert_eq!(attendance_percentage(None, Some(10)), 0);
        assert_eq!(attendance_percentage(Some(3), None), 0);
    }

    #[test]
    fn stats_over_full_set() {
        let mut records = sample();
        records[0].fields.total_classes = Some(40);
        records[0].fields.classes_attended = Some(38);
        records[0].fields.overall_grade = Some("a+".into());
        records[1].fields.total_classes = Some(10);
        records[1].fields.classes_attended = Some(10);
        records[1].fields.overall_grade = Some("B".into());
        records[2].fields.overall_grade = Some("A".into());

        let stats = DashboardStats::compute(&records);
        assert_eq!(stats.total, 3);
        // (95 + 100 + 0) / 3 = 65
        assert_eq!(stats.average_attendance, 65);
        assert_eq!(stats.high_performers, 2);
    }

    #[test]
    fn stats_survive_huge_attendance_ratios() {
        let mut records = sample();
        records.truncate(2);
        for r in &mut records {
            r.fields.classes_attended = Some(i64::MAX / 2);
            r.fields.total_classes = Some(1);
        }
        let stats = DashboardStats::compute(&records);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.average_attendance, i64::MAX);
    }

    #[test]
    fn stats_for_empty_set() {
        let stats = DashboardStats::compute(&[]);
        assert_eq!(
            stats,
            DashboardStats {
                total: 0,
                average_attendance: 0,
                high_performers: 0
            }
        );
    }

    #[test]
    fn grade_tiers() {
        assert_eq!(GradeTier::of(Some("a+")), GradeTier::Top);
        assert_eq!(GradeTier::of(Some("B")), GradeTier::Good);
        assert_eq!(GradeTier::of(Some("A-")), GradeTier::Other);
        assert_eq!(GradeTier::of(Some("")), GradeTier::None);
        assert_eq!(GradeTier::of(None), GradeTier::None);
    }
}
