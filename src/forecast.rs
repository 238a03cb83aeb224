use crate::gpa;
use crate::models::{CourseRecord, ForecastCourse};

/// Result of a what-if GPA simulation against a deduplicated baseline.
#[derive(Debug, Clone)]
pub struct ForecastSummary {
    pub courses: Vec<CourseRecord>,
    pub replacing: Vec<String>,
    pub adding: Vec<String>,
    // How many baseline rows were dropped in favor of a hypothetical
    // course. Display scaling only; the statistics ignore it.
    pub removed_count: usize,
    pub baseline_average: f64,
    pub simulated_average: f64,
    pub average_delta: f64,
    pub baseline_gpa: f64,
    pub simulated_gpa: f64,
    pub gpa_delta: f64,
    pub baseline_credits: f64,
    pub simulated_credits: f64,
    pub credits_delta: f64,
}

/// Merge hypothetical courses into the baseline and recompute both
/// statistics.
///
/// A hypothetical whose trimmed name matches a baseline course name
/// replaces every such row; others are appended. Blank names are ignored.
/// The merged table is not re-deduplicated, so two hypotheticals sharing a
/// name both survive.
pub fn simulate(
    baseline: &[CourseRecord],
    hypotheticals: &[ForecastCourse],
    conversion_table: &[(u32, f64)],
) -> ForecastSummary {
    let mut replacing = Vec::new();
    let mut adding = Vec::new();
    let mut additions = Vec::new();

    for hypothetical in hypotheticals {
        let name = hypothetical.name.trim();
        if name.is_empty() {
            continue;
        }
        if baseline.iter().any(|record| record.course_name == name) {
            replacing.push(name.to_string());
        } else {
            adding.push(name.to_string());
        }
        additions.push(CourseRecord {
            course_code: format!("Simulation {}", additions.len() + 1),
            course_name: hypothetical.name.clone(),
            credits: hypothetical.credits,
            grade: hypothetical.grade,
            letter_grade: None,
            replaced: None,
            sequence_index: 0,
        });
    }

    let mut courses: Vec<CourseRecord> = baseline
        .iter()
        .filter(|record| !replacing.contains(&record.course_name))
        .cloned()
        .collect();
    let removed_count = baseline.len() - courses.len();

    let next_index = baseline
        .iter()
        .map(|record| record.sequence_index + 1)
        .max()
        .unwrap_or(0);
    for (offset, mut record) in additions.into_iter().enumerate() {
        record.sequence_index = next_index + offset;
        courses.push(record);
    }

    let baseline_average = gpa::credit_weighted_average(baseline);
    let simulated_average = gpa::credit_weighted_average(&courses);
    let baseline_gpa = gpa::points_table_gpa(baseline, conversion_table);
    let simulated_gpa = gpa::points_table_gpa(&courses, conversion_table);
    let baseline_credits = gpa::total_credits(baseline);
    let simulated_credits = gpa::total_credits(&courses);

    ForecastSummary {
        courses,
        replacing,
        adding,
        removed_count,
        baseline_average,
        simulated_average,
        average_delta: gpa::round_to(simulated_average - baseline_average, 4),
        baseline_gpa,
        simulated_gpa,
        gpa_delta: gpa::round_to(simulated_gpa - baseline_gpa, 4),
        baseline_credits,
        simulated_credits,
        credits_delta: gpa::round_to(simulated_credits - baseline_credits, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{TranscriptReader, TrentReader};

    fn course(name: &str, grade: u32, credits: f64, index: usize) -> CourseRecord {
        CourseRecord {
            course_code: format!("Test 000{} H", index),
            course_name: name.to_string(),
            credits,
            grade,
            letter_grade: None,
            replaced: None,
            sequence_index: index,
        }
    }

    fn hypothetical(name: &str, grade: u32, credits: f64) -> ForecastCourse {
        ForecastCourse {
            name: name.to_string(),
            grade,
            credits,
        }
    }

    fn table() -> &'static [(u32, f64)] {
        TrentReader::new().conversion_table()
    }

    #[test]
    fn empty_hypothetical_list_leaves_the_baseline_unchanged() {
        let baseline = vec![course("Econ101", 72, 0.5, 0), course("CS100", 88, 0.5, 1)];
        let summary = simulate(&baseline, &[], table());
        assert_eq!(summary.courses, baseline);
        assert_eq!(summary.average_delta, 0.0);
        assert_eq!(summary.gpa_delta, 0.0);
        assert_eq!(summary.credits_delta, 0.0);
        assert_eq!(summary.removed_count, 0);
    }

    #[test]
    fn replacement_swaps_the_matching_baseline_row() {
        let baseline = vec![course("Econ101", 72, 0.5, 0), course("CS100", 88, 0.5, 1)];
        let summary = simulate(&baseline, &[hypothetical("Econ101", 90, 0.5)], table());

        assert_eq!(summary.replacing, vec!["Econ101".to_string()]);
        assert!(summary.adding.is_empty());
        assert_eq!(summary.removed_count, 1);

        let names: Vec<&str> = summary
            .courses
            .iter()
            .map(|record| record.course_name.as_str())
            .collect();
        assert_eq!(names, vec!["CS100", "Econ101"]);
        assert_eq!(summary.courses[1].course_code, "Simulation 1");
        assert_eq!(summary.baseline_average, 80.0);
        assert_eq!(summary.simulated_average, 89.0);
        assert_eq!(summary.average_delta, 9.0);
        assert_eq!(summary.credits_delta, 0.0);
    }

    #[test]
    fn new_courses_are_appended_after_the_baseline() {
        let baseline = vec![course("Econ101", 72, 0.5, 0)];
        let summary = simulate(&baseline, &[hypothetical("Phil200", 60, 1.0)], table());

        assert_eq!(summary.adding, vec!["Phil200".to_string()]);
        assert!(summary.replacing.is_empty());
        assert_eq!(summary.courses.len(), 2);
        assert_eq!(summary.courses[1].course_name, "Phil200");
        assert!(summary.courses[1].sequence_index > summary.courses[0].sequence_index);
        assert_eq!(summary.credits_delta, 1.0);
    }

    #[test]
    fn blank_names_are_silently_ignored() {
        let baseline = vec![course("Econ101", 72, 0.5, 0)];
        let summary = simulate(
            &baseline,
            &[hypothetical("   ", 95, 0.5), hypothetical("CS100", 80, 0.5)],
            table(),
        );
        assert_eq!(summary.courses.len(), 2);
        assert_eq!(summary.adding, vec!["CS100".to_string()]);
        // Ordinals count only usable entries.
        assert_eq!(summary.courses[1].course_code, "Simulation 1");
    }

    #[test]
    fn trimmed_names_still_match_for_replacement() {
        let baseline = vec![course("Econ101", 72, 0.5, 0), course("CS100", 88, 0.5, 1)];
        let summary = simulate(&baseline, &[hypothetical("  Econ101  ", 90, 0.5)], table());
        assert_eq!(summary.replacing, vec!["Econ101".to_string()]);
        assert_eq!(summary.removed_count, 1);
    }

    #[test]
    fn duplicate_hypotheticals_are_not_deduplicated() {
        let baseline = vec![course("Econ101", 72, 0.5, 0)];
        let summary = simulate(
            &baseline,
            &[hypothetical("Stat250", 70, 0.5), hypothetical("Stat250", 85, 0.5)],
            table(),
        );
        let stat_rows = summary
            .courses
            .iter()
            .filter(|record| record.course_name == "Stat250")
            .count();
        assert_eq!(stat_rows, 2);
    }

    #[test]
    fn gpa_delta_reflects_the_conversion_table() {
        let baseline = vec![course("Econ101", 50, 0.5, 0)];
        let summary = simulate(&baseline, &[hypothetical("Econ101", 90, 0.5)], table());
        assert_eq!(summary.baseline_gpa, 0.7);
        assert_eq!(summary.simulated_gpa, 4.0);
        assert_eq!(summary.gpa_delta, 3.3);
    }
}
