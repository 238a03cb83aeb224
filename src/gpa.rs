use crate::models::CourseRecord;

/// Credit-weighted average grade.
///
/// Full-credit courses count as two half-credit entries with the same
/// grade. When no full-credit course exists this degenerates to the plain
/// mean of the grades. Callers must pass a non-empty table.
pub fn credit_weighted_average(records: &[CourseRecord]) -> f64 {
    if records.iter().any(|record| record.credits == 1.0) {
        let adjusted_total: f64 = records
            .iter()
            .map(|record| {
                let weight = if record.credits == 1.0 { 2.0 } else { 1.0 };
                record.grade as f64 * weight
            })
            .sum();
        let adjusted_count: f64 = total_credits(records) * 2.0;
        round_to(adjusted_total / adjusted_count, 4)
    } else {
        let total: f64 = records.iter().map(|record| record.grade as f64).sum();
        round_to(total / records.len() as f64, 4)
    }
}

/// Map a percentage grade through a conversion table: the points of the
/// highest threshold not exceeding the grade.
pub fn points_for(grade: u32, table: &[(u32, f64)]) -> f64 {
    table
        .iter()
        .find(|(threshold, _)| grade >= *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(0.0)
}

/// Points-table GPA: grades mapped through the conversion table, with
/// full-credit courses counted twice, averaged to two decimal places.
pub fn points_table_gpa(records: &[CourseRecord], table: &[(u32, f64)]) -> f64 {
    let mut total = 0.0;
    let mut count = 0u32;
    for record in records {
        let weight = if record.credits == 1.0 { 2 } else { 1 };
        total += points_for(record.grade, table) * weight as f64;
        count += weight;
    }
    round_to(total / count as f64, 2)
}

pub fn total_credits(records: &[CourseRecord]) -> f64 {
    records.iter().map(|record| record.credits).sum()
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
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

    #[test]
    fn all_half_credit_average_is_the_plain_mean() {
        let records = vec![
            course("Course1", 72, 0.5, 0),
            course("Course2", 88, 0.5, 1),
            course("Course3", 80, 0.5, 2),
        ];
        assert_eq!(credit_weighted_average(&records), 80.0);
    }

    #[test]
    fn full_credit_courses_count_twice() {
        let records = vec![course("Course1", 90, 1.0, 0), course("Course2", 60, 0.5, 1)];
        // (90 * 2 + 60) / (2 * 1.5)
        assert_eq!(credit_weighted_average(&records), 80.0);
    }

    #[test]
    fn average_rounds_to_four_decimal_places() {
        let records = vec![
            course("Course1", 71, 0.5, 0),
            course("Course2", 75, 0.5, 1),
            course("Course3", 72, 0.5, 2),
        ];
        assert_eq!(credit_weighted_average(&records), 72.6667);
    }

    #[test]
    fn conversion_table_matches_known_grades() {
        let table = TrentReader::new().conversion_table();
        assert_eq!(points_for(84, table), 3.7);
        assert_eq!(points_for(50, table), 0.7);
        assert_eq!(points_for(40, table), 0.0);
        assert_eq!(points_for(100, table), 4.0);
    }

    #[test]
    fn conversion_table_lookup_is_monotonic() {
        let table = TrentReader::new().conversion_table();
        let mut previous = 0.0;
        for grade in 0..=100 {
            let points = points_for(grade, table);
            assert!(points >= previous, "points dropped at grade {}", grade);
            previous = points;
        }
    }

    #[test]
    fn points_gpa_weights_full_credit_courses() {
        let table = TrentReader::new().conversion_table();
        let records = vec![course("Course1", 90, 1.0, 0), course("Course2", 50, 0.5, 1)];
        // (4.0 * 2 + 0.7) / 3
        assert_eq!(points_table_gpa(&records, table), 2.9);
    }

    #[test]
    fn statistics_do_not_mutate_the_input_table() {
        let records = vec![course("Course1", 90, 1.0, 0), course("Course2", 60, 0.5, 1)];
        let before = records.clone();
        let table = TrentReader::new().conversion_table();
        credit_weighted_average(&records);
        points_table_gpa(&records, table);
        total_credits(&records);
        assert_eq!(records, before);
    }

    #[test]
    fn credits_sum_over_the_table() {
        let records = vec![course("Course1", 90, 1.0, 0), course("Course2", 60, 0.5, 1)];
        assert_eq!(total_credits(&records), 1.5);
    }
}
