use crate::models::{collapse_whitespace, CourseRecord, RawRow, ReadError};
use regex::Regex;
use std::collections::HashMap;

/// Capability interface for one institution's transcript grammar.
///
/// Each stage is a pure transformation: pages -> lines -> raw rows ->
/// cleaned records -> deduplicated records. Stages never mutate their
/// input and may be re-run on independent inputs.
pub trait TranscriptReader {
    fn institution(&self) -> &'static str;

    /// Percentage-to-points conversion steps, strictly decreasing in
    /// threshold, ending with a catch-all entry at 0.
    fn conversion_table(&self) -> &'static [(u32, f64)];

    /// Built-in sample transcript lines, already segmented.
    fn sample_lines(&self) -> Vec<String>;

    /// Turn raw per-page extracted text into one candidate line per record.
    /// No page text at all yields an empty sequence.
    fn segment_lines(&self, pages: &[String]) -> Vec<String>;

    /// Split each line into positional fields on column gaps.
    fn tokenize(&self, lines: &[String]) -> Vec<RawRow>;

    /// Coerce fields, resolve sentinel values, drop rows without a grade
    /// and assign stable sequence indices.
    fn clean(&self, rows: &[RawRow]) -> Result<Vec<CourseRecord>, ReadError>;

    /// Keep only the best attempt at every course, in transcript order.
    fn remove_replacements(&self, records: &[CourseRecord]) -> Vec<CourseRecord>;
}

/// Select the reader for the configured institution name.
pub fn for_institution(name: &str) -> Result<Box<dyn TranscriptReader>, ReadError> {
    match name {
        "Trent University" => Ok(Box::new(TrentReader::new())),
        other => Err(ReadError::UnknownInstitution(other.to_string())),
    }
}

/// Reader for Trent University transcripts.
pub struct TrentReader {
    divider: Regex,
    academic_year: Regex,
    summer_term: Regex,
    record_break: Regex,
    column_gap: Regex,
}

const TRENT_CONVERSION_TABLE: [(u32, f64); 13] = [
    (90, 4.0),
    (85, 3.9),
    (80, 3.7),
    (77, 3.3),
    (73, 3.0),
    (70, 2.7),
    (67, 2.3),
    (63, 2.0),
    (60, 1.7),
    (57, 1.3),
    (53, 1.0),
    (50, 0.7),
    (0, 0.0),
];

impl TrentReader {
    pub fn new() -> Self {
        Self {
            divider: Regex::new(r"---+").unwrap(),
            academic_year: Regex::new(r"\b\d{4}-\d{4}\s+Academic Year\b").unwrap(),
            summer_term: Regex::new(r"\b\d{4}\s+\w\w Summer Term\b").unwrap(),
            // A whitespace run followed by a capitalized-word sequence marks
            // where extraction ran the next course's major label into the
            // previous line.
            record_break: Regex::new(r"(\s)( [A-Z][a-z]+(?: [A-Z][a-z]+)*)").unwrap(),
            column_gap: Regex::new(r" {3,}").unwrap(),
        }
    }

    fn apply_page_rules(&self, page_text: &str) -> String {
        let text = self.divider.replace_all(page_text, "");
        let text = text.replace('\n', " ");
        let text = self.academic_year.replace_all(&text, "");
        let text = self.summer_term.replace_all(&text, "");
        self.record_break.replace_all(&text, "$1\n$2").into_owned()
    }
}

impl Default for TrentReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptReader for TrentReader {
    fn institution(&self) -> &'static str {
        "Trent University"
    }

    fn conversion_table(&self) -> &'static [(u32, f64)] {
        &TRENT_CONVERSION_TABLE
    }

    fn sample_lines(&self) -> Vec<String> {
        SAMPLE_LINES.iter().map(|line| line.to_string()).collect()
    }

    fn segment_lines(&self, pages: &[String]) -> Vec<String> {
        let mut content = String::new();
        for page_text in pages {
            if page_text.is_empty() {
                continue;
            }
            content.push_str(&self.apply_page_rules(page_text));
        }
        content
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    fn tokenize(&self, lines: &[String]) -> Vec<RawRow> {
        lines
            .iter()
            .map(|line| {
                let mut tokens = self
                    .column_gap
                    .split(line)
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(String::from);
                RawRow {
                    major: tokens.next(),
                    course: tokens.next(),
                    credits: tokens.next(),
                    grade: tokens.next(),
                    letter_grade: tokens.next(),
                    replaced: tokens.next(),
                }
            })
            .collect()
    }

    fn clean(&self, rows: &[RawRow]) -> Result<Vec<CourseRecord>, ReadError> {
        let mut records = Vec::new();
        for (row_index, row) in rows.iter().enumerate() {
            let major = row.major.clone().unwrap_or_default();
            let course = row.course.clone().unwrap_or_default();
            let (code_part, name_part) = match course.split_once(':') {
                Some((code, name)) => (code.to_string(), name.to_string()),
                None => (course, String::new()),
            };

            let mut grade = row.grade.clone();
            let mut letter_grade = row.letter_grade.clone();
            let mut replaced = row.replaced.clone();

            // "R" in the letter-grade column is a not-yet-replaced
            // placeholder, not a letter grade.
            if letter_grade.as_deref() == Some("R") {
                replaced = Some("R".to_string());
                letter_grade = None;
            }
            // Registered but not completed.
            if grade.as_deref() == Some("PRE") {
                grade = None;
            }
            // Honor-roll text spills into the replaced column; it is noise.
            if replaced.as_deref() == Some("DEAN'S HONOUR ROLL") {
                replaced = None;
            }

            // Rows without a grade are headers, footers or courses not
            // taken yet.
            let Some(grade_text) = grade else {
                continue;
            };
            let Some(credits_text) = row.credits.clone() else {
                return Err(ReadError::MalformedRow { row: row_index });
            };

            let grade = grade_text
                .trim()
                .parse::<u32>()
                .map_err(|_| ReadError::NumericField {
                    field: "grade",
                    value: grade_text.clone(),
                    row: row_index,
                })?;
            let credits =
                credits_text
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ReadError::NumericField {
                        field: "credits",
                        value: credits_text.clone(),
                        row: row_index,
                    })?;

            records.push(CourseRecord {
                course_code: collapse_whitespace(&format!("{} {}", major, code_part)),
                course_name: name_part.trim().to_string(),
                credits,
                grade,
                letter_grade: letter_grade.map(|value| value.trim().to_string()),
                replaced,
                sequence_index: 0,
            });
        }
        for (index, record) in records.iter_mut().enumerate() {
            record.sequence_index = index;
        }
        Ok(records)
    }

    fn remove_replacements(&self, records: &[CourseRecord]) -> Vec<CourseRecord> {
        let by_name = keep_best_by(records.to_vec(), |record| record.course_name.clone());
        // Second pass on the coarser key: distinct course names can share a
        // course code through formatting drift.
        let mut survivors = keep_best_by(by_name, |record| record.course_code.clone());
        survivors.sort_by_key(|record| record.sequence_index);
        survivors
    }
}

/// Keep the record with the highest grade for each key, first-seen on
/// ties. Output order is restored to transcript order.
fn keep_best_by<F>(mut records: Vec<CourseRecord>, key: F) -> Vec<CourseRecord>
where
    F: Fn(&CourseRecord) -> String,
{
    records.sort_by_key(|record| record.sequence_index);

    let mut best_slots: HashMap<String, usize> = HashMap::new();
    let mut survivors: Vec<CourseRecord> = Vec::new();
    for record in records {
        match best_slots.get(&key(&record)) {
            None => {
                best_slots.insert(key(&record), survivors.len());
                survivors.push(record);
            }
            Some(&slot) => {
                if record.grade > survivors[slot].grade {
                    survivors[slot] = record;
                }
            }
        }
    }
    survivors
}

// Sample output of segment_lines() for an anonymized Trent transcript.
const SAMPLE_LINES: &[&str] = &[
    "Trent University                                           1600",
    "West Bank Drive",
    "Peterborough, Ontario                                          K 9 H  0 G 2 , Canada",
    "Student Number:   9999999",
    "Name: Anonymous User",
    "Undergraduate",
    "Creds Mark Grade  R        __________",
    "Business Administration        0000 H: Course0       0.5     71    B-",
    "Economics                      0001 H: Course1       0.5     75    B",
    "Economics                      0002 H: Course2       0.5     72    B-",
    "Indigenous Studies             0003 H: Course3       0.5     90    A+",
    "Business Administration        0004 H: Course4       0.5     75    B",
    "Computer Science               0005 H: Course5       0.5     89    A",
    "Computer Science               0006 H: Course6       0.5     77    B+",
    "Media Studies                  0008 H: Course8       0.5     92    A+",
    "Sociology                      0009 H: Course9       0.5     81    A-      DEAN'S HONOUR ROLL",
    "Business Administration        0011 H: Course10      0.5     96    A+",
    "Business Administration        0012 H: Course11      0.5     86    A",
    "Economics                      0014 H: Course99      0.5     52    D-",
    "Business Administration        0016 H: Course13      0.5     73    B",
    "Economics                      0019 H: Course99      0.5     78    B+    R",
    "Business Administration        1999 H: Course100     0.5     61    C-",
    "Business Administration        0020 H: Course100     0.5     80    A-    R",
    "Business Administration        0022 H: Course20      0.5     92    A+",
    "Economics                      0025 H: Course23      0.5     90    A+",
    "Business Administration        0030 H: Course28      0.5     95    A+      DEAN'S HONOUR ROLL",
    "Computer Science               0031 H: Course29      0.5     93    A+      DEAN'S HONOUR ROLL",
    "Business Administration        0036 H: Course34",
    "Communications                 0038 H: Course36",
    "Philosophy                     0040 H: Course38      0.5    PRE",
    "Current Academic Status : Good Standing",
];
