//! Question filter criteria.
//!
//! Raw comma-separated input per dimension, normalized into a [`FilterQuery`].

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{parse_int_prefix, Question};

/// Raw filter input as typed on the form. An empty field places no
/// constraint on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub units: String,
    pub cos: String,
    pub bts: String,
    pub marks: String,
}

impl FilterCriteria {
    pub fn with_units(mut self, raw: impl Into<String>) -> Self {
        self.units = raw.into();
        self
    }

    pub fn with_cos(mut self, raw: impl Into<String>) -> Self {
        self.cos = raw.into();
        self
    }

    pub fn with_bts(mut self, raw: impl Into<String>) -> Self {
        self.bts = raw.into();
        self
    }

    pub fn with_marks(mut self, raw: impl Into<String>) -> Self {
        self.marks = raw.into();
        self
    }

    /// Whether every field is blank.
    pub fn is_blank(&self) -> bool {
        [&self.units, &self.cos, &self.bts, &self.marks]
            .iter()
            .all(|f| f.trim().is_empty())
    }

    /// Split each field on commas and trim the tokens. Marks tokens are
    /// parsed as integers; tokens without a leading integer are dropped.
    pub fn normalize(&self) -> FilterQuery {
        let marks: BTreeSet<i64> = split_tokens(&self.marks)
            .iter()
            .filter_map(|t| parse_int_prefix(t))
            .collect();

        FilterQuery {
            unit_numbers: non_empty(split_tokens(&self.units)),
            cos: non_empty(split_tokens(&self.cos)),
            bts: non_empty(split_tokens(&self.bts)),
            marks: non_empty(marks),
        }
    }
}

/// Split raw text on commas, trimming whitespace and skipping empty tokens.
pub fn split_tokens(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty<T>(set: BTreeSet<T>) -> Option<BTreeSet<T>> {
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}

/// A normalized filter. `None` means "no constraint on this dimension".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    pub unit_numbers: Option<BTreeSet<String>>,
    pub cos: Option<BTreeSet<String>>,
    pub bts: Option<BTreeSet<String>>,
    pub marks: Option<BTreeSet<i64>>,
}

impl FilterQuery {
    /// True when no dimension is constrained.
    pub fn is_unfiltered(&self) -> bool {
        self.unit_numbers.is_none()
            && self.cos.is_none()
            && self.bts.is_none()
            && self.marks.is_none()
    }

    /// Evaluate the query against a single question, the way the question
    /// bank does server-side.
    pub fn matches(&self, question: &Question) -> bool {
        fn allows<T: Ord>(set: &Option<BTreeSet<T>>, value: &T) -> bool {
            set.as_ref().map_or(true, |s| s.contains(value))
        }

        allows(&self.unit_numbers, &question.unit_id)
            && allows(&self.cos, &question.co)
            && allows(&self.bts, &question.bt)
            && allows(&self.marks, &i64::from(question.marks))
    }

    /// Wire payload for the filter endpoint.
    pub fn payload<'a>(&'a self, course_id: &'a str) -> FilterPayload<'a> {
        fn strings(set: &Option<BTreeSet<String>>) -> Vec<&str> {
            set.iter().flatten().map(String::as_str).collect()
        }

        FilterPayload {
            course_id,
            unit_numbers: strings(&self.unit_numbers),
            cos: strings(&self.cos),
            bts: strings(&self.bts),
            marks: self.marks.iter().flatten().copied().collect(),
        }
    }
}

/// `{ course_id, unit_numbers, cos, bts, marks }` as the question bank
/// expects it. Empty lists mean no constraint.
#[derive(Debug, Serialize)]
pub struct FilterPayload<'a> {
    pub course_id: &'a str,
    pub unit_numbers: Vec<&'a str>,
    pub cos: Vec<&'a str>,
    pub bts: Vec<&'a str>,
    pub marks: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn set(items: &[&str]) -> Option<BTreeSet<String>> {
        Some(items.iter().map(|s| s.to_string()).collect())
    }

    fn question(unit: &str, co: &str, bt: &str, marks: u32) -> Question {
        Question {
            id: QuestionId::new(1),
            text: "Define a process.".into(),
            unit_id: unit.into(),
            unit_name: None,
            co: co.into(),
            bt: bt.into(),
            marks,
            difficulty_level: None,
            kind: None,
            tags: vec![],
            image_paths: vec![],
            equations: vec![],
        }
    }

    #[test]
    fn splits_and_trims_every_text_field() {
        let query = FilterCriteria::default()
            .with_units("1, 2,3")
            .with_cos("1, 2,3")
            .with_bts("1, 2,3")
            .normalize();
        assert_eq!(query.unit_numbers, set(&["1", "2", "3"]));
        assert_eq!(query.cos, set(&["1", "2", "3"]));
        assert_eq!(query.bts, set(&["1", "2", "3"]));
        assert_eq!(query.marks, None);
    }

    #[test]
    fn drops_non_numeric_marks() {
        let query = FilterCriteria::default().with_marks("1,x,3").normalize();
        assert_eq!(query.marks, Some(BTreeSet::from([1, 3])));
    }

    #[test]
    fn all_invalid_marks_mean_no_constraint() {
        let query = FilterCriteria::default().with_marks("x, y").normalize();
        assert_eq!(query.marks, None);
        assert!(query.is_unfiltered());
    }

    #[test]
    fn empty_criteria_request_unfiltered_pool() {
        let criteria = FilterCriteria::default();
        assert!(criteria.is_blank());
        assert!(criteria.normalize().is_unfiltered());

        let stray_commas = FilterCriteria::default().with_units(" , ,");
        assert!(stray_commas.normalize().is_unfiltered());
    }

    #[test]
    fn query_matches_like_the_question_bank() {
        let query = FilterCriteria::default()
            .with_units("1,2")
            .with_marks("5")
            .normalize();
        assert!(query.matches(&question("2", "CO1", "L2", 5)));
        assert!(!query.matches(&question("3", "CO1", "L2", 5)));
        assert!(!query.matches(&question("1", "CO1", "L2", 10)));
        assert!(FilterQuery::default().matches(&question("9", "CO9", "L6", 20)));
    }

    #[test]
    fn payload_uses_empty_lists_for_unconstrained_dimensions() {
        let query = FilterCriteria::default()
            .with_cos("CO2,CO1")
            .with_marks("10, 2")
            .normalize();
        let json = serde_json::to_value(query.payload("CS301")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "course_id": "CS301",
                "unit_numbers": [],
                "cos": ["CO1", "CO2"],
                "bts": [],
                "marks": [2, 10]
            })
        );
    }
}
