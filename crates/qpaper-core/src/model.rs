//! Core data model types for qpaper.
//!
//! Questions as the question bank serves them, the course and session
//! context a paper is assembled under, and the editable paper metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Canonical question identifier.
///
/// The question bank must emit it as the `id` field, either as an integer
/// or as a string of digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawQuestionId", into = "i64")]
pub struct QuestionId(i64);

impl QuestionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for QuestionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<QuestionId> for i64 {
    fn from(id: QuestionId) -> Self {
        id.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuestionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(QuestionId)
            .map_err(|_| format!("invalid question id: '{}'", s.trim()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuestionId {
    Int(i64),
    Text(String),
}

impl TryFrom<RawQuestionId> for QuestionId {
    type Error = String;

    fn try_from(raw: RawQuestionId) -> Result<Self, Self::Error> {
        match raw {
            RawQuestionId::Int(id) => Ok(QuestionId(id)),
            RawQuestionId::Text(text) => text.parse(),
        }
    }
}

/// A question from the question bank.
///
/// Immutable once fetched. `unit_id`, `co` and `bt` arrive as strings or
/// numbers depending on the producer and are held as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub unit_id: String,
    #[serde(default)]
    pub unit_name: Option<String>,
    /// Course outcome tag.
    #[serde(default, deserialize_with = "string_or_number")]
    pub co: String,
    /// Bloom's-taxonomy level.
    #[serde(default, deserialize_with = "string_or_number")]
    pub bt: String,
    pub marks: u32,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub image_paths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub equations: Vec<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

// Tags are stored as a JSON document upstream and may be an object or null.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Paper category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExamType {
    /// Continuous internal evaluation.
    #[default]
    Cie,
    /// Semester-end examination.
    See,
    Improvement,
    Makeup,
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::Cie => write!(f, "CIE"),
            ExamType::See => write!(f, "SEE"),
            ExamType::Improvement => write!(f, "IMPROVEMENT"),
            ExamType::Makeup => write!(f, "MAKEUP"),
        }
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CIE" => Ok(ExamType::Cie),
            "SEE" => Ok(ExamType::See),
            "IMPROVEMENT" => Ok(ExamType::Improvement),
            "MAKEUP" => Ok(ExamType::Makeup),
            other => Err(format!("unknown exam type: {other}")),
        }
    }
}

/// The course a paper is being assembled for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseContext {
    /// Identifier used in service URLs.
    pub course_id: String,
    pub course_code: String,
    pub course_title: String,
}

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "faculty" => Ok(Role::Faculty),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Explicit session credentials handed to the client and the assembly.
///
/// Note: Debug masks the token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub token: String,
    pub role: Role,
}

impl SessionContext {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"***")
            .field("role", &self.role)
            .finish()
    }
}

/// Paper details entered on the assembly form.
///
/// Course code and title come from the [`CourseContext`] and cannot be
/// edited; every other field is free text as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperMetadata {
    course_code: String,
    course_title: String,
    /// Exam date, `YYYY-MM-DD`.
    pub date: String,
    /// Maximum marks as entered; coerced to an integer on submission.
    pub max_marks: String,
    pub duration: String,
    pub semester: String,
    pub exam_type: ExamType,
    /// Regular vs. improvement continuous-evaluation paper.
    pub is_improvement_cie: bool,
}

impl PaperMetadata {
    /// Fresh metadata for a course, dated today, exam type CIE.
    pub fn for_course(course: &CourseContext) -> Self {
        Self {
            course_code: course.course_code.clone(),
            course_title: course.course_title.clone(),
            date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            max_marks: String::new(),
            duration: String::new(),
            semester: String::new(),
            exam_type: ExamType::default(),
            is_improvement_cie: false,
        }
    }

    pub fn course_code(&self) -> &str {
        &self.course_code
    }

    pub fn course_title(&self) -> &str {
        &self.course_title
    }

    /// `max_marks` coerced to an integer, `None` if it has no leading digits.
    pub fn max_marks_value(&self) -> Option<i64> {
        parse_int_prefix(&self.max_marks)
    }
}

/// Parse the leading integer of a token, ignoring surrounding whitespace
/// and any trailing non-digit characters (`"10 marks"` → 10).
pub fn parse_int_prefix(token: &str) -> Option<i64> {
    let token = token.trim();
    let digits_start = usize::from(token.starts_with(['-', '+']));
    let digits_len = token[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    token[..digits_start + digits_len].parse().ok()
}
