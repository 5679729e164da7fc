use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::status::ContestWindow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub solved_problems_count: Option<u32>,
    #[serde(default)]
    pub total_points: Option<f64>,
}

fn default_role() -> String {
    "user".to_string()
}

/// A user as the server sends it. Raw documents may carry `_id` next to `id` or `user_id`.
#[derive(Deserialize)]
struct UserRecord {
    #[serde(default, rename = "_id")]
    mongo_id: Option<RawId>,
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    user_id: Option<RawId>,
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default = "default_role")]
    role: String,
    #[serde(default, deserialize_with = "optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    solved_problems_count: Option<u32>,
    #[serde(default)]
    total_points: Option<f64>,
}

impl TryFrom<UserRecord> for User {
    type Error = String;

    fn try_from(r: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: first_id("user", [r.mongo_id, r.id, r.user_id])?,
            username: r.username,
            email: r.email,
            role: r.role,
            created_at: r.created_at,
            solved_problems_count: r.solved_problems_count,
            total_points: r.total_points,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body returned by `/api/register` and `/api/login`. Registration returns the user's id and name
/// inline, login may return a full user object.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, deserialize_with = "optional_object_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl AuthResponse {
    /// Best-effort user record for the freshly issued token.
    pub fn user_or(&self, email: Option<String>) -> Option<User> {
        if let Some(user) = &self.user {
            return Some(user.clone());
        }
        match (&self.user_id, &self.username) {
            (Some(id), Some(username)) => Some(User {
                id: id.clone(),
                username: username.clone(),
                email,
                role: default_role(),
                ..User::default()
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProblemRecord")]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub difficulty: String,
    /// Trusted HTML from the server.
    pub description: String,
    pub test_cases: Vec<TestCase>,
    #[serde(rename = "defaultCode")]
    pub default_code: HashMap<String, String>,
}

/// Problem routes use the numeric `id`; `_id` is only a fallback.
#[derive(Deserialize)]
struct ProblemRecord {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<RawId>,
    title: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    test_cases: Vec<TestCase>,
    #[serde(rename = "defaultCode", default)]
    default_code: HashMap<String, String>,
}

impl TryFrom<ProblemRecord> for Problem {
    type Error = String;

    fn try_from(r: ProblemRecord) -> Result<Self, Self::Error> {
        Ok(Problem {
            id: first_id("problem", [r.id, r.mongo_id])?,
            title: r.title,
            difficulty: r.difficulty,
            description: r.description,
            test_cases: r.test_cases,
            default_code: r.default_code,
        })
    }
}

impl Problem {
    /// Starter code for `language`: the server's template if it has one, a comment otherwise.
    pub fn starter_code(&self, language: &str) -> String {
        starter_code(&self.default_code, language)
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::parse(&self.difficulty)
    }

    /// The first two test cases, which are shown as worked examples.
    pub fn examples(&self) -> &[TestCase] {
        &self.test_cases[..self.test_cases.len().min(2)]
    }
}

pub fn starter_code(templates: &HashMap<String, String>, language: &str) -> String {
    if let Some(code) = templates.get(language) {
        return code.clone();
    }
    let comment = match language {
        "python" => "#",
        _ => "//",
    };
    format!("{} Write your {} solution here\n", comment, language)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Other,
}

impl Difficulty {
    pub fn parse(s: &str) -> Difficulty {
        match s.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Other,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Difficulty::Easy => "green",
            Difficulty::Medium => "orange",
            Difficulty::Hard => "red",
            Difficulty::Other => "blue",
        }
    }
}

/// Languages offered on the practice problem page, as (value, label).
pub const PRACTICE_LANGUAGES: &[(&str, &str)] = &[
    ("javascript", "JavaScript"),
    ("python", "Python"),
    ("java", "Java"),
    ("cpp", "C++"),
];

/// Languages accepted during an olympiad. The olympiad judge runs Python only, so the selector on
/// the problem set has a single entry and re-selecting it leaves every buffer as it was.
pub const OLYMPIAD_LANGUAGES: &[(&str, &str)] = &[("python", "Python")];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<String>,
    pub code: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected: String,
    #[serde(default)]
    pub actual: String,
    pub status: String,
    #[serde(default)]
    pub runtime: f64,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default, deserialize_with = "optional_object_id")]
    pub submission_id: Option<String>,
    #[serde(default, deserialize_with = "optional_object_id")]
    pub problem_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub runtime: f64,
    #[serde(default)]
    pub results: Vec<TestResult>,
    #[serde(default)]
    pub points_earned: Option<f64>,
    #[serde(default)]
    pub time_taken: Option<f64>,
    /// Set locally when the server refused the submission outright.
    #[serde(default)]
    pub error: Option<String>,
}

impl SubmissionResult {
    /// A result standing in for a submission the server rejected with `message`.
    pub fn rejected(message: impl Into<String>) -> Self {
        SubmissionResult {
            submission_id: None,
            problem_id: None,
            status: "rejected".to_string(),
            is_correct: false,
            runtime: 0.0,
            results: vec![],
            points_earned: Some(0.0),
            time_taken: Some(0.0),
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OlympiadRecord")]
pub struct Olympiad {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub rules: Vec<String>,
}

/// Olympiad routes use the document `_id`; a plain `id` is only a fallback.
#[derive(Deserialize)]
struct OlympiadRecord {
    #[serde(default, rename = "_id")]
    mongo_id: Option<RawId>,
    #[serde(default)]
    id: Option<RawId>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(deserialize_with = "timestamp")]
    start_time: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp")]
    end_time: DateTime<Utc>,
    #[serde(default)]
    rules: Vec<String>,
}

impl TryFrom<OlympiadRecord> for Olympiad {
    type Error = String;

    fn try_from(r: OlympiadRecord) -> Result<Self, Self::Error> {
        Ok(Olympiad {
            id: first_id("olympiad", [r.mongo_id, r.id])?,
            name: r.name,
            description: r.description,
            start_time: r.start_time,
            end_time: r.end_time,
            rules: r.rules,
        })
    }
}

impl Olympiad {
    pub fn window(&self) -> ContestWindow {
        ContestWindow::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStatus {
    #[serde(rename = "isRegistered", default)]
    pub is_registered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedProblem {
    #[serde(deserialize_with = "object_id")]
    pub problem_id: String,
    #[serde(default)]
    pub points_earned: f64,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub solved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(deserialize_with = "object_id")]
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub total_points: f64,
    #[serde(default)]
    pub problems_solved: Vec<SolvedProblem>,
}

/// An identifier as it comes off the wire: a string, a number, or a MongoDB `{"$oid": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
    Object {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl From<RawId> for String {
    fn from(raw: RawId) -> String {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
            RawId::Object { oid } => oid,
        }
    }
}

/// The first identifier present, in order of preference.
fn first_id<const N: usize>(
    kind: &str,
    candidates: [Option<RawId>; N],
) -> Result<String, String> {
    candidates
        .into_iter()
        .flatten()
        .next()
        .map(String::from)
        .ok_or_else(|| format!("{} record has no identifier", kind))
}

fn object_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_object_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// A timestamp as it comes off the wire: a formatted string, epoch milliseconds, or a MongoDB
/// `{"$date": ...}` wrapping either.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
    Date {
        #[serde(rename = "$date")]
        date: Box<RawTimestamp>,
    },
    NumberLong {
        #[serde(rename = "$numberLong")]
        millis: String,
    },
}

impl RawTimestamp {
    fn resolve(self) -> Result<DateTime<Utc>, String> {
        match self {
            RawTimestamp::Text(s) => parse_timestamp(&s),
            RawTimestamp::Millis(ms) => from_millis(ms),
            RawTimestamp::Date { date } => date.resolve(),
            RawTimestamp::NumberLong { millis } => millis
                .parse::<i64>()
                .map_err(|e| e.to_string())
                .and_then(from_millis),
        }
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| format!("timestamp out of range: {}", ms))
}

/// Parses RFC 3339, RFC 2822, or a naive ISO 8601 date-time taken to be UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!("unrecognised timestamp: {}", s))
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    RawTimestamp::deserialize(deserializer)?
        .resolve()
        .map_err(serde::de::Error::custom)
}

fn optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(raw) => raw.resolve().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
