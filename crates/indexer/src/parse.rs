//! Tab-delimited line decoding.
//!
//! Every parser takes one already-normalized line (see [`normalize_line`]) and returns `None`
//! when the line does not qualify: wrong field count, an empty required field, or an id that
//! is not a non-negative integer. Callers drop such lines without reporting them.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use recommend_protocol::EntityId;

pub const FIELD_DELIMITER: char = '\t';
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `0001-01-01 00:00:00 UTC` in Unix seconds.
const ZERO_INSTANT_UNIX: i64 = -62_135_596_800;

pub type Timestamp = DateTime<Utc>;

/// Instant used for dates that fail to parse. It is older than any real activity.
pub fn zero_instant() -> Timestamp {
    Utc.timestamp_opt(ZERO_INSTANT_UNIX, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse `YYYY-MM-DD HH:MM:SS` as UTC, falling back to [`zero_instant`].
pub fn parse_date_time(value: &str) -> Timestamp {
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_else(|_| zero_instant())
}

/// Strip the line terminator and case-fold the whole line.
pub fn normalize_line(raw: &str) -> String {
    raw.trim_end_matches(|c| c == '\n' || c == '\r')
        .to_lowercase()
}

fn split_exact(line: &str, expected: usize) -> Option<Vec<&str>> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    (fields.len() == expected).then_some(fields)
}

fn parse_id(value: &str) -> Option<EntityId> {
    value.parse::<EntityId>().ok().filter(|id| *id >= 0)
}

fn all_present(fields: &[&str]) -> bool {
    fields.iter().all(|field| !field.is_empty())
}

/// One timestamped action by `actor` against `subject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityEvent {
    pub subject: EntityId,
    pub actor: EntityId,
    pub at: Timestamp,
}

/// A line of a primary entity file (users or projects).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLine {
    pub id: EntityId,
    pub name: String,
    pub owner: Option<EntityId>,
    pub last_active_at: Timestamp,
}

/// A line of the user profile file, carrying the free-text description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLine {
    pub id: EntityId,
    pub description: String,
}

/// Which primary entity file a line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Project,
}

impl EntityKind {
    pub fn parse_line(self, line: &str) -> Option<EntityLine> {
        match self {
            Self::User => parse_user_line(line),
            Self::Project => parse_project_line(line),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
        }
    }
}

/// `id \t username \t last_sign_in_at \t created_at`
pub fn parse_user_line(line: &str) -> Option<EntityLine> {
    let fields = split_exact(line, 4)?;
    if !all_present(&fields[1..]) {
        return None;
    }
    let id = parse_id(fields[0])?;
    Some(EntityLine {
        id,
        name: fields[1].to_string(),
        owner: None,
        last_active_at: parse_date_time(fields[2]),
    })
}

/// `id \t title \t user_id \t created_at`
pub fn parse_project_line(line: &str) -> Option<EntityLine> {
    let fields = split_exact(line, 4)?;
    if !all_present(&fields[1..]) {
        return None;
    }
    let id = parse_id(fields[0])?;
    let owner = parse_id(fields[2])?;
    Some(EntityLine {
        id,
        name: fields[1].to_string(),
        owner: Some(owner),
        last_active_at: parse_date_time(fields[3]),
    })
}

/// `id \t user_id \t description \t created_at`
pub fn parse_profile_line(line: &str) -> Option<ProfileLine> {
    let fields = split_exact(line, 4)?;
    if !all_present(&fields[1..]) {
        return None;
    }
    Some(ProfileLine {
        id: parse_id(fields[1])?,
        description: fields[2].to_string(),
    })
}

fn parse_event(fields: &[&str], subject: usize, actor: usize, at: usize) -> Option<ActivityEvent> {
    if fields[subject].is_empty() || fields[actor].is_empty() || fields[at].is_empty() {
        return None;
    }
    Some(ActivityEvent {
        subject: parse_id(fields[subject])?,
        actor: parse_id(fields[actor])?,
        at: parse_date_time(fields[at]),
    })
}

/// `id \t project_id \t user_id \t created_at`
pub fn parse_idea_line(line: &str) -> Option<ActivityEvent> {
    let fields = split_exact(line, 4)?;
    parse_event(&fields, 1, 2, 3)
}

/// `id \t project_id \t user_id \t commentable_id \t commentable_type \t created_at`
pub fn parse_comment_line(line: &str) -> Option<ActivityEvent> {
    let fields = split_exact(line, 6)?;
    parse_event(&fields, 1, 2, 5)
}

/// `id \t project_id \t user_id \t status \t created_at`; only `follow` and `join` count.
pub fn parse_project_relation_line(line: &str) -> Option<ActivityEvent> {
    let fields = split_exact(line, 5)?;
    if !matches!(fields[3], "follow" | "join") {
        return None;
    }
    parse_event(&fields, 1, 2, 4)
}

/// `id \t follower_id \t followed_id \t created_at`; the followed user is the subject.
pub fn parse_user_relation_line(line: &str) -> Option<ActivityEvent> {
    let fields = split_exact(line, 4)?;
    parse_event(&fields, 2, 1, 3)
}
