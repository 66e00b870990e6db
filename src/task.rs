//! To-do tasks, as stored in the remote `tasks` collection

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StoreError;
use crate::user::UserId;

/// Used when the remote store hands us a color we cannot display
const FALLBACK_COLOR: &str = "#9ca3af";


/// The identifier of a task. It is assigned by the store and is opaque to this crate
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId {
    content: String,
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Generate a random TaskId. Remote stores assign their own, this is for local stores
    pub fn random() -> Self {
        Self { content: uuid::Uuid::new_v4().to_hyphenated().to_string() }
    }
}
impl From<String> for TaskId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for TaskId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}



#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// The status a task gets when its checkbox is clicked.
    ///
    /// Completed tasks go back to pending, everything else gets completed
    pub fn toggled(&self) -> Self {
        match self {
            TaskStatus::Completed => TaskStatus::Pending,
            _ => TaskStatus::Completed,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = StoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            other => Err(StoreError::validation(format!("unknown status {:?} (expected pending, in_progress or completed)", other))),
        }
    }
}



#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = StoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(StoreError::validation(format!("unknown priority {:?} (expected low, medium or high)", other))),
        }
    }
}



/// A hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`) that can be used as-is in CSS
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskColor {
    hex: String,
}

impl TaskColor {
    /// Validate a hex color string
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let s = s.trim();
        let digits = match s.strip_prefix('#') {
            None => return Err(StoreError::validation(format!("color {:?} must start with '#'", s))),
            Some(d) => d,
        };
        if ![3, 4, 6, 8].contains(&digits.len()) {
            return Err(StoreError::validation(format!("color {:?} is not a hex color", s)));
        }
        if let Err(err) = csscolorparser::parse(s) {
            return Err(StoreError::validation(format!("color {:?} is not a hex color: {}", s, err)));
        }
        Ok(Self { hex: s.to_ascii_lowercase() })
    }

    /// Pick a pseudo-random opaque color
    pub fn random() -> Self {
        let value: u32 = rand::thread_rng().gen_range(0..=0x00ff_ffff);
        Self { hex: format!("#{:06x}", value) }
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// The red, green and blue components of this color
    pub fn rgb(&self) -> (u8, u8, u8) {
        match csscolorparser::parse(&self.hex) {
            Ok(color) => {
                let (r, g, b, _a) = color.rgba_u8();
                (r, g, b)
            },
            // Cannot happen, the content has been validated when this was built
            Err(_) => (0x9c, 0xa3, 0xaf),
        }
    }
}

impl Default for TaskColor {
    fn default() -> Self {
        Self { hex: FALLBACK_COLOR.to_string() }
    }
}

impl Display for TaskColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hex)
    }
}

impl Serialize for TaskColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.hex)
    }
}

/// Colors are not critical data. An invalid color from the store is replaced rather than rejecting the whole task
impl<'de> Deserialize<'de> for TaskColor {
    fn deserialize<D>(deserializer: D) -> Result<TaskColor, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(TaskColor::parse) {
            Some(Ok(color)) => Ok(color),
            Some(Err(err)) => {
                log::warn!("Invalid task color ({}). Using a default color instead", err);
                Ok(TaskColor::default())
            },
            None => Ok(TaskColor::default()),
        }
    }
}



/// Parse a due date the way the store may send it.
///
/// Plain dates are taken as-is. Timestamps are converted to the local calendar day they fall on.
pub fn parse_due_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    // `timestamp without time zone` columns
    for format in &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.date());
        }
    }
    None
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let parsed = parse_due_date(&s);
        if parsed.is_none() {
            log::warn!("Unable to parse due date {:?}, ignoring it", s);
        }
        parsed
    }))
}



/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    status: TaskStatus,
    priority: Priority,
    #[serde(default)]
    color: TaskColor,
    #[serde(default, deserialize_with = "deserialize_due_date")]
    due_date: Option<NaiveDate>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    /// Link to an event in an external calendar, if this task has been exported
    #[serde(default)]
    google_event_id: Option<String>,
}

impl Task {
    /// Build the task a store holds once it has accepted a [`NewTask`]
    pub fn from_new(id: TaskId, fields: NewTask, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            color: fields.color,
            due_date: fields.due_date,
            created_by: fields.created_by,
            created_at,
            google_event_id: None,
        }
    }

    pub fn id(&self) -> &TaskId                   { &self.id          }
    pub fn title(&self) -> &str                   { &self.title       }
    pub fn description(&self) -> Option<&str>     { self.description.as_deref() }
    pub fn status(&self) -> TaskStatus            { self.status       }
    pub fn priority(&self) -> Priority            { self.priority     }
    pub fn color(&self) -> &TaskColor             { &self.color       }
    pub fn due_date(&self) -> Option<NaiveDate>   { self.due_date     }
    pub fn created_by(&self) -> &UserId           { &self.created_by  }
    pub fn created_at(&self) -> &DateTime<Utc>    { &self.created_at  }
    pub fn google_event_id(&self) -> Option<&str> { self.google_event_id.as_deref() }
    pub fn completed(&self) -> bool { self.status == TaskStatus::Completed }

    /// Whether this task is due on the given (local) calendar day
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_date == Some(day)
    }

    /// Apply every field that is present in a patch
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
    }
}



/// The fields sent to the store to create a task. Its id and creation time are assigned by the store
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub color: TaskColor,
    pub due_date: Option<NaiveDate>,
    pub created_by: UserId,
}



/// A partial update of a task.
///
/// Only the fields that are `Some` are sent to the store. `description` and `due_date` can be cleared with `Some(None)`
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<TaskColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    /// A patch that only changes the status
    pub fn status(status: TaskStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn remote_row() -> serde_json::Value {
        json!({
            "id": "6a1c0f4e-0000-4000-8000-000000000001",
            "title": "Water the plants",
            "description": null,
            "status": "in_progress",
            "priority": "high",
            "color": "#3B82F6",
            "due_date": "2024-03-05",
            "created_by": "user-1",
            "created_at": "2024-03-01T10:00:00.123456+00:00",
            "google_event_id": null
        })
    }

    #[test]
    fn deserialize_remote_row() {
        let task: Task = serde_json::from_value(remote_row()).unwrap();
        assert_eq!(task.id().as_str(), "6a1c0f4e-0000-4000-8000-000000000001");
        assert_eq!(task.status(), TaskStatus::InProgress);
        assert_eq!(task.priority(), Priority::High);
        assert_eq!(task.color().as_str(), "#3b82f6");
        assert_eq!(task.due_date(), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(task.description(), None);
    }

    #[test]
    fn invalid_color_is_replaced() {
        let mut row = remote_row();
        row["color"] = json!("blue-ish");
        let task: Task = serde_json::from_value(row).unwrap();
        assert_eq!(task.color(), &TaskColor::default());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut row = remote_row();
        row["status"] = json!("archived");
        assert!(serde_json::from_value::<Task>(row).is_err());
    }

    #[test]
    fn due_date_formats() {
        assert_eq!(parse_due_date("2024-03-05"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_due_date("2024-03-05T12:30:00"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_due_date("not a date"), None);

        // Timestamps are interpreted in the local time zone
        let ts = "2024-03-05T12:00:00+00:00";
        let expected = DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Local).date_naive();
        assert_eq!(parse_due_date(ts), Some(expected));
    }

    #[test]
    fn due_date_is_written_as_a_plain_date() {
        let task: Task = serde_json::from_value(remote_row()).unwrap();
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["due_date"], json!("2024-03-05"));
    }

    #[test]
    fn colors() {
        assert!(TaskColor::parse("#fff").is_ok());
        assert!(TaskColor::parse("#A1b2C3").is_ok());
        assert!(TaskColor::parse("#a1b2c3d4").is_ok());
        assert!(TaskColor::parse("a1b2c3").is_err());
        assert!(TaskColor::parse("#12345").is_err());
        assert!(TaskColor::parse("#ggg").is_err());
        assert_eq!(TaskColor::parse("#ff8000").unwrap().rgb(), (255, 128, 0));

        for _ in 0..100 {
            let random = TaskColor::random();
            assert_eq!(random.as_str().len(), 7);
            assert!(TaskColor::parse(random.as_str()).is_ok());
        }
    }

    #[test]
    fn toggling_twice_is_a_no_op() {
        for status in &[TaskStatus::Pending, TaskStatus::Completed] {
            assert_eq!(status.toggled().toggled(), *status);
        }
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
    }

    #[test]
    fn parse_enums() {
        assert_eq!("In-Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().unwrap_err().is_validation());
    }

    #[test]
    fn patch_only_serializes_present_fields() {
        let patch = TaskPatch::status(TaskStatus::Completed);
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"status": "completed"}));

        let clear_due = TaskPatch { due_date: Some(None), ..TaskPatch::default() };
        assert_eq!(serde_json::to_value(&clear_due).unwrap(), json!({"due_date": null}));

        assert!(TaskPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn apply_patch() {
        let mut task: Task = serde_json::from_value(remote_row()).unwrap();
        task.apply_patch(&TaskPatch {
            status: Some(TaskStatus::Completed),
            due_date: Some(None),
            ..TaskPatch::default()
        });
        assert!(task.completed());
        assert_eq!(task.due_date(), None);
        assert_eq!(task.title(), "Water the plants");
    }
}
