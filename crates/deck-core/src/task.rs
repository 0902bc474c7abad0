use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "uncategorized";
const CATEGORY_SENTINEL: &str = "default";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(anyhow::anyhow!("invalid priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: u64,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub date: String,

    #[serde(default)]
    pub time: String,

    #[serde(default = "default_category")]
    pub category: String,

    pub priority: Priority,

    pub status: Status,

    // Absent in collections saved before percent editing existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<u8>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Task {
    pub fn new_pending(id: u64, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            time: draft.time,
            category: canonicalize_category(&draft.category),
            priority: draft.priority,
            status: Status::Pending,
            percent: Some(0),
        }
    }

    pub fn effective_percent(&self) -> u8 {
        self.percent.unwrap_or(match self.status {
            Status::Completed => 100,
            Status::Pending | Status::InProgress => 0,
        })
    }

    // Sole reconciliation point: percent is authoritative, status follows.
    pub fn apply_percent(&mut self, percent: u8) {
        let percent = percent.min(100);
        self.percent = Some(percent);
        self.status = match percent {
            0 => Status::Pending,
            100 => Status::Completed,
            _ => Status::InProgress,
        };
    }

    pub fn toggle(&mut self) {
        match self.status {
            Status::Completed => self.apply_percent(0),
            Status::Pending | Status::InProgress => self.apply_percent(100),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub category: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
}

pub fn canonicalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(CATEGORY_SENTINEL) {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

pub fn clamp_percent(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}
