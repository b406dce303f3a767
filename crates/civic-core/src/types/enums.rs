use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Declaration order is the display order of the category index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum Category {
    Community,
    Government,
    #[serde(alias = "Public_Safety")]
    PublicSafety,
    Infrastructure,
    Health,
    Education,
    Recreation,
    Environment,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Community,
        Category::Government,
        Category::PublicSafety,
        Category::Infrastructure,
        Category::Health,
        Category::Education,
        Category::Recreation,
        Category::Environment,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Community => "Community",
            Self::Government => "Government",
            Self::PublicSafety => "PublicSafety",
            Self::Infrastructure => "Infrastructure",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::Recreation => "Recreation",
            Self::Environment => "Environment",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive; underscores, spaces and hyphens are ignored so
    /// `public_safety`, `Public Safety` and `PublicSafety` all resolve.
    pub fn parse(value: &str) -> Option<Self> {
        let wanted = normalize(value);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|category| normalize(category.as_str()) == wanted)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub const ALL: [EventStatus; 4] = [
        EventStatus::Draft,
        EventStatus::Published,
        EventStatus::Cancelled,
        EventStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}
