use super::SeriesKey;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An external announcement joined onto price series by timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialUpdateEvent {
    /// When the announcement was published
    pub timestamp: DateTime<Utc>,

    /// Series the announcement concerns; `None` applies to every series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<SeriesKey>,

    pub description: String,
}

impl SocialUpdateEvent {
    /// Game-wide announcement
    pub fn global(timestamp: DateTime<Utc>, description: impl Into<String>) -> Self {
        Self {
            timestamp,
            target: None,
            description: description.into(),
        }
    }

    /// Announcement scoped to a single item or category
    pub fn targeted(timestamp: DateTime<Utc>, target: SeriesKey, description: impl Into<String>) -> Self {
        Self {
            timestamp,
            target: Some(target),
            description: description.into(),
        }
    }

    /// Whether this event may be joined onto the given series
    pub fn applies_to(&self, key: SeriesKey) -> bool {
        self.target.map_or(true, |target| target == key)
    }
}

/// Raw post from the Runescape social feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(rename = "dateAdded")]
    pub date_added: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SocialPost {
    pub fn date(&self) -> NaiveDate {
        self.date_added.date_naive()
    }

    /// Game-wide event carrying the post title
    pub fn to_event(&self) -> SocialUpdateEvent {
        SocialUpdateEvent::global(self.date_added, self.title.clone().unwrap_or_default())
    }
}

/// Category of announcement detected from a post title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateKind {
    /// New release
    Launch,
    /// Bosses are large drop sources
    Boss,
    /// Quests unlock content that consumes items
    Quest,
    Event,
    /// Known market mover
    DoubleXp,
    General,
}

impl UpdateKind {
    pub const ALL: [UpdateKind; 6] = [
        UpdateKind::Launch,
        UpdateKind::Boss,
        UpdateKind::Quest,
        UpdateKind::Event,
        UpdateKind::DoubleXp,
        UpdateKind::General,
    ];

    /// Case-sensitive title keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            UpdateKind::Launch => "Launch",
            UpdateKind::Boss => "Boss",
            UpdateKind::Quest => "Quest",
            UpdateKind::Event => "Event",
            UpdateKind::DoubleXp => "Double XP",
            UpdateKind::General => "Update",
        }
    }

    /// Output column name
    pub fn column(&self) -> &'static str {
        match self {
            UpdateKind::Launch => "launch_update",
            UpdateKind::Boss => "boss_update",
            UpdateKind::Quest => "quest_update",
            UpdateKind::Event => "event_update",
            UpdateKind::DoubleXp => "dxp_update",
            UpdateKind::General => "general_update",
        }
    }

    fn index(&self) -> usize {
        match self {
            UpdateKind::Launch => 0,
            UpdateKind::Boss => 1,
            UpdateKind::Quest => 2,
            UpdateKind::Event => 3,
            UpdateKind::DoubleXp => 4,
            UpdateKind::General => 5,
        }
    }
}

/// One flag per `UpdateKind`, indexed in `UpdateKind::ALL` order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFlags([bool; 6]);

impl UpdateFlags {
    /// Classify a post title; a missing title matches nothing
    pub fn from_title(title: Option<&str>) -> Self {
        let mut flags = Self::default();
        if let Some(title) = title {
            for kind in UpdateKind::ALL {
                flags.0[kind.index()] = title.contains(kind.keyword());
            }
        }
        flags
    }

    pub fn get(&self, kind: UpdateKind) -> bool {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: UpdateKind, value: bool) {
        self.0[kind.index()] = value;
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|f| *f)
    }

    /// Element-wise OR
    pub fn merge(&mut self, other: UpdateFlags) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0) {
            *mine |= theirs;
        }
    }
}
