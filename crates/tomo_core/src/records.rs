//! Session records: chat messages, calendar events, memory entries.
//!
//! All of these are plain data holders. Mutation rules live in the session
//! crate: chat is append-only, memories are prepend-only (newest first),
//! calendar events are removable by id but never updated in place.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Companion,
}

/// One line of the home-screen conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    /// Unix timestamp (seconds). Insertion order matches ascending timestamps.
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn now(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// A scheduled event created through the add-event action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Set by the (out-of-scope) preparation flow; handlers never read it.
    pub prepared: bool,
    /// Companion advice attached when the event was created.
    pub advice: Option<String>,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            date,
            time,
            prepared: false,
            advice: None,
        }
    }

    /// Canonical "YYYY-MM-DD HH:MM" text, the form handed to the reaction
    /// service and shown in announcements.
    pub fn when_text(&self) -> String {
        format!("{} {}", self.date.format("%Y-%m-%d"), self.time.format("%H:%M"))
    }
}

/// What kind of moment a memory entry records. `All` is a view filter,
/// never a stored category — hence the separate [`MemoryFilter`] type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Meal,
    Achievement,
    Morning,
}

impl MemoryCategory {
    pub fn label(&self) -> &'static str {
        match self {
            MemoryCategory::Meal => "meal",
            MemoryCategory::Achievement => "achievement",
            MemoryCategory::Morning => "morning",
        }
    }
}

/// Active filter on the memories view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryFilter {
    #[default]
    All,
    Meal,
    Achievement,
    Morning,
}

impl MemoryFilter {
    /// Whether an entry of the given category passes this filter.
    pub fn matches(&self, category: MemoryCategory) -> bool {
        match self {
            MemoryFilter::All => true,
            MemoryFilter::Meal => category == MemoryCategory::Meal,
            MemoryFilter::Achievement => category == MemoryCategory::Achievement,
            MemoryFilter::Morning => category == MemoryCategory::Morning,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(MemoryFilter::All),
            "meal" => Some(MemoryFilter::Meal),
            "achievement" => Some(MemoryFilter::Achievement),
            "morning" => Some(MemoryFilter::Morning),
            _ => None,
        }
    }
}

/// Representative color standing in for an attached meal photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    Coral,
    Amber,
    Mint,
    Sky,
    Lavender,
    Rose,
}

impl ColorTag {
    /// The fixed palette the meal handler draws from.
    pub const PALETTE: [ColorTag; 6] = [
        ColorTag::Coral,
        ColorTag::Amber,
        ColorTag::Mint,
        ColorTag::Sky,
        ColorTag::Lavender,
        ColorTag::Rose,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ColorTag::Coral => "coral",
            ColorTag::Amber => "amber",
            ColorTag::Mint => "mint",
            ColorTag::Sky => "sky",
            ColorTag::Lavender => "lavender",
            ColorTag::Rose => "rose",
        }
    }
}

/// One entry in the memories collection. Prepend-only: the session inserts
/// every new entry at the front so index 0 is always the newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub category: MemoryCategory,
    pub note: Option<String>,
    /// Unix timestamp (seconds).
    pub timestamp: i64,
    /// The companion's reaction text, attached once the service replies.
    pub reaction: Option<String>,
    pub color_tag: Option<ColorTag>,
}

impl MemoryEntry {
    pub fn now(category: MemoryCategory, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            note,
            timestamp: chrono::Utc::now().timestamp(),
            reaction: None,
            color_tag: None,
        }
    }
}

/// Which of the four views is showing. Pure selection, no side effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Home,
    Calendar,
    Memories,
    Settings,
}

impl Screen {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Some(Screen::Home),
            "calendar" => Some(Screen::Calendar),
            "memories" => Some(Screen::Memories),
            "settings" => Some(Screen::Settings),
            _ => None,
        }
    }
}

/// Transient companion mood shown by the renderer. Flips to `Happy` on a
/// completed action and auto-reverts after the configured delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
}
