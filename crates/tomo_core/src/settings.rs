//! User settings and the companion persona.
//!
//! `UserSettings` is the per-session singleton produced by onboarding.
//! Its absence means onboarding has not completed, and every action handler
//! that needs it refuses to run with a surfaced precondition failure rather
//! than a silent no-op.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// The four companion characters. Their only effect is the phrasing of
/// generated text; all behavior is persona-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Mom,
    Dad,
    Idol,
    Butler,
}

impl Persona {
    /// Human-readable label for rendering and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Persona::Mom => "Mom",
            Persona::Dad => "Dad",
            Persona::Idol => "Idol",
            Persona::Butler => "Butler",
        }
    }

    /// How this persona addresses the user in generated text.
    pub fn honorific(&self) -> &'static str {
        match self {
            Persona::Mom => "sweetie",
            Persona::Dad => "kiddo",
            Persona::Idol => "my biggest fan",
            Persona::Butler => "if I may say so",
        }
    }

    /// Parse a user-facing persona name (CLI / onboarding input).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mom" => Some(Persona::Mom),
            "dad" => Some(Persona::Dad),
            "idol" => Some(Persona::Idol),
            "butler" => Some(Persona::Butler),
            _ => None,
        }
    }
}

/// Onboarding result. One per session, absent until onboarding completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Display name, woven into every generated reaction.
    pub user_name: String,
    pub persona: Persona,
    /// Target wake-up time. Reports after this plus the grace window count
    /// as late.
    pub wake_target: NaiveTime,
    /// Free-text memo, absent until the user writes one.
    pub memo: Option<String>,
}

impl UserSettings {
    pub fn new(user_name: impl Into<String>, persona: Persona, wake_target: NaiveTime) -> Self {
        Self {
            user_name: user_name.into(),
            persona,
            wake_target,
            memo: None,
        }
    }
}
