pub mod config;
pub mod error;
pub mod records;
pub mod settings;

pub use config::TomoConfig;
pub use error::CompanionError;
pub use records::{
    CalendarEvent, ChatMessage, ColorTag, MemoryCategory, MemoryEntry, MemoryFilter, Mood, Screen,
    Sender,
};
pub use settings::{Persona, UserSettings};

use async_trait::async_trait;

/// What a habit report is about, from the reaction service's point of view.
///
/// Wake-up reports carry their lateness verdict so the service can pick
/// encouragement or mild correction; the persona-specific phrasing is
/// entirely the service's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTrigger {
    WakeOnTime,
    WakeLate,
    Chore,
}

/// The seam where a real generative backend plugs in.
///
/// The bundled implementation (the `tomo_reaction` crate) is a mock that never fails
/// and returns persona-templated canned text after simulated latency. A real
/// replacement maps its own failures into [`CompanionError::Service`]; the
/// session layer guarantees no partial chat/record state survives a failure.
#[async_trait]
pub trait Reaction: Send + Sync {
    /// React to a habit report (wake-up or chore). The returned text weaves
    /// the supplied context into persona-specific phrasing that addresses
    /// the user by name.
    async fn react(
        &self,
        settings: &UserSettings,
        trigger: ReportTrigger,
        context: &str,
    ) -> Result<String, CompanionError>;

    /// Compliment a meal photo. `color_tag` stands in for the attached image.
    async fn compliment(
        &self,
        settings: &UserSettings,
        color_tag: ColorTag,
        category: MemoryCategory,
    ) -> Result<String, CompanionError>;

    /// Acknowledge a newly scheduled event, optionally with advice.
    async fn schedule_advice(
        &self,
        settings: &UserSettings,
        title: &str,
        when_text: &str,
    ) -> Result<String, CompanionError>;
}
