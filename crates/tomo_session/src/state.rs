//! The session state container.
//!
//! Everything the renderer needs lives here: settings (absent until
//! onboarding), the three record collections, and the transient flags.
//! Nothing survives a restart; `reset_all` returns the whole container to
//! this default.

use serde::{Deserialize, Serialize};
use tomo_core::{
    CalendarEvent, ChatMessage, MemoryEntry, MemoryFilter, Mood, Screen, UserSettings,
};

/// One atomic view of the session. The [`crate::Session`] broadcasts a clone
/// of this after every mutation, so renderers never observe a torn update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Absent until onboarding completes; actions refuse to run without it.
    pub settings: Option<UserSettings>,
    /// Home-screen conversation, insertion order, append-only.
    pub chat: Vec<ChatMessage>,
    /// Calendar events, removable by id.
    pub events: Vec<CalendarEvent>,
    /// Memories, newest first — insertion always happens at the front.
    pub memories: Vec<MemoryEntry>,
    /// True while a reaction is pending (typing/consulting affordance).
    pub thinking: bool,
    pub mood: Mood,
    pub filter: MemoryFilter,
    pub screen: Screen,
}

impl SessionState {
    pub fn is_onboarded(&self) -> bool {
        self.settings.is_some()
    }

    /// Stable, order-preserving projection of the memories view under the
    /// active filter. `All` returns the full collection unchanged.
    pub fn filtered_memories(&self) -> Vec<MemoryEntry> {
        self.memories
            .iter()
            .filter(|m| self.filter.matches(m.category))
            .cloned()
            .collect()
    }
}
