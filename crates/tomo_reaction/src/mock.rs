//! Mock reaction service.
//!
//! Stand-in for a real generative backend: deterministic persona-templated
//! text after simulated latency. It never fails — a real replacement maps
//! its failures into `CompanionError::Service` and should be wrapped in
//! [`crate::retry::RetryingReaction`].

use async_trait::async_trait;
use tomo_core::config::ReactionTiming;
use tomo_core::{
    ColorTag, CompanionError, MemoryCategory, Persona, Reaction, ReportTrigger, UserSettings,
};

/// Persona-specific opener for a habit report.
fn react_prefix(persona: Persona, trigger: ReportTrigger) -> &'static str {
    match (persona, trigger) {
        (Persona::Mom, ReportTrigger::WakeOnTime) => "Good morning, sweetie! ",
        (Persona::Mom, ReportTrigger::WakeLate) => "Oh dear, finally up? ",
        (Persona::Mom, ReportTrigger::Chore) => "Look at you being so helpful! ",
        (Persona::Dad, ReportTrigger::WakeOnTime) => "Morning, champ. ",
        (Persona::Dad, ReportTrigger::WakeLate) => "Burning daylight, huh? ",
        (Persona::Dad, ReportTrigger::Chore) => "That's my kid. ",
        (Persona::Idol, ReportTrigger::WakeOnTime) => "Rise and shine~! ",
        (Persona::Idol, ReportTrigger::WakeLate) => "Sleepyhead alert~! ",
        (Persona::Idol, ReportTrigger::Chore) => "Wow, so dependable! ",
        (Persona::Butler, ReportTrigger::WakeOnTime) => "A punctual start to the day. ",
        (Persona::Butler, ReportTrigger::WakeLate) => "Ah — a leisurely morning, then. ",
        (Persona::Butler, ReportTrigger::Chore) => "Most commendable. ",
    }
}

/// Persona-specific closing phrase. The user's name is appended after it.
fn react_closing(persona: Persona) -> &'static str {
    match persona {
        Persona::Mom => "I'm proud of you",
        Persona::Dad => "Keep it up",
        Persona::Idol => "You're the best",
        Persona::Butler => "Well done",
    }
}

/// Persona- and category-conditioned compliment body.
fn compliment_body(persona: Persona, category: MemoryCategory) -> &'static str {
    match (persona, category) {
        (Persona::Mom, MemoryCategory::Meal) => "That looks so nourishing — eat up!",
        (Persona::Mom, _) => "Another lovely moment to remember.",
        (Persona::Dad, MemoryCategory::Meal) => "Solid plate. Fuel for the day.",
        (Persona::Dad, _) => "Worth writing down, that one.",
        (Persona::Idol, MemoryCategory::Meal) => "That meal is totally photo-worthy~!",
        (Persona::Idol, _) => "Core memory unlocked~!",
        (Persona::Butler, MemoryCategory::Meal) => "An excellent choice of meal, if I may.",
        (Persona::Butler, _) => "Duly recorded for posterity.",
    }
}

/// Persona-specific scheduling acknowledgment lead-in.
fn advice_lead(persona: Persona) -> &'static str {
    match persona {
        Persona::Mom => "I'll remind you, don't worry.",
        Persona::Dad => "On the calendar. Don't be late.",
        Persona::Idol => "It's a date~! I'll be cheering.",
        Persona::Butler => "I have entered it into the schedule.",
    }
}

/// Mock implementation of [`Reaction`]. Latencies are configurable so tests
/// can run with [`ReactionTiming::instant`].
#[derive(Debug, Clone)]
pub struct MockReactionService {
    timing: ReactionTiming,
}

impl MockReactionService {
    pub fn new(timing: ReactionTiming) -> Self {
        Self { timing }
    }

    /// Zero-latency service for tests.
    pub fn instant() -> Self {
        Self::new(ReactionTiming::instant())
    }
}

impl Default for MockReactionService {
    fn default() -> Self {
        Self::new(ReactionTiming::default())
    }
}

#[async_trait]
impl Reaction for MockReactionService {
    async fn react(
        &self,
        settings: &UserSettings,
        trigger: ReportTrigger,
        context: &str,
    ) -> Result<String, CompanionError> {
        tokio::time::sleep(self.timing.react_delay()).await;
        let text = format!(
            "{}{} {}, {}!",
            react_prefix(settings.persona, trigger),
            context,
            react_closing(settings.persona),
            settings.user_name,
        );
        tracing::debug!(persona = settings.persona.label(), ?trigger, "mock reaction ready");
        Ok(text)
    }

    async fn compliment(
        &self,
        settings: &UserSettings,
        color_tag: ColorTag,
        category: MemoryCategory,
    ) -> Result<String, CompanionError> {
        tokio::time::sleep(self.timing.compliment_delay()).await;
        Ok(format!(
            "{} The {} tones suit you, {}.",
            compliment_body(settings.persona, category),
            color_tag.label(),
            settings.user_name,
        ))
    }

    async fn schedule_advice(
        &self,
        settings: &UserSettings,
        title: &str,
        when_text: &str,
    ) -> Result<String, CompanionError> {
        tokio::time::sleep(self.timing.advice_delay()).await;
        Ok(format!(
            "\"{}\" on {} — {}",
            title,
            when_text,
            advice_lead(settings.persona),
        ))
    }
}
