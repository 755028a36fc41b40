//! The session driver: one mutation entry point per renderer intent.
//!
//! `Session` owns the state behind an `RwLock` and broadcasts a full
//! [`SessionState`] snapshot over a watch channel after every mutation.
//! Action handlers follow one shape: guard preconditions, append the
//! user-authored record and raise the thinking flag, await the reaction
//! service (the only suspension point), then apply the completion under a
//! single write lock. A generation counter makes delayed completions and
//! mood-reset timers no-ops after `reset_all`.

use crate::state::SessionState;
use crate::wake;
use chrono::{Local, NaiveDate, NaiveTime};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tomo_core::config::SessionTiming;
use tomo_core::{
    CalendarEvent, ChatMessage, ColorTag, CompanionError, MemoryCategory, MemoryEntry,
    MemoryFilter, Mood, Persona, Reaction, ReportTrigger, Screen, Sender, UserSettings,
};
use uuid::Uuid;

/// Record produced by a completed action, applied atomically with the
/// companion's chat reply.
enum SettledRecord {
    Memory(MemoryEntry),
    Event {
        event: CalendarEvent,
        announcement: String,
    },
}

pub struct Session {
    state: Arc<RwLock<SessionState>>,
    reaction: Arc<dyn Reaction>,
    timing: SessionTiming,

    /// Broadcasts a snapshot after every mutation; renderers subscribe.
    snapshot_tx: watch::Sender<SessionState>,
    snapshot_rx: watch::Receiver<SessionState>,

    /// Bumped by `reset_all`. Completions and timers capture the value at
    /// their start and discard themselves if it moved.
    generation: Arc<AtomicU64>,

    /// Pending mood-reset timer. A newer action or a reset aborts it.
    mood_timer: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    pub fn new(reaction: Arc<dyn Reaction>, timing: SessionTiming) -> Self {
        let initial = SessionState::default();
        let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());
        Self {
            state: Arc::new(RwLock::new(initial)),
            reaction,
            timing,
            snapshot_tx,
            snapshot_rx,
            generation: Arc::new(AtomicU64::new(0)),
            mood_timer: Mutex::new(None),
        }
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.snapshot_rx.clone()
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    fn broadcast(&self, state: &SessionState) {
        let _ = self.snapshot_tx.send(state.clone());
    }

    // ========================================================================
    // Onboarding and settings intents
    // ========================================================================

    /// Complete onboarding. `wake_target` is "HH:MM" text from the form.
    pub async fn complete_onboarding(
        &self,
        name: &str,
        persona: Persona,
        wake_target: &str,
    ) -> Result<(), CompanionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CompanionError::validation("display name is empty"));
        }
        let target = NaiveTime::parse_from_str(wake_target, "%H:%M")
            .map_err(|_| CompanionError::validation("wake time must be HH:MM"))?;

        let mut state = self.state.write().await;
        state.settings = Some(UserSettings::new(name, persona, target));
        tracing::info!(user = name, persona = persona.label(), "onboarding completed");
        self.broadcast(&state);
        Ok(())
    }

    /// Update the free-text memo. Empty text clears it.
    pub async fn update_memo(&self, text: &str) -> Result<(), CompanionError> {
        let mut state = self.state.write().await;
        let settings = state.settings.as_mut().ok_or(CompanionError::Precondition)?;
        let trimmed = text.trim();
        settings.memo = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.broadcast(&state);
        Ok(())
    }

    // ========================================================================
    // View intents
    // ========================================================================

    pub async fn select_screen(&self, screen: Screen) {
        let mut state = self.state.write().await;
        state.screen = screen;
        self.broadcast(&state);
    }

    pub async fn select_filter(&self, filter: MemoryFilter) {
        let mut state = self.state.write().await;
        state.filter = filter;
        self.broadcast(&state);
    }

    // ========================================================================
    // Action handlers
    // ========================================================================

    /// Report getting up. Lateness is judged against the target wake time
    /// plus the grace window (half-open: exactly on the boundary is on time).
    pub async fn report_wake_up(&self) -> Result<(), CompanionError> {
        let (settings, msg_id, generation) =
            self.begin_exchange("Good morning! I'm up.".to_string()).await?;

        let grace = chrono::Duration::minutes(self.timing.wake_grace_minutes);
        let late = wake::is_late(Local::now().naive_local(), settings.wake_target, grace);
        let (trigger, context, note) = if late {
            (
                ReportTrigger::WakeLate,
                "You're a little past your target today.",
                "Overslept past the target",
            )
        } else {
            (
                ReportTrigger::WakeOnTime,
                "You were up right on schedule.",
                "Up on time",
            )
        };

        match self.reaction.react(&settings, trigger, context).await {
            Ok(reply) => {
                let mut entry = MemoryEntry::now(MemoryCategory::Morning, Some(note.to_string()));
                entry.reaction = Some(reply.clone());
                self.settle(generation, reply, SettledRecord::Memory(entry))
                    .await
            }
            Err(e) => {
                self.rollback_exchange(msg_id, generation).await;
                Err(e)
            }
        }
    }

    /// Report a finished chore, described in the user's own words.
    pub async fn report_chore(&self, description: &str) -> Result<(), CompanionError> {
        let description = description.trim().to_string();
        let user_text = if description.is_empty() {
            "I finished a chore!".to_string()
        } else {
            format!("I finished: {}", description)
        };
        let (settings, msg_id, generation) = self.begin_exchange(user_text).await?;

        let context = if description.is_empty() {
            "You took care of a chore.".to_string()
        } else {
            format!("You took care of \"{}\".", description)
        };

        match self
            .reaction
            .react(&settings, ReportTrigger::Chore, &context)
            .await
        {
            Ok(reply) => {
                let note = if description.is_empty() {
                    None
                } else {
                    Some(description)
                };
                let mut entry = MemoryEntry::now(MemoryCategory::Achievement, note);
                entry.reaction = Some(reply.clone());
                self.settle(generation, reply, SettledRecord::Memory(entry))
                    .await
            }
            Err(e) => {
                self.rollback_exchange(msg_id, generation).await;
                Err(e)
            }
        }
    }

    /// Report a meal photo. A pseudo-random palette color stands in for the
    /// uploaded image.
    pub async fn report_meal(&self) -> Result<(), CompanionError> {
        let (settings, msg_id, generation) = self
            .begin_exchange("Here's a photo of my meal!".to_string())
            .await?;

        let color_tag = {
            let mut rng = rand::thread_rng();
            ColorTag::PALETTE[rng.gen_range(0..ColorTag::PALETTE.len())]
        };

        match self
            .reaction
            .compliment(&settings, color_tag, MemoryCategory::Meal)
            .await
        {
            Ok(reply) => {
                let mut entry = MemoryEntry::now(MemoryCategory::Meal, None);
                entry.color_tag = Some(color_tag);
                entry.reaction = Some(reply.clone());
                self.settle(generation, reply, SettledRecord::Memory(entry))
                    .await
            }
            Err(e) => {
                self.rollback_exchange(msg_id, generation).await;
                Err(e)
            }
        }
    }

    /// Add a calendar event. The title must be non-empty; date and time
    /// arrive already structured and are rendered canonically for the
    /// reaction service.
    pub async fn add_event(
        &self,
        title: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Uuid, CompanionError> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(CompanionError::validation("event title is empty"));
        }

        let (settings, msg_id, generation) = self
            .begin_exchange(format!("Can you add \"{}\" to the calendar?", title))
            .await?;

        let mut event = CalendarEvent::new(title.clone(), date, time);
        let when_text = event.when_text();

        match self
            .reaction
            .schedule_advice(&settings, &title, &when_text)
            .await
        {
            Ok(reply) => {
                let event_id = event.id;
                event.advice = Some(reply.clone());
                let announcement = format!("Added \"{}\" — {}", title, when_text);
                self.settle(
                    generation,
                    reply,
                    SettledRecord::Event {
                        event,
                        announcement,
                    },
                )
                .await?;
                Ok(event_id)
            }
            Err(e) => {
                self.rollback_exchange(msg_id, generation).await;
                Err(e)
            }
        }
    }

    /// Remove a calendar event by id. Unknown ids are a quiet no-op.
    pub async fn remove_event(&self, id: Uuid) {
        let mut state = self.state.write().await;
        let before = state.events.len();
        state.events.retain(|e| e.id != id);
        if state.events.len() != before {
            self.broadcast(&state);
        } else {
            tracing::debug!(%id, "remove_event: no such event");
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Clear settings and all collections back to the initial state.
    /// In-flight completions and the pending mood timer are invalidated.
    pub async fn reset_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.mood_timer.lock().await.take() {
            handle.abort();
        }
        let mut state = self.state.write().await;
        *state = SessionState::default();
        tracing::info!("session reset to initial state");
        self.broadcast(&state);
    }

    // ========================================================================
    // Internals: the idle → awaiting-reaction → settled sequence
    // ========================================================================

    /// Guard preconditions, append the user message, raise the thinking
    /// flag, and capture the generation the exchange belongs to.
    async fn begin_exchange(
        &self,
        text: String,
    ) -> Result<(UserSettings, Uuid, u64), CompanionError> {
        let mut state = self.state.write().await;
        let settings = state
            .settings
            .clone()
            .ok_or(CompanionError::Precondition)?;
        let generation = self.generation.load(Ordering::SeqCst);

        let message = ChatMessage::now(Sender::User, text);
        let msg_id = message.id;
        state.chat.push(message);
        state.thinking = true;
        self.broadcast(&state);
        Ok((settings, msg_id, generation))
    }

    /// Apply a successful completion as one atomic state transition, then
    /// arm the mood-reset timer.
    async fn settle(
        &self,
        generation: u64,
        reply: String,
        record: SettledRecord,
    ) -> Result<(), CompanionError> {
        {
            let mut state = self.state.write().await;
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("discarding completion from before reset");
                return Ok(());
            }
            state.thinking = false;
            state.mood = Mood::Happy;
            state.chat.push(ChatMessage::now(Sender::Companion, reply));
            match record {
                SettledRecord::Memory(entry) => {
                    // Newest-first invariant: always insert at the front.
                    state.memories.insert(0, entry);
                }
                SettledRecord::Event {
                    event,
                    announcement,
                } => {
                    state.events.push(event);
                    state
                        .chat
                        .push(ChatMessage::now(Sender::Companion, announcement));
                }
            }
            self.broadcast(&state);
        }
        self.schedule_mood_reset(generation).await;
        Ok(())
    }

    /// Undo the user message from a failed exchange so no partial record
    /// survives a service failure.
    async fn rollback_exchange(&self, msg_id: Uuid, generation: u64) {
        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        state.chat.retain(|m| m.id != msg_id);
        state.thinking = false;
        self.broadcast(&state);
    }

    /// Arm the delayed mood reset, aborting any previous pending one so only
    /// the latest action's timer fires.
    async fn schedule_mood_reset(&self, generation: u64) {
        let mut guard = self.mood_timer.lock().await;
        if let Some(previous) = guard.take() {
            previous.abort();
        }

        let state = Arc::clone(&self.state);
        let tx = self.snapshot_tx.clone();
        let gen_counter = Arc::clone(&self.generation);
        let delay = self.timing.mood_reset();

        *guard = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = state.write().await;
            if gen_counter.load(Ordering::SeqCst) != generation {
                return;
            }
            if state.mood == Mood::Happy {
                state.mood = Mood::Neutral;
                let _ = tx.send(state.clone());
            }
        }));
    }
}
