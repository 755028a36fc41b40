//! End-to-end session flows against the mock reaction service.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use tomo_core::config::SessionTiming;
use tomo_core::{
    ColorTag, CompanionError, MemoryCategory, MemoryFilter, Mood, Persona, Reaction,
    ReportTrigger, Screen, Sender, UserSettings,
};
use tomo_reaction::MockReactionService;
use tomo_session::Session;

fn session() -> Session {
    Session::new(
        Arc::new(MockReactionService::instant()),
        SessionTiming::default(),
    )
}

async fn onboarded_session() -> Session {
    let s = session();
    s.complete_onboarding("Yuki", Persona::Mom, "07:00")
        .await
        .unwrap();
    s
}

#[tokio::test]
async fn test_actions_require_onboarding() {
    let s = session();

    assert_eq!(s.report_wake_up().await, Err(CompanionError::Precondition));
    assert_eq!(
        s.report_chore("dishes").await,
        Err(CompanionError::Precondition)
    );
    assert_eq!(s.report_meal().await, Err(CompanionError::Precondition));
    assert_eq!(
        s.update_memo("note").await,
        Err(CompanionError::Precondition)
    );

    // Nothing leaked into the state.
    let snap = s.snapshot().await;
    assert!(snap.chat.is_empty());
    assert!(snap.memories.is_empty());
    assert!(!snap.thinking);
}

#[tokio::test]
async fn test_onboarding_validation() {
    let s = session();

    let err = s.complete_onboarding("   ", Persona::Dad, "07:00").await;
    assert!(matches!(err, Err(CompanionError::Validation(_))));

    let err = s.complete_onboarding("Yuki", Persona::Dad, "7 o'clock").await;
    assert!(matches!(err, Err(CompanionError::Validation(_))));

    assert!(!s.snapshot().await.is_onboarded());

    s.complete_onboarding("Yuki", Persona::Dad, "07:00")
        .await
        .unwrap();
    let snap = s.snapshot().await;
    let settings = snap.settings.unwrap();
    assert_eq!(settings.user_name, "Yuki");
    assert_eq!(settings.persona, Persona::Dad);
    assert_eq!(
        settings.wake_target,
        NaiveTime::from_hms_opt(7, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_wake_up_report_appends_exchange_and_memory() {
    let s = onboarded_session().await;

    s.report_wake_up().await.unwrap();

    let snap = s.snapshot().await;
    assert_eq!(snap.chat.len(), 2, "user message then companion reply");
    assert_eq!(snap.chat[0].sender, Sender::User);
    assert_eq!(snap.chat[1].sender, Sender::Companion);
    assert!(snap.chat[1].text.contains("Yuki"));

    assert_eq!(snap.memories.len(), 1);
    assert_eq!(snap.memories[0].category, MemoryCategory::Morning);
    assert!(snap.memories[0].reaction.is_some());
    assert!(snap.memories[0].note.is_some());

    assert!(!snap.thinking);
    assert_eq!(snap.mood, Mood::Happy);
}

#[tokio::test]
async fn test_chore_report_records_achievement() {
    let s = onboarded_session().await;

    s.report_chore("cleaned my desk").await.unwrap();

    let snap = s.snapshot().await;
    assert_eq!(snap.chat.len(), 2);
    assert!(snap.chat[0].text.contains("cleaned my desk"));
    assert_eq!(snap.memories[0].category, MemoryCategory::Achievement);
    assert_eq!(snap.memories[0].note.as_deref(), Some("cleaned my desk"));
}

#[tokio::test]
async fn test_meal_report_picks_palette_color() {
    let s = onboarded_session().await;

    s.report_meal().await.unwrap();

    let snap = s.snapshot().await;
    assert_eq!(snap.memories[0].category, MemoryCategory::Meal);
    let tag = snap.memories[0].color_tag.expect("meal entries carry a color tag");
    assert!(ColorTag::PALETTE.contains(&tag));
    assert!(snap.memories[0].note.is_none());
}

#[tokio::test]
async fn test_memories_accumulate_newest_first() {
    let s = onboarded_session().await;

    s.report_wake_up().await.unwrap();
    s.report_chore("laundry").await.unwrap();
    s.report_meal().await.unwrap();

    let snap = s.snapshot().await;
    assert_eq!(snap.memories.len(), 3);
    assert_eq!(snap.memories[0].category, MemoryCategory::Meal);
    assert_eq!(snap.memories[1].category, MemoryCategory::Achievement);
    assert_eq!(snap.memories[2].category, MemoryCategory::Morning);
    for pair in snap.memories.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }
}

#[tokio::test]
async fn test_add_event_rejects_empty_title() {
    let s = onboarded_session().await;

    let err = s
        .add_event(
            "   ",
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        )
        .await;
    assert!(matches!(err, Err(CompanionError::Validation(_))));

    let snap = s.snapshot().await;
    assert!(snap.events.is_empty(), "no event added");
    assert!(snap.chat.is_empty(), "no chat message added");
}

#[tokio::test]
async fn test_add_event_appends_event_advice_and_announcement() {
    let s = onboarded_session().await;

    let id = s
        .add_event(
            "Dentist",
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        )
        .await
        .unwrap();

    let snap = s.snapshot().await;
    assert_eq!(snap.events.len(), 1);
    assert_eq!(snap.events[0].id, id);
    assert_eq!(snap.events[0].title, "Dentist");
    assert!(snap.events[0].advice.as_deref().unwrap().contains("Dentist"));
    assert!(!snap.events[0].prepared);

    // User request, companion advice, then the announcement.
    assert_eq!(snap.chat.len(), 3);
    assert_eq!(snap.chat[2].sender, Sender::Companion);
    assert!(snap.chat[2].text.contains("2025-03-01 10:30"));
}

#[tokio::test]
async fn test_remove_event_leaves_others_untouched() {
    let s = onboarded_session().await;
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let time = NaiveTime::from_hms_opt(10, 30, 0).unwrap();

    let keep = s.add_event("Keep me", date, time).await.unwrap();
    let drop = s.add_event("Drop me", date, time).await.unwrap();

    s.remove_event(drop).await;

    let snap = s.snapshot().await;
    assert_eq!(snap.events.len(), 1);
    assert_eq!(snap.events[0].id, keep);

    // Removing an unknown id is a quiet no-op.
    s.remove_event(drop).await;
    assert_eq!(s.snapshot().await.events.len(), 1);
}

#[tokio::test]
async fn test_filter_and_screen_selection() {
    let s = onboarded_session().await;
    s.report_meal().await.unwrap();
    s.report_chore("homework").await.unwrap();

    s.select_filter(MemoryFilter::Meal).await;
    let snap = s.snapshot().await;
    assert_eq!(snap.filter, MemoryFilter::Meal);
    let filtered = snap.filtered_memories();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].category, MemoryCategory::Meal);

    s.select_screen(Screen::Memories).await;
    assert_eq!(s.snapshot().await.screen, Screen::Memories);
}

#[tokio::test]
async fn test_update_memo_and_clear() {
    let s = onboarded_session().await;

    s.update_memo("  drink more water  ").await.unwrap();
    let snap = s.snapshot().await;
    assert_eq!(
        snap.settings.as_ref().unwrap().memo.as_deref(),
        Some("drink more water")
    );

    s.update_memo("").await.unwrap();
    assert!(s.snapshot().await.settings.unwrap().memo.is_none());
}

#[tokio::test]
async fn test_reset_all_returns_to_initial_state() {
    let s = onboarded_session().await;
    s.report_wake_up().await.unwrap();
    s.add_event(
        "Dentist",
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
    )
    .await
    .unwrap();
    s.select_filter(MemoryFilter::Morning).await;
    s.select_screen(Screen::Calendar).await;

    s.reset_all().await;

    let snap = s.snapshot().await;
    assert!(!snap.is_onboarded(), "subsequent render shows onboarding");
    assert!(snap.chat.is_empty());
    assert!(snap.events.is_empty());
    assert!(snap.memories.is_empty());
    assert_eq!(snap.mood, Mood::Neutral);
    assert_eq!(snap.filter, MemoryFilter::All);
    assert_eq!(snap.screen, Screen::Home);
}

#[tokio::test]
async fn test_mood_reverts_after_configured_delay() {
    let s = Session::new(
        Arc::new(MockReactionService::instant()),
        SessionTiming {
            mood_reset_secs: 0,
            wake_grace_minutes: 30,
        },
    );
    s.complete_onboarding("Yuki", Persona::Idol, "07:00")
        .await
        .unwrap();

    s.report_chore("watered the plants").await.unwrap();

    // Zero-delay timer: the reset lands almost immediately.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(s.snapshot().await.mood, Mood::Neutral);
}

#[tokio::test]
async fn test_snapshot_subscription_sees_mutations() {
    let s = onboarded_session().await;
    let mut rx = s.subscribe();

    s.report_chore("recycling").await.unwrap();

    rx.changed().await.unwrap();
    let snap = rx.borrow().clone();
    assert!(!snap.chat.is_empty());
}

// ============================================================================
// Failure and reset-race behavior, via stub Reaction backends
// ============================================================================

/// Backend that always fails.
struct DownReaction;

#[async_trait]
impl Reaction for DownReaction {
    async fn react(
        &self,
        _settings: &UserSettings,
        _trigger: ReportTrigger,
        _context: &str,
    ) -> Result<String, CompanionError> {
        Err(CompanionError::service("backend unavailable"))
    }

    async fn compliment(
        &self,
        _settings: &UserSettings,
        _color_tag: ColorTag,
        _category: MemoryCategory,
    ) -> Result<String, CompanionError> {
        Err(CompanionError::service("backend unavailable"))
    }

    async fn schedule_advice(
        &self,
        _settings: &UserSettings,
        _title: &str,
        _when_text: &str,
    ) -> Result<String, CompanionError> {
        Err(CompanionError::service("backend unavailable"))
    }
}

/// Backend that answers after a real delay, for reset races.
struct SlowReaction(Duration);

#[async_trait]
impl Reaction for SlowReaction {
    async fn react(
        &self,
        settings: &UserSettings,
        _trigger: ReportTrigger,
        _context: &str,
    ) -> Result<String, CompanionError> {
        tokio::time::sleep(self.0).await;
        Ok(format!("Well done, {}!", settings.user_name))
    }

    async fn compliment(
        &self,
        settings: &UserSettings,
        _color_tag: ColorTag,
        _category: MemoryCategory,
    ) -> Result<String, CompanionError> {
        tokio::time::sleep(self.0).await;
        Ok(format!("Lovely, {}!", settings.user_name))
    }

    async fn schedule_advice(
        &self,
        _settings: &UserSettings,
        title: &str,
        when_text: &str,
    ) -> Result<String, CompanionError> {
        tokio::time::sleep(self.0).await;
        Ok(format!("Noted: {} at {}", title, when_text))
    }
}

#[tokio::test]
async fn test_service_failure_leaves_state_unmutated() {
    let s = Session::new(Arc::new(DownReaction), SessionTiming::default());
    s.complete_onboarding("Yuki", Persona::Butler, "07:00")
        .await
        .unwrap();

    let err = s.report_chore("vacuumed").await;
    assert!(matches!(err, Err(CompanionError::Service(_))));

    let snap = s.snapshot().await;
    assert!(snap.chat.is_empty(), "user message rolled back");
    assert!(snap.memories.is_empty(), "no partial record");
    assert!(!snap.thinking);
    assert_eq!(snap.mood, Mood::Neutral);
}

#[tokio::test]
async fn test_completion_from_before_reset_is_discarded() {
    let s = Arc::new(Session::new(
        Arc::new(SlowReaction(Duration::from_millis(200))),
        SessionTiming::default(),
    ));
    s.complete_onboarding("Yuki", Persona::Mom, "07:00")
        .await
        .unwrap();

    let worker = {
        let s = Arc::clone(&s);
        tokio::spawn(async move { s.report_chore("slow chore").await })
    };

    // Let the handler reach its suspension point, then reset underneath it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    s.reset_all().await;

    worker.await.unwrap().unwrap();

    let snap = s.snapshot().await;
    assert!(!snap.is_onboarded());
    assert!(snap.chat.is_empty(), "stale completion must not re-add chat");
    assert!(snap.memories.is_empty());
    assert_eq!(snap.mood, Mood::Neutral);
}

#[tokio::test]
async fn test_overlapping_actions_each_settle() {
    let s = Arc::new(Session::new(
        Arc::new(SlowReaction(Duration::from_millis(50))),
        SessionTiming::default(),
    ));
    s.complete_onboarding("Yuki", Persona::Dad, "07:00")
        .await
        .unwrap();

    let a = {
        let s = Arc::clone(&s);
        tokio::spawn(async move { s.report_chore("chore one").await })
    };
    let b = {
        let s = Arc::clone(&s);
        tokio::spawn(async move { s.report_meal().await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let snap = s.snapshot().await;
    // Two exchanges of two messages each, interleaving order unspecified.
    assert_eq!(snap.chat.len(), 4);
    assert_eq!(snap.memories.len(), 2);
    assert!(!snap.thinking);
    assert_eq!(snap.mood, Mood::Happy);
}
