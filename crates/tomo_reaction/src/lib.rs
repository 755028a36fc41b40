pub mod mock;
pub mod retry;

pub use mock::MockReactionService;
pub use retry::{with_retry, RetryConfig, RetryingReaction};
