pub mod session;
pub mod state;
pub mod wake;

pub use session::Session;
pub use state::SessionState;
