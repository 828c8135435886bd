pub mod game;
pub mod messages;
pub mod stats;

// Re-export important types
pub use game::*;
pub use messages::*;
pub use stats::*;
