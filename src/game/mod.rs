pub mod timers;
pub mod view;

pub use view::{GameView, Phase};
