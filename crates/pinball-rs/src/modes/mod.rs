// crates/pinball-rs/src/modes/mod.rs
//
// Built-in modes. These are library code, not application policy: a game
// registers the ones it wants and supplies its own machine-specific device
// names.

pub mod attract;
pub mod ball_search;
pub mod bonus;
pub mod drop_targets;
pub mod high_score;
pub mod service;
pub mod tilt;
pub mod trough;

pub use attract::{AttractMode, GameOverMode};
pub use ball_search::BallSearchMode;
pub use bonus::BonusMode;
pub use drop_targets::DropTargetBankMode;
pub use high_score::HighScoreMode;
pub use service::ServiceMode;
pub use tilt::TiltMode;
pub use trough::TroughMode;
