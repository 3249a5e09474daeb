//! Effect building blocks that need more than a single write.

pub mod leader;
pub mod level_up;
pub mod weather;

pub use leader::Leader;
pub use level_up::LevelUpDriver;
pub use weather::Weather;
