pub mod board;
pub mod events;
pub mod sub_issues;
pub mod prefs;

pub use board::*;
pub use events::*;
pub use sub_issues::*;
pub use prefs::*;
