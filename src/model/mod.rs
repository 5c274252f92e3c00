pub mod item;
pub mod state;
pub mod group;
pub mod patch;
pub mod config;

pub use item::*;
pub use state::*;
pub use group::*;
pub use patch::*;
pub use config::*;
