pub mod actions;
pub mod matching;
pub mod persistence;
pub mod policy_engine;
pub mod reducer;
pub mod settings;
pub mod slot_resolver;

pub use actions::*;
pub use policy_engine::*;
pub use reducer::*;
pub use settings::*;
pub use slot_resolver::*;

pub use persistence::*;
