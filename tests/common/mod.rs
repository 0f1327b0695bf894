pub mod hook_fixtures;

pub use hook_fixtures::*;
