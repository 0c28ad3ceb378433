mod bootstrap;
mod database;
mod state_builder;

pub use bootstrap::bootstrap_super_admins;
pub use database::connect_and_migrate;
pub use state_builder::{build_app_state, build_memory_app_state};
