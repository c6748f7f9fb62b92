pub mod errors;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::run_with_config;
pub use state::AppState;
