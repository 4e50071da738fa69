mod app;
pub use app::App;
mod cli;
pub use cli::Args;
mod filtering;
mod janitor;
mod logging;
pub use logging::setup_logging;
