mod util;

pub use util::rules_checksum;

/// Commands the control surface sends to the long-lived console tasks.
#[derive(Debug, Clone, Copy)]
pub enum ConsoleCommand {
    /// Recompile the filtering state from the persisted user rules
    RefreshFiltering,
}
