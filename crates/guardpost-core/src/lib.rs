mod directive;
pub use directive::{allow_rule, block_rule, Directive, DirectiveParseError};
mod ruleset;
pub use ruleset::RuleSet;
mod toggle;
pub use toggle::{toggle_rule, Notification, NotificationKind, ToggleAction, ToggleOutcome};
