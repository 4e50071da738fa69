use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::directive::{allow_rule, block_rule};

/// What the user asked for from the query log view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Block,
    Unblock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Added,
    Removed,
}

/// Toast descriptor produced by a toggle. The caller decides how to surface
/// it; `Display` renders the message text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub rule: String,
}

impl Notification {
    fn added(rule: String) -> Self {
        Notification {
            kind: NotificationKind::Added,
            rule,
        }
    }

    fn removed(rule: String) -> Self {
        Notification {
            kind: NotificationKind::Removed,
            rule,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NotificationKind::Added => write!(f, "rule added to custom filtering: {}", self.rule),
            NotificationKind::Removed => write!(f, "rule removed from custom filtering: {}", self.rule),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub rules: String,
    pub notification: Notification,
}

/// Blocks or unblocks a domain by mutating the user rules text.
///
/// The domain is assumed to be blocked by default (a subscribed list already
/// matches it), so "block" merely cancels a manual allow override when one
/// exists, while "unblock" appends an explicit `@@||<domain>^$important`
/// override. Whichever branch is taken, the caller must still trigger a
/// filtering refresh afterwards.
pub fn toggle_rule(rules: &str, action: ToggleAction, domain: &str) -> ToggleOutcome {
    let base_rule = block_rule(domain);
    let base_unblocking = allow_rule(domain);

    let (rule_to_remove, rule_to_add) = match action {
        ToggleAction::Block => (base_unblocking, base_rule),
        ToggleAction::Unblock => (base_rule, base_unblocking),
    };

    if contains_line(rules, &rule_to_remove) {
        // Strip the first literal occurrence. The line's own newline is left
        // in place, so removing the last directive leaves a blank line.
        let rules = rules.replacen(&rule_to_remove, "", 1);
        return ToggleOutcome {
            rules,
            notification: Notification::removed(rule_to_remove),
        };
    }

    if !contains_line(rules, &rule_to_add) {
        let separator = if !rules.is_empty() && !rules.ends_with('\n') { "\n" } else { "" };
        let rules = format!("{rules}{separator}{rule_to_add}\n");
        return ToggleOutcome {
            rules,
            notification: Notification::added(rule_to_add),
        };
    }

    // Nothing to do: the desired directive is already in place. Keep the
    // text as is but still report the rule so the UI can show a toast.
    ToggleOutcome {
        rules: rules.to_string(),
        notification: Notification::added(rule_to_add),
    }
}

/// Whole-line containment check: the directive counts as present only when
/// it is preceded by start-of-text or a newline and followed by end-of-text
/// or a newline, with every metacharacter in it matched literally.
fn contains_line(rules: &str, directive: &str) -> bool {
    let pattern = format!("(?:^|\n){}(?:\n|$)", regex::escape(directive));
    // An escaped pattern is always a valid regex
    Regex::new(&pattern).map(|re| re.is_match(rules)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn directive_lines_for(rules: &str, domain: &str) -> usize {
        let blocking = block_rule(domain);
        let unblocking = allow_rule(domain);
        rules
            .split('\n')
            .filter(|line| *line == blocking || *line == unblocking)
            .count()
    }

    #[test]
    fn unblock_of_empty_rules_appends_an_override() {
        let outcome = toggle_rule("", ToggleAction::Unblock, "tracker.test");
        assert_eq!(outcome.rules, "@@||tracker.test^$important\n");
        assert_eq!(outcome.notification.kind, NotificationKind::Added);
        assert_eq!(outcome.notification.rule, "@@||tracker.test^$important");
    }

    #[test]
    fn block_cancels_an_existing_override() {
        let outcome = toggle_rule("@@||tracker.test^$important\n", ToggleAction::Block, "tracker.test");
        assert_eq!(outcome.rules, "\n");
        assert_eq!(outcome.notification.kind, NotificationKind::Removed);
        assert_eq!(outcome.notification.rule, "@@||tracker.test^$important");
    }

    #[test]
    fn missing_trailing_newline_is_inserted_before_appending() {
        let outcome = toggle_rule("||old.example^$important", ToggleAction::Unblock, "new.example");
        assert_eq!(
            outcome.rules,
            "||old.example^$important\n@@||new.example^$important\n"
        );
    }

    #[test]
    fn existing_override_makes_unblock_a_text_noop() {
        let rules = "! manual overrides\n@@||tracker.test^$important\n";
        let outcome = toggle_rule(rules, ToggleAction::Unblock, "tracker.test");
        assert_eq!(outcome.rules, rules);
        assert_eq!(outcome.notification.kind, NotificationKind::Added);
    }

    #[test]
    fn regex_metacharacters_in_the_domain_are_literal() {
        let rules = "@@||ad.ex-ample.co^$important\n";
        let outcome = toggle_rule(rules, ToggleAction::Block, "ad.ex-ample.co");
        assert_eq!(outcome.rules, "\n");
        assert_eq!(outcome.notification.kind, NotificationKind::Removed);

        // The dot in 'ad.ex-ample.co' must not match the 'x' in this line
        let rules = "@@||adxex-ample.co^$important\n";
        let outcome = toggle_rule(rules, ToggleAction::Block, "ad.ex-ample.co");
        assert_eq!(outcome.notification.kind, NotificationKind::Added);
        assert_eq!(
            outcome.rules,
            "@@||adxex-ample.co^$important\n||ad.ex-ample.co^$important\n"
        );
    }

    #[test]
    fn longer_domains_are_not_matched_as_substrings() {
        let rules = "||sub.example.com^$important\n";

        // No whole-line match for the shorter domain in either direction
        let outcome = toggle_rule(rules, ToggleAction::Unblock, "example.com");
        assert_eq!(outcome.rules, "||sub.example.com^$important\n@@||example.com^$important\n");

        let outcome = toggle_rule(rules, ToggleAction::Block, "example.com");
        assert_eq!(outcome.rules, "||sub.example.com^$important\n||example.com^$important\n");
    }

    #[test]
    fn block_on_empty_rules_appends_a_blocking_rule() {
        let outcome = toggle_rule("", ToggleAction::Block, "ads.test");
        assert_eq!(outcome.rules, "||ads.test^$important\n");
        assert_eq!(outcome.notification.kind, NotificationKind::Added);
    }

    #[test]
    fn toggling_back_and_forth_never_duplicates_a_directive() {
        let domain = "tracker.test";
        let mut rules = String::new();
        for action in [
            ToggleAction::Block,
            ToggleAction::Unblock,
            ToggleAction::Unblock,
            ToggleAction::Block,
            ToggleAction::Block,
        ] {
            rules = toggle_rule(&rules, action, domain).rules;
            assert!(directive_lines_for(&rules, domain) <= 1, "rules: {:?}", rules);
        }
    }

    #[test]
    fn other_lines_survive_a_toggle() {
        let rules = "! comment\n||ads.test^$important\n\n@@||cdn.test^$important\n";
        let outcome = toggle_rule(rules, ToggleAction::Block, "cdn.test");
        assert_eq!(outcome.rules, "! comment\n||ads.test^$important\n\n\n");
    }

    #[test]
    fn notification_renders_the_toast_text() {
        let outcome = toggle_rule("", ToggleAction::Unblock, "tracker.test");
        assert_eq!(
            outcome.notification.to_string(),
            "rule added to custom filtering: @@||tracker.test^$important"
        );

        let outcome = toggle_rule("||ads.test^$important\n", ToggleAction::Unblock, "ads.test");
        assert_eq!(
            outcome.notification.to_string(),
            "rule removed from custom filtering: ||ads.test^$important"
        );
    }

    fn arb_domain() -> impl Strategy<Value = String> {
        proptest::string::string_regex(r"[a-z0-9]{1,8}(\.[a-z0-9-]{1,8}){1,3}").expect("valid strategy")
    }

    proptest! {
        #[test]
        fn at_most_one_directive_per_domain(domain in arb_domain(), actions in proptest::collection::vec(any::<bool>(), 1..8)) {
            let mut rules = String::new();
            for block in actions {
                let action = if block { ToggleAction::Block } else { ToggleAction::Unblock };
                rules = toggle_rule(&rules, action, &domain).rules;
                prop_assert!(directive_lines_for(&rules, &domain) <= 1, "rules: {:?}", rules);
            }
        }

        #[test]
        fn repeating_an_action_is_idempotent(domain in arb_domain(), block in any::<bool>()) {
            let action = if block { ToggleAction::Block } else { ToggleAction::Unblock };
            let once = toggle_rule("", action, &domain).rules;
            let twice = toggle_rule(&once, action, &domain).rules;
            prop_assert_eq!(once, twice);
        }
    }
}
