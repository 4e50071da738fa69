use std::collections::HashMap;

use crate::directive::Directive;

/// Compiled snapshot of the user rules text.
///
/// Rebuilt from scratch whenever the text changes; answers "is this domain
/// currently filtered, and by which directive?" for the log view and the
/// check endpoint.
#[derive(Debug, Default)]
pub struct RuleSet {
    deny: HashMap<String, Directive>,
    allow: HashMap<String, Directive>,
    skipped_lines: usize,
}

impl RuleSet {
    pub fn compile(rules: &str) -> Self {
        let mut ruleset = RuleSet::default();

        for line in rules.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('!') || line.starts_with('#') {
                continue;
            }

            match Directive::parse(line) {
                Ok(directive) => {
                    let entries = if directive.allow {
                        &mut ruleset.allow
                    } else {
                        &mut ruleset.deny
                    };
                    entries.insert(directive.domain.clone(), directive);
                }
                Err(_) => ruleset.skipped_lines += 1,
            }
        }

        ruleset
    }

    /// Number of directives this console understands
    pub fn rule_count(&self) -> usize {
        self.deny.len() + self.allow.len()
    }

    /// Lines that were neither blank, comments, nor anchored directives
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Finds the directive governing a domain. `||<domain>^` also covers
    /// every subdomain, and an allow override always wins over a block.
    pub fn match_domain(&self, qname: &str) -> Option<&Directive> {
        let qname = qname.trim_end_matches('.').to_ascii_lowercase();

        if let Some(directive) = domain_suffixes(&qname).find_map(|part| self.allow.get(part)) {
            return Some(directive);
        }

        let result = domain_suffixes(&qname).find_map(|part| self.deny.get(part));
        result
    }

    pub fn is_filtered(&self, qname: &str) -> bool {
        self.match_domain(qname).is_some_and(|directive| !directive.allow)
    }
}

/// The qname itself followed by each parent domain: `a.b.c` -> `b.c` -> `c`
fn domain_suffixes(qname: &str) -> impl Iterator<Item = &str> {
    std::iter::once(qname).chain(
        qname
            .char_indices()
            .filter(|(_, c)| *c == '.')
            .map(move |(idx, _)| &qname[idx + 1..])
            .filter(|part| !part.is_empty()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = "\
! manual overrides
||ads.example.com^$important
@@||cdn.example.com^$important
# host entries are managed elsewhere
0.0.0.0 nothing.example.com
||tracker.test^$important
";

    #[test]
    fn compiles_directives_and_counts_the_rest() {
        let ruleset = RuleSet::compile(RULES);
        assert_eq!(ruleset.rule_count(), 3);
        assert_eq!(ruleset.skipped_lines(), 1);
    }

    #[test]
    fn empty_text_compiles_to_an_empty_set() {
        let ruleset = RuleSet::compile("");
        assert_eq!(ruleset.rule_count(), 0);
        assert!(!ruleset.is_filtered("anything.test"));
    }

    #[test]
    fn blocks_the_domain_and_its_subdomains() {
        let ruleset = RuleSet::compile(RULES);
        assert!(ruleset.is_filtered("ads.example.com"));
        assert!(ruleset.is_filtered("static.ads.example.com"));
        assert!(!ruleset.is_filtered("example.com"));
    }

    #[test]
    fn allow_override_wins() {
        let rules = "||example.com^$important\n@@||cdn.example.com^$important\n";
        let ruleset = RuleSet::compile(rules);

        assert!(ruleset.is_filtered("example.com"));
        assert!(ruleset.is_filtered("ads.example.com"));
        // The override shields the subdomain even though its parent is blocked
        assert!(!ruleset.is_filtered("cdn.example.com"));
        assert!(!ruleset.is_filtered("img.cdn.example.com"));

        let matched = ruleset.match_domain("img.cdn.example.com").expect("should have matched");
        assert_eq!(matched.to_string(), "@@||cdn.example.com^$important");
    }

    #[test]
    fn matching_ignores_case_and_a_trailing_dot() {
        let ruleset = RuleSet::compile(RULES);
        assert!(ruleset.is_filtered("Tracker.TEST."));
    }

    #[test]
    fn unrelated_domains_do_not_match() {
        let ruleset = RuleSet::compile(RULES);
        assert!(!ruleset.is_filtered("notads.example.com"));
        assert!(!ruleset.is_filtered("test"));
    }
}
