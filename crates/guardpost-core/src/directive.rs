use std::fmt;

use thiserror::Error;

/// `||<domain>^` anchor prefix
const ANCHOR_PREFIX: &str = "||";
/// `@@` marker that turns a blocking directive into an allowing one
const EXCEPTION_PREFIX: &str = "@@";
/// Modifier carried by every directive this console emits
const IMPORTANT_MODIFIER: &str = "$important";

/// Canonical blocking directive for a domain: `||<domain>^$important`
pub fn block_rule(domain: &str) -> String {
    format!("{ANCHOR_PREFIX}{domain}^{IMPORTANT_MODIFIER}")
}

/// Canonical allowing directive for a domain: `@@||<domain>^$important`
pub fn allow_rule(domain: &str) -> String {
    format!("{EXCEPTION_PREFIX}{}", block_rule(domain))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectiveParseError {
    #[error("line is not anchored with '||<domain>^': {0:?}")]
    NotAnchored(String),
    #[error("directive has an empty domain")]
    EmptyDomain,
}

/// A single parsed line of the user rules text.
///
/// Only the anchored form used by this console is recognized. Lines in any
/// other syntax still belong to the rule text (the filtering engine may
/// understand more than we do) and are reported as unparsable instead of
/// being dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub domain: String,
    pub allow: bool,
    pub important: bool,
}

impl Directive {
    pub fn parse(line: &str) -> Result<Self, DirectiveParseError> {
        let (allow, rest) = match line.strip_prefix(EXCEPTION_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        let rest = rest
            .strip_prefix(ANCHOR_PREFIX)
            .ok_or_else(|| DirectiveParseError::NotAnchored(line.to_string()))?;

        let (domain, important) = match rest.strip_suffix(IMPORTANT_MODIFIER) {
            Some(rest) => (rest.strip_suffix('^'), true),
            None => (rest.strip_suffix('^'), false),
        };
        let domain = domain.ok_or_else(|| DirectiveParseError::NotAnchored(line.to_string()))?;

        if domain.is_empty() {
            return Err(DirectiveParseError::EmptyDomain);
        }

        Ok(Directive {
            domain: domain.to_ascii_lowercase(),
            allow,
            important,
        })
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.allow {
            f.write_str(EXCEPTION_PREFIX)?;
        }
        write!(f, "{}{}^", ANCHOR_PREFIX, self.domain)?;
        if self.important {
            f.write_str(IMPORTANT_MODIFIER)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_canonical_rules() {
        assert_eq!(block_rule("ads.example.com"), "||ads.example.com^$important");
        assert_eq!(allow_rule("ads.example.com"), "@@||ads.example.com^$important");
    }

    #[test]
    fn parses_both_directions() {
        let blocking = Directive::parse("||tracker.test^$important").expect("should have parsed");
        assert!(!blocking.allow);
        assert!(blocking.important);
        assert_eq!(blocking.domain, "tracker.test");

        let allowing = Directive::parse("@@||tracker.test^$important").expect("should have parsed");
        assert!(allowing.allow);
        assert_eq!(allowing.domain, "tracker.test");
    }

    #[test]
    fn parse_display_roundtrip() {
        for raw in ["||a.b^", "@@||a.b^", "||a.b^$important", "@@||a.b^$important"] {
            let directive = Directive::parse(raw).expect("should have parsed");
            assert_eq!(directive.to_string(), raw);
        }
    }

    #[test]
    fn lowercases_the_domain() {
        let directive = Directive::parse("||Ads.Example.COM^$important").expect("should have parsed");
        assert_eq!(directive.domain, "ads.example.com");
    }

    #[test]
    fn rejects_foreign_syntax() {
        assert!(matches!(
            Directive::parse("/tracker[0-9]+/"),
            Err(DirectiveParseError::NotAnchored(_))
        ));
        assert!(matches!(
            Directive::parse("||unterminated.test"),
            Err(DirectiveParseError::NotAnchored(_))
        ));
        assert_eq!(Directive::parse("||^$important"), Err(DirectiveParseError::EmptyDomain));
    }
}
