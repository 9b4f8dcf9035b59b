use std::collections::BTreeSet;
use std::fmt;

/// Domain part of an email address: everything after the last `@`.
///
/// No validation of the result; `"user@"` yields `Some("")`.
pub fn domain_of(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

/// Normalized (trimmed, lower-cased) allowlist. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedDomainSet {
    domains: BTreeSet<String>,
}

impl AllowedDomainSet {
    /// Parse a comma-separated list such as `"example.com, corp.example.org"`.
    ///
    /// Returns `None` when no non-blank entry remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let domains = raw
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>();

        if domains.is_empty() {
            None
        } else {
            Some(Self { domains })
        }
    }

    /// Exact, case-insensitive membership. `sub.example.com` does not match `example.com`.
    pub fn is_allowed(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }
}

impl fmt::Display for AllowedDomainSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(", ");
        write!(f, "[{}]", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_of_takes_suffix_after_last_at() {
        assert_eq!(domain_of("test@example.com"), Some("example.com"));
        assert_eq!(domain_of("a@b@example.com"), Some("example.com"));
        assert_eq!(domain_of("user@"), Some(""));
    }

    #[test]
    fn domain_of_without_at_is_none() {
        assert_eq!(domain_of("noat"), None);
        assert_eq!(domain_of(""), None);
    }

    #[test]
    fn parse_trims_lowercases_and_drops_blanks() {
        let set = AllowedDomainSet::parse(" Example.com, ,corp.example.org,,EXAMPLE.COM ").unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["corp.example.org", "example.com"]
        );
    }

    #[test]
    fn parse_rejects_empty_lists() {
        assert_eq!(AllowedDomainSet::parse(""), None);
        assert_eq!(AllowedDomainSet::parse("   "), None);
        assert_eq!(AllowedDomainSet::parse(" , ,"), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let set = AllowedDomainSet::parse("example.com").unwrap();
        assert!(set.is_allowed("example.com"));
        assert!(set.is_allowed("Example.COM"));
    }

    #[test]
    fn matching_is_exact() {
        let set = AllowedDomainSet::parse("example.com").unwrap();
        assert!(!set.is_allowed("sub.example.com"));
        assert!(!set.is_allowed("example.co"));
        assert!(!set.is_allowed(""));
    }

    #[test]
    fn display_lists_domains() {
        let set = AllowedDomainSet::parse("b.org,a.com").unwrap();
        assert_eq!(set.to_string(), "[a.com, b.org]");
    }
}
