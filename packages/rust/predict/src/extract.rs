//! Candidate-domain extraction from free profile text.
//!
//! Creator descriptions frequently link their own website alongside social
//! profiles; this module pulls out plausible business domains and drops the
//! platforms themselves.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Platforms and link shorteners that are never a creator's own site.
const SKIP_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "twitter.com",
    "x.com",
    "instagram.com",
    "facebook.com",
    "tiktok.com",
    "linkedin.com",
    "discord.gg",
    "twitch.tv",
    "patreon.com",
    "ko-fi.com",
    "linktr.ee",
    "bit.ly",
    "gmail.com",
];

fn domain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:https?://)?(?:www\.)?((?:[a-z0-9][a-z0-9-]*\.)+[a-z]{2,})\b")
            .expect("domain pattern compiles")
    })
}

/// Extract plausible website domains from free text, insertion-ordered and
/// deduplicated. Social platforms and shorteners are skipped.
pub fn extract_domains(text: &str) -> Vec<String> {
    let mut domains = Vec::new();

    for capture in domain_pattern().captures_iter(text) {
        let raw = &capture[1];
        if let Some(domain) = normalize_domain(raw) {
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }
    }

    domains
}

/// Normalize a matched token to a bare domain, or reject it.
fn normalize_domain(raw: &str) -> Option<String> {
    // Route through Url so ports, paths and userinfo are shed uniformly.
    let parsed = Url::parse(&format!("https://{}", raw.to_lowercase())).ok()?;
    let mut host = parsed.host_str()?.to_string();

    if let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }

    if host.len() < 4 || SKIP_DOMAINS.contains(&host.as_str()) {
        return None;
    }

    // Require a plausible TLD of at least two characters.
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() < 2 || parts.last().is_some_and(|tld| tld.len() < 2) {
        return None;
    }

    Some(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_domains() {
        let text = "Check out my site at fireship.io for courses";
        assert_eq!(extract_domains(text), vec!["fireship.io".to_string()]);
    }

    #[test]
    fn extracts_full_urls() {
        let text = "Links: https://www.acmecoaching.com/about and http://example.net/x?y=1";
        let domains = extract_domains(text);
        assert_eq!(
            domains,
            vec!["acmecoaching.com".to_string(), "example.net".to_string()]
        );
    }

    #[test]
    fn skips_social_platforms() {
        let text = "youtube.com/@me twitter.com/me patreon.com/me mysite.dev";
        assert_eq!(extract_domains(text), vec!["mysite.dev".to_string()]);
    }

    #[test]
    fn dedupes_preserving_order() {
        let text = "visit acme.com or acme.com, also acme.org";
        assert_eq!(
            extract_domains(text),
            vec!["acme.com".to_string(), "acme.org".to_string()]
        );
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(extract_domains("").is_empty());
        assert!(extract_domains("no links here").is_empty());
    }
}
