//! Deterministic lead scoring.
//!
//! A lead's score is always recomputed from its current fields, never
//! adjusted incrementally, so the same lead state always produces the same
//! score regardless of the mutation history that led there.

use leadloom_shared::{LeadSource, ScoringConfig};

/// Base score for operator-entered leads.
const BASE_MANUAL: u32 = 30;
/// Base score for demo-chat and API leads.
const BASE_DEMO_API: u32 = 25;
/// Base score for YouTube creator discoveries.
const BASE_YOUTUBE: u32 = 20;
/// Base score for domain-scraping discoveries.
const BASE_DOMAIN_SCRAPING: u32 = 15;
/// Base score for every other source.
const BASE_OTHER: u32 = 10;

/// Bonus for email confidence above 80.
const BONUS_HIGH_CONFIDENCE: u32 = 25;
/// Bonus for email confidence in 61..=80.
const BONUS_MID_CONFIDENCE: u32 = 15;
/// Bonus for a premium TLD on the known domain.
const BONUS_PREMIUM_TLD: u32 = 10;
/// Bonus for a business keyword in the known domain.
const BONUS_BUSINESS_KEYWORD: u32 = 15;

/// Compute a lead score in [0, 100] from source, email confidence and domain.
pub fn compute_score(
    source: LeadSource,
    email_confidence: Option<u8>,
    domain: Option<&str>,
    scoring: &ScoringConfig,
) -> u8 {
    let mut score = source_base(source);

    if let Some(confidence) = email_confidence {
        if confidence > 80 {
            score += BONUS_HIGH_CONFIDENCE;
        } else if confidence > 60 {
            score += BONUS_MID_CONFIDENCE;
        }
    }

    if let Some(domain) = domain {
        let domain = domain.to_lowercase();
        if scoring.premium_tlds.iter().any(|tld| domain.ends_with(tld)) {
            score += BONUS_PREMIUM_TLD;
        }
        if scoring
            .business_keywords
            .iter()
            .any(|kw| domain.contains(kw.as_str()))
        {
            score += BONUS_BUSINESS_KEYWORD;
        }
    }

    score.min(100) as u8
}

fn source_base(source: LeadSource) -> u32 {
    match source {
        LeadSource::Manual => BASE_MANUAL,
        LeadSource::DemoChat | LeadSource::Api => BASE_DEMO_API,
        LeadSource::YoutubeCreatorScraper => BASE_YOUTUBE,
        LeadSource::DomainScraping => BASE_DOMAIN_SCRAPING,
        LeadSource::GithubEnhancement
        | LeadSource::TwitterEnhancement
        | LeadSource::HunterEnrichment => BASE_OTHER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn source_bases() {
        let c = config();
        assert_eq!(compute_score(LeadSource::Manual, None, None, &c), 30);
        assert_eq!(compute_score(LeadSource::DemoChat, None, None, &c), 25);
        assert_eq!(compute_score(LeadSource::Api, None, None, &c), 25);
        assert_eq!(
            compute_score(LeadSource::YoutubeCreatorScraper, None, None, &c),
            20
        );
        assert_eq!(compute_score(LeadSource::DomainScraping, None, None, &c), 15);
        assert_eq!(
            compute_score(LeadSource::GithubEnhancement, None, None, &c),
            10
        );
    }

    #[test]
    fn confidence_bands() {
        let c = config();
        let score =
            |conf| compute_score(LeadSource::YoutubeCreatorScraper, Some(conf), None, &c);
        assert_eq!(score(60), 20); // no bonus at the band edge
        assert_eq!(score(61), 35);
        assert_eq!(score(80), 35);
        assert_eq!(score(81), 45);
        assert_eq!(score(100), 45);
    }

    #[test]
    fn raising_confidence_from_70_to_85_adds_ten() {
        let c = config();
        let before = compute_score(
            LeadSource::YoutubeCreatorScraper,
            Some(70),
            Some("fireship.io"),
            &c,
        );
        let after = compute_score(
            LeadSource::YoutubeCreatorScraper,
            Some(85),
            Some("fireship.io"),
            &c,
        );
        assert_eq!(after - before, 10);
    }

    #[test]
    fn domain_bonuses_stack() {
        let c = config();
        // .com premium TLD (+10) and "consulting" keyword (+15).
        assert_eq!(
            compute_score(
                LeadSource::DomainScraping,
                None,
                Some("acmeconsulting.com"),
                &c
            ),
            40
        );
        // Non-premium TLD, no keyword.
        assert_eq!(
            compute_score(LeadSource::DomainScraping, None, Some("acme.dev"), &c),
            15
        );
    }

    #[test]
    fn maximum_stack_stays_within_bounds() {
        let c = config();
        // Every bonus at once: 30 + 25 + 10 + 15.
        let score = compute_score(
            LeadSource::Manual,
            Some(95),
            Some("mybusiness.com"),
            &c,
        );
        assert_eq!(score, 80);
        assert!(score <= 100);
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        let c = config();
        let a = compute_score(LeadSource::Api, Some(77), Some("widgets.org"), &c);
        let b = compute_score(LeadSource::Api, Some(77), Some("widgets.org"), &c);
        assert_eq!(a, b);
    }
}
