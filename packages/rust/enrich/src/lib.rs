//! Email-enrichment collaborator client.
//!
//! Talks to a Hunter.io-compatible `/domain-search` endpoint to find the
//! best contact email for a domain. The orchestrator is generic over the
//! [`EmailFinder`] trait, so tests substitute a deterministic fake instead
//! of a live HTTP client.

use leadloom_shared::{EnrichmentResult, LeadLoomError, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Default timeout in seconds for collaborator requests.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Ranking bonus for emails the collaborator verified deliverable.
const DELIVERABLE_BONUS: u32 = 10;

/// User-Agent string for enrichment requests.
const USER_AGENT: &str = concat!("leadloom/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// EmailFinder trait
// ---------------------------------------------------------------------------

/// A collaborator that can find a contact email for a domain.
pub trait EmailFinder {
    /// Find the best email for `domain`, or `None` when the collaborator
    /// knows nothing useful about it.
    fn find_email(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Option<EnrichmentResult>>> + Send;
}

// ---------------------------------------------------------------------------
// HunterClient
// ---------------------------------------------------------------------------

/// Hunter.io v2 `/domain-search` client.
pub struct HunterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    min_confidence: u8,
}

impl HunterClient {
    /// Build a client against `base_url` (e.g. `https://api.hunter.io/v2`).
    pub fn new(base_url: &str, api_key: &str, min_confidence: u8) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LeadLoomError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            min_confidence,
        })
    }
}

impl EmailFinder for HunterClient {
    #[instrument(skip_all, fields(domain = %domain))]
    async fn find_email(&self, domain: &str) -> Result<Option<EnrichmentResult>> {
        let url = format!("{}/domain-search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("domain", domain), ("api_key", &self.api_key)])
            .send()
            .await
            .map_err(|e| LeadLoomError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadLoomError::Network(format!("{url}: HTTP {status}")));
        }

        let body: DomainSearchResponse = response
            .json()
            .await
            .map_err(|e| LeadLoomError::Enrichment(format!("malformed response: {e}")))?;

        let best = select_best_email(&body.data.emails, self.min_confidence);
        match &best {
            Some(result) => debug!(
                email = %result.email,
                confidence = result.confidence,
                "email found"
            ),
            None => debug!("no usable email for domain"),
        }

        Ok(best.map(|mut r| {
            r.domain = domain.to_string();
            r
        }))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DomainSearchResponse {
    #[serde(default)]
    data: DomainSearchData,
}

#[derive(Debug, Default, Deserialize)]
struct DomainSearchData {
    #[serde(default)]
    emails: Vec<EmailEntry>,
}

#[derive(Debug, Deserialize)]
struct EmailEntry {
    value: String,
    #[serde(default)]
    confidence: u8,
    #[serde(default)]
    verification: Option<Verification>,
}

#[derive(Debug, Deserialize)]
struct Verification {
    #[serde(default)]
    status: Option<String>,
}

impl EmailEntry {
    fn is_deliverable(&self) -> bool {
        self.verification
            .as_ref()
            .and_then(|v| v.status.as_deref())
            .is_some_and(|s| s == "valid")
    }
}

/// Pick the best email: drop entries below `min_confidence`, rank the rest
/// by confidence plus a deliverable-verification bonus.
fn select_best_email(emails: &[EmailEntry], min_confidence: u8) -> Option<EnrichmentResult> {
    emails
        .iter()
        .filter(|e| !e.value.is_empty() && e.confidence >= min_confidence)
        .max_by_key(|e| {
            let mut rank = u32::from(e.confidence);
            if e.is_deliverable() {
                rank += DELIVERABLE_BONUS;
            }
            rank
        })
        .map(|e| EnrichmentResult {
            email: e.value.clone(),
            confidence: e.confidence.min(100),
            verified: e.is_deliverable(),
            domain: String::new(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(value: &str, confidence: u8, status: Option<&str>) -> EmailEntry {
        EmailEntry {
            value: value.into(),
            confidence,
            verification: status.map(|s| Verification {
                status: Some(s.into()),
            }),
        }
    }

    #[test]
    fn best_email_prefers_highest_confidence() {
        let emails = vec![
            entry("low@acme.com", 60, None),
            entry("high@acme.com", 90, None),
        ];
        let best = select_best_email(&emails, 50).expect("one survives");
        assert_eq!(best.email, "high@acme.com");
        assert!(!best.verified);
    }

    #[test]
    fn deliverable_bonus_can_flip_the_ranking() {
        let emails = vec![
            entry("info@acme.com", 85, None),
            entry("sales@acme.com", 80, Some("valid")),
        ];
        // 80 + 10 deliverable beats a bare 85.
        let best = select_best_email(&emails, 50).expect("one survives");
        assert_eq!(best.email, "sales@acme.com");
        assert!(best.verified);
    }

    #[test]
    fn below_min_confidence_is_dropped() {
        let emails = vec![entry("weak@acme.com", 40, Some("valid"))];
        assert!(select_best_email(&emails, 50).is_none());
        assert!(select_best_email(&[], 50).is_none());
    }

    #[tokio::test]
    async fn finds_email_via_domain_search() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "data": {
                "domain": "fireship.io",
                "emails": [
                    { "value": "hello@fireship.io", "confidence": 72 },
                    {
                        "value": "contact@fireship.io",
                        "confidence": 94,
                        "verification": { "status": "valid" }
                    }
                ]
            }
        });

        Mock::given(method("GET"))
            .and(path("/domain-search"))
            .and(query_param("domain", "fireship.io"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = HunterClient::new(&server.uri(), "test-key", 50).unwrap();
        let result = client
            .find_email("fireship.io")
            .await
            .unwrap()
            .expect("email found");

        assert_eq!(result.email, "contact@fireship.io");
        assert_eq!(result.confidence, 94);
        assert!(result.verified);
        assert_eq!(result.domain, "fireship.io");
    }

    #[tokio::test]
    async fn empty_result_set_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/domain-search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "data": { "emails": [] } })),
            )
            .mount(&server)
            .await;

        let client = HunterClient::new(&server.uri(), "test-key", 50).unwrap();
        let result = client.find_email("ghost.example").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn http_error_maps_to_network() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/domain-search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = HunterClient::new(&server.uri(), "test-key", 50).unwrap();
        let err = client.find_email("acme.com").await.expect_err("429");
        assert!(matches!(err, LeadLoomError::Network(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_enrichment() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/domain-search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = HunterClient::new(&server.uri(), "test-key", 50).unwrap();
        let err = client.find_email("acme.com").await.expect_err("bad body");
        assert!(matches!(err, LeadLoomError::Enrichment(_)));
    }
}
