//! Candidate-domain prediction from display names.
//!
//! Prediction is speculative by design: the output is an ordered guess list
//! that downstream consumers truncate under quota pressure, so the most
//! likely form (bare concatenation + primary TLD) must come first.

use leadloom_shared::PredictConfig;

/// Minimum length of the label part (before the TLD) for a plausible domain.
const MIN_LABEL_LEN: usize = 4;

/// Maximum length of the label part for a plausible domain.
const MAX_LABEL_LEN: usize = 20;

/// Predict likely website domains for a display name, most likely first.
///
/// Deterministic and bounded by `config.max_candidates`. Names that
/// normalize to fewer than two characters yield an empty list; prediction
/// fails silently rather than erroring.
pub fn predict(display_name: &str, config: &PredictConfig) -> Vec<String> {
    let words = normalize_words(display_name);
    let bare: String = words.concat();
    if bare.chars().count() < 2 {
        return Vec::new();
    }

    let hyphenated = words.join("-");
    let primary_tld = match config.tlds.first() {
        Some(tld) => tld.as_str(),
        None => return Vec::new(),
    };

    let mut labels: Vec<(String, &str)> = Vec::new();

    // Rank order: bare + primary TLD, hyphenated + primary TLD, bare +
    // secondary TLDs, then prefixed and suffixed variants on the primary TLD.
    labels.push((bare.clone(), primary_tld));
    labels.push((hyphenated, primary_tld));
    for tld in config.tlds.iter().skip(1) {
        labels.push((bare.clone(), tld.as_str()));
    }
    for prefix in &config.prefixes {
        labels.push((format!("{prefix}{bare}"), primary_tld));
    }
    for suffix in &config.suffixes {
        labels.push((format!("{bare}{suffix}"), primary_tld));
    }

    let mut candidates = Vec::new();
    for (label, tld) in labels {
        if label.len() < MIN_LABEL_LEN || label.len() > MAX_LABEL_LEN {
            continue;
        }
        let domain = format!("{label}{tld}");
        if !candidates.contains(&domain) {
            candidates.push(domain);
        }
        if candidates.len() >= config.max_candidates {
            break;
        }
    }

    candidates
}

/// Lowercase a display name and split it into alphanumeric words.
fn normalize_words(display_name: &str) -> Vec<String> {
    display_name
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PredictConfig {
        PredictConfig::default()
    }

    #[test]
    fn bare_concatenation_ranks_first() {
        let predicted = predict("Business Basics", &config());
        assert_eq!(predicted[0], "businessbasics.com");
        assert!(predicted.contains(&"business-basics.com".to_string()));
        let bare_pos = predicted
            .iter()
            .position(|d| d == "businessbasics.com")
            .unwrap();
        let prefixed_pos = predicted
            .iter()
            .position(|d| d == "thebusinessbasics.com")
            .unwrap();
        assert!(bare_pos < prefixed_pos);
    }

    #[test]
    fn deterministic_output() {
        let a = predict("Business Basics", &config());
        let b = predict("Business Basics", &config());
        assert_eq!(a, b);
    }

    #[test]
    fn single_word_dedupes_hyphenated() {
        let predicted = predict("Fireship", &config());
        assert_eq!(predicted[0], "fireship.com");
        // Hyphenated form equals the bare form and must not appear twice.
        assert_eq!(
            predicted
                .iter()
                .filter(|d| *d == "fireship.com")
                .count(),
            1
        );
    }

    #[test]
    fn bounded_by_max_candidates() {
        let predicted = predict("Business Basics", &config());
        assert!(predicted.len() <= config().max_candidates);
    }

    #[test]
    fn empty_and_short_names_yield_nothing() {
        assert!(predict("", &config()).is_empty());
        assert!(predict("X", &config()).is_empty());
        assert!(predict("!!!", &config()).is_empty());
    }

    #[test]
    fn punctuation_is_stripped() {
        let predicted = predict("Ali's Kitchen!", &config());
        assert_eq!(predicted[0], "aliskitchen.com");
    }

    #[test]
    fn overlong_labels_are_skipped() {
        let predicted = predict("Extraordinarily Long Channel Name Incorporated", &config());
        for domain in &predicted {
            let label_len = domain.split('.').next().unwrap().len();
            assert!(label_len <= MAX_LABEL_LEN);
        }
    }
}
