//! Niche classification from profile text via weighted keyword matching.

use leadloom_shared::NicheConfig;

/// Label returned when no keyword from any niche matches.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Classify free text into a niche label with a confidence in 0.0–1.0.
///
/// Scores each niche as the sum of weights of keywords found in the text
/// (case-insensitive substring match), normalized by that niche's maximum
/// possible score so confidences are comparable across niches of different
/// keyword-set sizes. Ties go to the lexicographically smaller label.
/// Never fails: unmatched text yields (`"uncategorized"`, 0.0).
pub fn classify(text: &str, niches: &[NicheConfig]) -> (String, f64) {
    let haystack = text.to_lowercase();

    let mut best: Option<(&str, f64)> = None;

    for niche in niches {
        let max_score: u32 = niche.keywords.iter().map(|kw| kw.weight).sum();
        if max_score == 0 {
            continue;
        }

        let score: u32 = niche
            .keywords
            .iter()
            .filter(|kw| haystack.contains(&kw.keyword.to_lowercase()))
            .map(|kw| kw.weight)
            .sum();

        if score == 0 {
            continue;
        }

        let confidence = f64::from(score) / f64::from(max_score);
        let replace = match best {
            None => true,
            Some((best_label, best_conf)) => {
                confidence > best_conf
                    || (confidence == best_conf && niche.label.as_str() < best_label)
            }
        };
        if replace {
            best = Some((niche.label.as_str(), confidence));
        }
    }

    match best {
        Some((label, confidence)) => (label.to_string(), confidence),
        None => (UNCATEGORIZED.to_string(), 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadloom_shared::WeightedKeyword;

    fn niche(label: &str, keywords: &[(&str, u32)]) -> NicheConfig {
        NicheConfig {
            label: label.into(),
            keywords: keywords
                .iter()
                .map(|(kw, w)| WeightedKeyword {
                    keyword: (*kw).into(),
                    weight: *w,
                })
                .collect(),
        }
    }

    fn table() -> Vec<NicheConfig> {
        vec![
            niche("gaming", &[("gaming", 2), ("esports", 1), ("streamer", 1)]),
            niche("fitness", &[("workout", 2), ("gym", 1), ("nutrition", 1)]),
            niche("technology", &[("coding", 2), ("software", 1)]),
        ]
    }

    #[test]
    fn matches_single_niche() {
        let (label, confidence) = classify("Daily workout routines and gym tips", &table());
        assert_eq!(label, "fitness");
        // workout (2) + gym (1) out of a maximum of 4.
        assert!((confidence - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn case_insensitive_matching() {
        let (label, _) = classify("GAMING and Esports highlights", &table());
        assert_eq!(label, "gaming");
    }

    #[test]
    fn confidence_normalized_across_set_sizes() {
        let (label, confidence) = classify("coding and software deep dives", &table());
        assert_eq!(label, "technology");
        assert!((confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tie_breaks_to_smaller_label() {
        let niches = vec![
            niche("beta", &[("widget", 1)]),
            niche("alpha", &[("widget", 1)]),
        ];
        let (label, confidence) = classify("widget reviews", &niches);
        assert_eq!(label, "alpha");
        assert!((confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_match_is_uncategorized() {
        let (label, confidence) = classify("completely unrelated text", &table());
        assert_eq!(label, UNCATEGORIZED);
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn empty_text_is_uncategorized() {
        let (label, confidence) = classify("", &table());
        assert_eq!(label, UNCATEGORIZED);
        assert_eq!(confidence, 0.0);
    }
}
