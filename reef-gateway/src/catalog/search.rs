//! Relevance search over a catalog snapshot
//!
//! Pure functions; given the same snapshot, phrase, and exclusion set the
//! output is identical, which the conversation tests rely on.

use shared::{CatalogEntry, CatalogSnapshot, ScoredEntry};
use std::collections::HashSet;

/// Default result size
pub const DEFAULT_LIMIT: usize = 3;

// Additive score weights; vendor dominates so brand queries surface the
// brand's products ahead of incidental title matches.
const SCORE_TITLE: u32 = 10;
const SCORE_DESCRIPTION: u32 = 5;
const SCORE_VENDOR: u32 = 15;
const SCORE_PRODUCT_TYPE: u32 = 8;
const SCORE_TAG: u32 = 5;
const SCORE_COLLECTION: u32 = 8;

/// Score one entry against a lowercased phrase
fn score_entry(phrase: &str, entry: &CatalogEntry) -> u32 {
    let mut score = 0;
    if entry.title.to_lowercase().contains(phrase) {
        score += SCORE_TITLE;
    }
    if entry.description.to_lowercase().contains(phrase) {
        score += SCORE_DESCRIPTION;
    }
    if entry.vendor.to_lowercase().contains(phrase) {
        score += SCORE_VENDOR;
    }
    if entry.product_type.to_lowercase().contains(phrase) {
        score += SCORE_PRODUCT_TYPE;
    }
    if entry.tags.iter().any(|t| t.to_lowercase().contains(phrase)) {
        score += SCORE_TAG;
    }
    if entry
        .collections
        .iter()
        .any(|c| c.title.to_lowercase().contains(phrase))
    {
        score += SCORE_COLLECTION;
    }
    score
}

/// Search with the default catalog-order deficit fill
pub fn search(
    phrase: &str,
    snapshot: &CatalogSnapshot,
    exclude: &HashSet<String>,
    limit: usize,
) -> Vec<ScoredEntry> {
    search_with_fill(phrase, snapshot, exclude, limit, |candidates, deficit| {
        candidates.iter().take(deficit).cloned().collect()
    })
}

/// Search with a caller-supplied deficit picker.
///
/// `fill` receives the zero-score candidates (available, not excluded,
/// not already in the result) in catalog order and the number of slots to
/// fill; it must be deterministic for reproducible conversations, though
/// production may hide randomness behind the same signature.
pub fn search_with_fill<F>(
    phrase: &str,
    snapshot: &CatalogSnapshot,
    exclude: &HashSet<String>,
    limit: usize,
    fill: F,
) -> Vec<ScoredEntry>
where
    F: Fn(&[CatalogEntry], usize) -> Vec<CatalogEntry>,
{
    let phrase = phrase.trim().to_lowercase();

    // Unavailable and already-shown entries never participate
    let candidates: Vec<&CatalogEntry> = snapshot
        .entries
        .iter()
        .filter(|e| e.available && !exclude.contains(&e.id))
        .collect();

    let mut scored: Vec<ScoredEntry> = if phrase.is_empty() {
        Vec::new()
    } else {
        candidates
            .iter()
            .map(|e| ScoredEntry {
                entry: (*e).clone(),
                score: score_entry(&phrase, e),
            })
            .filter(|s| s.score > 0)
            .collect()
    };

    // Stable sort keeps catalog order on ties, making results
    // reproducible for the same snapshot and exclusion set.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);

    if scored.len() < limit {
        let taken: HashSet<&str> = scored.iter().map(|s| s.entry.id.as_str()).collect();
        let leftovers: Vec<CatalogEntry> = candidates
            .iter()
            .filter(|e| !taken.contains(e.id.as_str()))
            .map(|e| (*e).clone())
            .collect();
        for entry in fill(&leftovers, limit - scored.len()) {
            scored.push(ScoredEntry { entry, score: 0 });
        }
        scored.truncate(limit);
    }

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::CollectionRef;

    fn entry(id: &str, title: &str, vendor: &str, available: bool) -> CatalogEntry {
        CatalogEntry {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            vendor: vendor.into(),
            product_type: String::new(),
            tags: vec![],
            collections: vec![],
            price_minor_units: 10000,
            currency: "NOK".into(),
            available,
            primary_variant_id: format!("v-{}", id),
            image_url: None,
        }
    }

    fn snapshot(entries: Vec<CatalogEntry>) -> CatalogSnapshot {
        CatalogSnapshot::new(entries)
    }

    #[test]
    fn test_vendor_match_beats_unavailable_exclusion() {
        // vendor match scores 15; the unavailable entry never participates
        let snap = snapshot(vec![
            entry("1", "Marine Peeling", "Thalgo", true),
            entry("2", "Body Lotion", "Acme", false),
        ]);
        let results = search("thalgo", &snap, &HashSet::new(), 3);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.id, "1");
        assert_eq!(results[0].score, 15);
    }

    #[test]
    fn test_scores_are_additive() {
        let mut e = entry("1", "Thalgo Marine Peeling", "Thalgo", true);
        e.description = "A thalgo classic".into();
        e.product_type = "Thalgo treatments".into();
        e.tags = vec!["thalgo".into()];
        e.collections = vec![CollectionRef {
            id: "c1".into(),
            title: "Thalgo".into(),
            handle: "thalgo".into(),
        }];
        let snap = snapshot(vec![e]);
        let results = search("thalgo", &snap, &HashSet::new(), 3);
        assert_eq!(results[0].score, 10 + 5 + 15 + 8 + 5 + 8);
    }

    #[test]
    fn test_results_sorted_by_non_increasing_score() {
        let snap = snapshot(vec![
            entry("1", "Lotion", "Acme", true),
            entry("2", "Lotion Deluxe", "Lotion House", true),
            entry("3", "Soap", "Acme", true),
        ]);
        let results = search("lotion", &snap, &HashSet::new(), 3);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        // vendor+title match first
        assert_eq!(results[0].entry.id, "2");
    }

    #[test]
    fn test_exclusion_honored() {
        let snap = snapshot(vec![
            entry("1", "Lotion A", "Acme", true),
            entry("2", "Lotion B", "Acme", true),
            entry("3", "Lotion C", "Acme", true),
        ]);
        let exclude: HashSet<String> = ["1".to_string(), "3".to_string()].into();
        let results = search("lotion", &snap, &exclude, 3);
        assert!(results.iter().all(|s| !exclude.contains(&s.entry.id)));
        assert_eq!(results[0].entry.id, "2");
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let snap = snapshot(vec![
            entry("1", "Lotion A", "Acme", true),
            entry("2", "Lotion B", "Acme", true),
            entry("3", "Cream", "Lotion House", true),
        ]);
        let exclude = HashSet::new();
        let a: Vec<String> = search("lotion", &snap, &exclude, 3)
            .into_iter()
            .map(|s| s.entry.id)
            .collect();
        let b: Vec<String> = search("lotion", &snap, &exclude, 3)
            .into_iter()
            .map(|s| s.entry.id)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ties_broken_by_catalog_order() {
        let snap = snapshot(vec![
            entry("1", "Lotion A", "Acme", true),
            entry("2", "Lotion B", "Acme", true),
        ]);
        let results = search("lotion", &snap, &HashSet::new(), 2);
        assert_eq!(results[0].entry.id, "1");
        assert_eq!(results[1].entry.id, "2");
    }

    #[test]
    fn test_deficit_filled_in_catalog_order() {
        let snap = snapshot(vec![
            entry("1", "Soap", "Acme", true),
            entry("2", "Lotion", "Acme", true),
            entry("3", "Candle", "Acme", true),
        ]);
        let results = search("lotion", &snap, &HashSet::new(), 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].entry.id, "2");
        assert_eq!(results[0].score, 10);
        // filled entries carry zero score, catalog order
        assert_eq!(results[1].entry.id, "1");
        assert_eq!(results[1].score, 0);
        assert_eq!(results[2].entry.id, "3");
    }

    #[test]
    fn test_fill_respects_exclusions() {
        let snap = snapshot(vec![
            entry("1", "Soap", "Acme", true),
            entry("2", "Candle", "Acme", true),
        ]);
        let exclude: HashSet<String> = ["1".to_string()].into();
        let results = search("nothing-matches", &snap, &exclude, 3);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.id, "2");
    }

    #[test]
    fn test_empty_phrase_yields_fill_only() {
        let snap = snapshot(vec![
            entry("1", "Soap", "Acme", true),
            entry("2", "Candle", "Acme", true),
        ]);
        let results = search("   ", &snap, &HashSet::new(), 2);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|s| s.score == 0));
    }

    #[test]
    fn test_custom_fill_picker() {
        let snap = snapshot(vec![
            entry("1", "Soap", "Acme", true),
            entry("2", "Candle", "Acme", true),
            entry("3", "Brush", "Acme", true),
        ]);
        // reverse-order picker stands in for production randomness
        let results = search_with_fill("none", &snap, &HashSet::new(), 2, |c, n| {
            c.iter().rev().take(n).cloned().collect()
        });
        assert_eq!(results[0].entry.id, "3");
        assert_eq!(results[1].entry.id, "2");
    }

    #[test]
    fn test_case_insensitive_matching() {
        let snap = snapshot(vec![entry("1", "MARINE Peeling", "ThAlGo", true)]);
        let results = search("Thalgo", &snap, &HashSet::new(), 1);
        assert_eq!(results[0].score, 15);
    }
}
