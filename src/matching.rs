//! Fuzzy matching of recognized text against catalog names.
//!
//! Recognized text is noisy: characters get dropped or swapped and word
//! order is unreliable, while catalog names are often substrings or
//! supersets of what the recognizer produces. Scoring therefore uses a
//! token-set ratio: tokenize both strings, and compare the sorted token
//! intersection against each side's full sorted token string. A subset
//! relationship between token sets scores 100.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::CatalogStore;

/// Score assigned to a case-insensitive exact name match.
pub const EXACT_MATCH_SCORE: u8 = 100;

/// A catalog entry resolved from input text, with its match score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemMatch {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    /// 0-100
    pub score: u8,
}

fn tokens(s: &str) -> BTreeSet<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Character-level similarity on 0-100: `200 * lcs / (|a| + |b|)`, rounded.
/// Identical strings score 100; disjoint strings score 0.
fn similarity(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let lcs = lcs_len(&a, &b);
    ((200 * lcs + total / 2) / total).min(100) as u8
}

fn join(parts: &[&String]) -> String {
    parts
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Token-set similarity on 0-100. Symmetric, order-insensitive, and 100 for
/// identical inputs; degrades gracefully as tokens are inserted or removed.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() && tb.is_empty() {
        // No tokens on either side; fall back to raw character similarity
        return similarity(&a.to_lowercase(), &b.to_lowercase());
    }
    if ta.is_empty() || tb.is_empty() {
        return 0;
    }
    let inter: Vec<&String> = ta.intersection(&tb).collect();
    let only_a: Vec<&String> = ta.difference(&tb).collect();
    let only_b: Vec<&String> = tb.difference(&ta).collect();

    let base = join(&inter);
    let mut left = base.clone();
    if !only_a.is_empty() {
        if !left.is_empty() {
            left.push(' ');
        }
        left.push_str(&join(&only_a));
    }
    let mut right = base.clone();
    if !only_b.is_empty() {
        if !right.is_empty() {
            right.push(' ');
        }
        right.push_str(&join(&only_b));
    }

    similarity(&base, &left)
        .max(similarity(&base, &right))
        .max(similarity(&left, &right))
}

/// Resolves `text` to the best catalog entry at or above `min_score`.
///
/// A case-insensitive exact name match always wins with a score of 100.
/// Otherwise the highest token-set score is taken; on a tie the
/// first-encountered name (catalog iteration order) wins. `min_score`
/// above 100 can never match.
pub fn match_item(catalog: &CatalogStore, text: &str, min_score: u8) -> Option<ItemMatch> {
    if text.is_empty() || catalog.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();
    for (name, item) in catalog.iter() {
        if name.to_lowercase() == lowered {
            return Some(ItemMatch {
                name: name.clone(),
                price: item.price,
                stock: item.stock,
                score: EXACT_MATCH_SCORE,
            });
        }
    }

    let mut best: Option<ItemMatch> = None;
    for (name, item) in catalog.iter() {
        let score = token_set_ratio(text, name);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(ItemMatch {
                name: name.clone(),
                price: item.price,
                stock: item.stock,
                score,
            });
        }
    }
    best.filter(|m| m.score >= min_score)
}

/// Ranks catalog entries against `query`, best first, up to `limit` results.
/// No threshold is applied: low-quality matches are still returned.
pub fn search(catalog: &CatalogStore, query: &str, limit: usize) -> Vec<ItemMatch> {
    if query.is_empty() || catalog.is_empty() {
        return Vec::new();
    }
    let mut results: Vec<ItemMatch> = catalog
        .iter()
        .map(|(name, item)| ItemMatch {
            name: name.clone(),
            price: item.price,
            stock: item.stock,
            score: token_set_ratio(query, name),
        })
        .collect();
    // Stable sort keeps catalog order among equal scores
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(names: &[(&str, i64, i64)]) -> (tempfile::TempDir, CatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CatalogStore::open(dir.path().join("items_database.json"));
        for (name, price, stock) in names {
            store.add_item(name, *price, *stock).unwrap();
        }
        (dir, store)
    }

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(token_set_ratio("Red Potion", "Red Potion"), 100);
        assert_eq!(token_set_ratio("red POTION", "Red Potion"), 100);
    }

    #[test]
    fn score_is_symmetric() {
        let a = "Dark Scroll for Helmet 60%";
        let b = "Scroll Helmet DEX 60";
        assert_eq!(token_set_ratio(a, b), token_set_ratio(b, a));
    }

    #[test]
    fn token_order_is_irrelevant() {
        assert_eq!(token_set_ratio("Potion Red", "Red Potion"), 100);
    }

    #[test]
    fn token_subset_scores_100() {
        // Catalog names are frequently substrings of noisy recognized text
        assert_eq!(token_set_ratio("Red Potion lvl 10 req", "Red Potion"), 100);
    }

    #[test]
    fn score_degrades_with_edits() {
        let close = token_set_ratio("Red Poton", "Red Potion");
        let far = token_set_ratio("Blue Elixir", "Red Potion");
        assert!(close > far);
        assert!(close >= 70, "typo match should stay strong, got {}", close);
    }

    #[test]
    fn disjoint_tokens_score_low() {
        assert!(token_set_ratio("zzz", "Red Potion") < 40);
    }

    #[test]
    fn exact_match_beats_fuzzy_and_scores_100() {
        let (_dir, catalog) = catalog_with(&[("Red Potion", 100, 2), ("Red Potion X", 900, 1)]);
        let m = match_item(&catalog, "red potion", 70).unwrap();
        assert_eq!(m.name, "Red Potion");
        assert_eq!(m.score, 100);
    }

    #[test]
    fn typo_matches_above_threshold() {
        let (_dir, catalog) = catalog_with(&[("Red Potion", 100, 0)]);
        let m = match_item(&catalog, "Red Poton", 70).unwrap();
        assert_eq!(m.name, "Red Potion");
        assert!(m.score >= 70);
        assert!(m.score < 100);
    }

    #[test]
    fn threshold_above_100_never_matches() {
        let (_dir, catalog) = catalog_with(&[("Red Potion", 100, 0)]);
        assert!(match_item(&catalog, "Red Potion", 101).is_none());
    }

    #[test]
    fn zero_threshold_always_matches_nonempty_catalog() {
        let (_dir, catalog) = catalog_with(&[("Red Potion", 100, 0)]);
        assert!(match_item(&catalog, "completely unrelated", 0).is_some());
    }

    #[test]
    fn empty_text_or_catalog_matches_nothing() {
        let (_dir, catalog) = catalog_with(&[("Red Potion", 100, 0)]);
        assert!(match_item(&catalog, "", 0).is_none());
        let (_dir2, empty) = catalog_with(&[]);
        assert!(match_item(&empty, "Red Potion", 0).is_none());
    }

    #[test]
    fn search_returns_ranked_results_without_threshold() {
        let (_dir, catalog) = catalog_with(&[
            ("Red Potion", 100, 0),
            ("Orange Potion", 150, 0),
            ("Ice Wand", 50000, 0),
        ]);
        let results = search(&catalog, "red potion", 10);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "Red Potion");
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[test]
    fn search_respects_limit_and_empty_query() {
        let (_dir, catalog) = catalog_with(&[("A", 1, 0), ("B", 2, 0), ("C", 3, 0)]);
        assert_eq!(search(&catalog, "A", 2).len(), 2);
        assert!(search(&catalog, "", 10).is_empty());
    }
}
