/// String similarity scorers for scientific names, all on a 0-100 scale
///
/// The default weighted ratio combines an Indel-normalised ratio with
/// token-sorted, token-set, and partial (substring) variants, so that word
/// order differences ("mellifera apis") and qualifiers ("Bombus sp") still
/// score highly while unrelated names do not.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Weight applied to the token-based and partial-token variants
const UNBASE_SCALE: f64 = 0.95;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scorer {
    #[default]
    WeightedRatio,
    JaroWinkler,
    Levenshtein,
}

impl Scorer {
    pub fn score(&self, a: &str, b: &str) -> f64 {
        match self {
            Self::WeightedRatio => weighted_ratio(a, b),
            Self::JaroWinkler => {
                if a.is_empty() || b.is_empty() {
                    0.0
                } else {
                    strsim::jaro_winkler(a, b) * 100.0
                }
            }
            Self::Levenshtein => {
                if a.is_empty() || b.is_empty() {
                    0.0
                } else {
                    strsim::normalized_levenshtein(a, b) * 100.0
                }
            }
        }
    }

    /// Highest score two strings of these character lengths could reach.
    /// Used to skip choices that cannot clear a threshold.
    pub fn upper_bound(&self, len_a: usize, len_b: usize) -> f64 {
        if len_a == 0 || len_b == 0 {
            return 0.0;
        }
        match self {
            Self::WeightedRatio => {
                let ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
                if ratio < 1.5 {
                    100.0
                } else if ratio < 8.0 {
                    // partial path scaled by 0.9; plain ratio tops out at 80
                    90.0
                } else {
                    60.0
                }
            }
            Self::Levenshtein => {
                let (short, long) = (len_a.min(len_b) as f64, len_a.max(len_b) as f64);
                100.0 * short / long
            }
            Self::JaroWinkler => 100.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeightedRatio => "weighted-ratio",
            Self::JaroWinkler => "jaro-winkler",
            Self::Levenshtein => "levenshtein",
        }
    }
}

impl fmt::Display for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scorer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weighted-ratio" | "wratio" => Ok(Self::WeightedRatio),
            "jaro-winkler" | "jaro_winkler" => Ok(Self::JaroWinkler),
            "levenshtein" => Ok(Self::Levenshtein),
            _ => Err(format!("Unknown scorer: {}", s)),
        }
    }
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diag + 1
            } else {
                above.max(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let indel = total - 2 * lcs_len(a, b);
    100.0 * (1.0 - indel as f64 / total as f64)
}

/// Normalised Indel similarity: 100 * (1 - insertions+deletions / total length)
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best ratio between the shorter string and any equally long window of the
/// longer one, including windows hanging off either end.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let m = short.len();
    let n = long.len();
    let mut best: f64 = 0.0;

    let mut consider = |window: &[char]| {
        best = best.max(ratio_chars(&short, window));
    };

    for end in 1..m.min(n) {
        consider(&long[..end]);
    }
    for start in 0..=(n - m) {
        consider(&long[start..start + m]);
    }
    for start in (n - m + 1)..n {
        consider(&long[start..]);
    }

    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

struct TokenSets {
    intersection: String,
    diff_ab: String,
    diff_ba: String,
}

fn token_sets(a: &str, b: &str) -> TokenSets {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    TokenSets {
        intersection: join(set_a.intersection(&set_b).copied().collect()),
        diff_ab: join(set_a.difference(&set_b).copied().collect()),
        diff_ba: join(set_b.difference(&set_a).copied().collect()),
    }
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let sets = token_sets(a, b);
    if sets.intersection.is_empty() && sets.diff_ab.is_empty() && sets.diff_ba.is_empty() {
        return 0.0;
    }
    if !sets.intersection.is_empty() && (sets.diff_ab.is_empty() || sets.diff_ba.is_empty()) {
        return 100.0;
    }

    let combine = |diff: &str| {
        if sets.intersection.is_empty() {
            diff.to_string()
        } else {
            format!("{} {}", sets.intersection, diff)
        }
    };
    let combined_ab = combine(&sets.diff_ab);
    let combined_ba = combine(&sets.diff_ba);

    ratio(&sets.intersection, &combined_ab)
        .max(ratio(&sets.intersection, &combined_ba))
        .max(ratio(&combined_ab, &combined_ba))
}

/// Partial ratio over sorted tokens and over the token differences
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let sets = token_sets(a, b);
    if !sets.intersection.is_empty() {
        return 100.0;
    }
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
        .max(partial_ratio(&sets.diff_ab, &sets.diff_ba))
}

/// Token-order-insensitive weighted ratio; 0 when either side is empty
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let mut score = ratio(a, b);

    if len_ratio < 1.5 {
        let token_ratio = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return score.max(token_ratio * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    score = score.max(partial_ratio(a, b) * partial_scale);
    score.max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}

/// A pool entry with its character length cached for bound checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub name: String,
    pub char_len: usize,
}

impl Choice {
    pub fn new(name: String) -> Self {
        let char_len = name.chars().count();
        Self { name, char_len }
    }
}

/// Indices and scores of the best `limit` choices scoring at least
/// `threshold`, best first; equal scores keep pool order.
pub fn extract_top(
    query: &str,
    choices: &[Choice],
    scorer: Scorer,
    threshold: f64,
    limit: usize,
) -> Vec<(usize, f64)> {
    let query_len = query.chars().count();
    if query_len == 0 || limit == 0 {
        return Vec::new();
    }

    let mut hits: Vec<(usize, f64)> = choices
        .iter()
        .enumerate()
        .filter(|(_, choice)| scorer.upper_bound(query_len, choice.char_len) >= threshold)
        .filter_map(|(i, choice)| {
            let score = scorer.score(query, &choice.name);
            (score >= threshold).then_some((i, score))
        })
        .collect();

    hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("apis mellifera", "apis mellifera"), 100.0);
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", ""), 0.0);
        // one insertion over 19 characters
        assert!(approx(ratio("bombus sp", "bombus spp"), 94.74));
    }

    #[test]
    fn test_partial_ratio_finds_substring() {
        assert_eq!(partial_ratio("mellifera", "apis mellifera ligustica"), 100.0);
        assert_eq!(partial_ratio("", "apis"), 0.0);
    }

    #[test]
    fn test_token_order_insensitive() {
        assert_eq!(token_sort_ratio("mellifera apis", "apis mellifera"), 100.0);
        assert!(approx(
            weighted_ratio("mellifera apis", "apis mellifera"),
            95.0
        ));
    }

    #[test]
    fn test_token_subset_scores_full_set_ratio() {
        assert_eq!(token_set_ratio("apis mellifera", "apis mellifera mellifera"), 100.0);
        assert_eq!(token_set_ratio("", ""), 0.0);
    }

    #[rstest]
    #[case("bombus sp", "bombus spp", 94.74)]
    #[case("apis mellifera", "apis mellifera", 100.0)]
    #[case("apis", "", 0.0)]
    fn test_weighted_ratio(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        assert!(
            approx(weighted_ratio(a, b), expected),
            "{} vs {} scored {}",
            a,
            b,
            weighted_ratio(a, b)
        );
    }

    #[test]
    fn test_weighted_ratio_long_length_ratio_uses_partial() {
        // length ratio >= 1.5: best window is exact, scaled by 0.9
        let score = weighted_ratio("apis", "apis mellifera");
        assert!(approx(score, 90.0), "scored {}", score);
    }

    #[test]
    fn test_upper_bound_is_never_exceeded() {
        let pairs = [
            ("apis", "apis mellifera"),
            ("a", "apis mellifera ligustica"),
            ("bombus", "bombus terrestris"),
            ("vespa", "vespula"),
        ];
        for scorer in [Scorer::WeightedRatio, Scorer::Levenshtein, Scorer::JaroWinkler] {
            for (a, b) in pairs {
                let bound = scorer.upper_bound(a.chars().count(), b.chars().count());
                assert!(scorer.score(a, b) <= bound + 1e-9, "{} {} {}", scorer, a, b);
            }
        }
    }

    #[test]
    fn test_strsim_scorers() {
        assert_eq!(Scorer::JaroWinkler.score("apis", "apis"), 100.0);
        assert_eq!(Scorer::Levenshtein.score("apis", ""), 0.0);
        assert!(approx(Scorer::Levenshtein.score("bombus sp", "bombus spp"), 90.0));
    }

    #[test]
    fn test_extract_top_orders_and_limits() {
        let choices: Vec<Choice> = ["bombus spp", "vombus sp", "bombus sp", "apis", "bombus spp."]
            .into_iter()
            .map(|s| Choice::new(s.to_string()))
            .collect();

        let hits = extract_top("bombus sp", &choices, Scorer::WeightedRatio, 90.0, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], (2, 100.0));
        assert_eq!(hits[1].0, 0);

        let none = extract_top("", &choices, Scorer::WeightedRatio, 0.0, 5);
        assert!(none.is_empty());
    }

    #[test]
    fn test_scorer_parsing() {
        assert_eq!("jaro-winkler".parse::<Scorer>(), Ok(Scorer::JaroWinkler));
        assert_eq!("WRatio".parse::<Scorer>(), Ok(Scorer::WeightedRatio));
        assert!("cosine".parse::<Scorer>().is_err());
    }
}
