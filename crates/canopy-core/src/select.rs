//! Data model selection.
//!
//! Catalog pages address models by a code or label passed in a link, with
//! an optional "latest" flag that picks the highest version among matches.
//! Matching is forgiving: identifiers are normalized and slugified before
//! comparison so "Dementia v0.5" finds "dementiav05".

use crate::document::DataModel;
use std::cmp::Ordering;

/// Data models split by study design.
#[derive(Debug, Default)]
pub struct Categorized {
    pub cross_sectional: Vec<DataModel>,
    pub longitudinal: Vec<DataModel>,
}

/// Splits models into cross-sectional and longitudinal lists.
pub fn categorize(models: Vec<DataModel>) -> Categorized {
    let mut out = Categorized::default();
    for model in models {
        if model.longitudinal {
            out.longitudinal.push(model);
        } else {
            out.cross_sectional.push(model);
        }
    }
    out
}

/// Picks the model a catalog link addresses.
///
/// With no query, the first cross-sectional model wins, then the first
/// longitudinal one. With a query, each model's code and label (normalized
/// and slugified) are matched exactly first, then by substring. When
/// `latest` is set the highest version among the matches is returned,
/// otherwise the first match in catalog order.
pub fn pick_selection<'a>(
    categorized: &'a Categorized,
    query: Option<&str>,
    latest: bool,
) -> Option<&'a DataModel> {
    let combined: Vec<&DataModel> = categorized
        .cross_sectional
        .iter()
        .chain(categorized.longitudinal.iter())
        .collect();

    let fallback = || {
        categorized
            .cross_sectional
            .first()
            .or_else(|| categorized.longitudinal.first())
    };

    let Some(query) = query.and_then(normalize) else {
        tracing::debug!("no data model query; falling back to first available model");
        return fallback();
    };
    let query_slug = slugify(&query);

    let matches: Vec<&DataModel> = combined
        .iter()
        .copied()
        .filter(|model| matches_query(model, &query, query_slug.as_deref()))
        .collect();

    tracing::debug!(
        query = %query,
        matches = matches.len(),
        latest,
        "evaluated data model matches"
    );

    if matches.is_empty() {
        return fallback();
    }

    if latest {
        return matches.into_iter().max_by(|a, b| {
            compare_versions(a.version.as_deref(), b.version.as_deref())
        });
    }
    matches.into_iter().next()
}

fn matches_query(model: &DataModel, query: &str, query_slug: Option<&str>) -> bool {
    let mut candidates = Vec::new();
    if let Some(code) = model.code.as_deref().and_then(normalize) {
        candidates.push(code);
    }
    if let Some(label) = normalize(&model.label) {
        candidates.push(label);
    }
    for candidate in candidates.clone() {
        if let Some(slug) = slugify(&candidate) {
            candidates.push(slug);
        }
    }

    candidates.iter().any(|candidate| {
        candidate == query
            || query_slug.is_some_and(|slug| candidate == slug)
            || candidate.contains(query)
            || query_slug.is_some_and(|slug| candidate.contains(slug))
    })
}

/// Compares two version strings token-wise.
///
/// Tokens are runs of digits or letters; numeric tokens compare
/// numerically and beat alphabetic ones; a leading "v" is ignored.
/// Missing versions sort lowest.
pub fn compare_versions(a: Option<&str>, b: Option<&str>) -> Ordering {
    let a_tokens = tokenize_version(a);
    let b_tokens = tokenize_version(b);
    let len = a_tokens.len().max(b_tokens.len());

    for i in 0..len {
        let (a_token, b_token) = (a_tokens.get(i), b_tokens.get(i));
        match (a_token, b_token) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a_token), Some(b_token)) => {
                let a_num = a_token.parse::<u64>().ok();
                let b_num = b_token.parse::<u64>().ok();
                match (a_num, b_num) {
                    (Some(x), Some(y)) if x != y => return x.cmp(&y),
                    (Some(_), Some(_)) => continue,
                    (Some(_), None) => return Ordering::Greater,
                    (None, Some(_)) => return Ordering::Less,
                    (None, None) => {
                        if a_token != b_token {
                            return a_token.cmp(b_token);
                        }
                    }
                }
            }
        }
    }
    Ordering::Equal
}

fn tokenize_version(value: Option<&str>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    let normalized = value.trim().to_lowercase();

    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;
    for c in normalized.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            tokens.push(std::mem::take(&mut current));
        }
        current_is_digit = is_digit;
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    if tokens.len() > 1 && tokens[0] == "v" {
        tokens.remove(0);
    }
    tokens
}

fn normalize(value: &str) -> Option<String> {
    let normalized = value.trim().to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

fn slugify(value: &str) -> Option<String> {
    let slug: String = value.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    (!slug.is_empty()).then_some(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn model(label: &str, code: Option<&str>, version: Option<&str>, longitudinal: bool) -> DataModel {
        DataModel {
            uuid: Uuid::nil(),
            label: label.to_string(),
            code: code.map(String::from),
            version: version.map(String::from),
            longitudinal,
            released: true,
            variables: vec![],
            groups: vec![],
        }
    }

    #[test]
    fn test_categorize_splits_by_design() {
        let split = categorize(vec![
            model("A", None, None, false),
            model("B", None, None, true),
            model("C", None, None, false),
        ]);
        assert_eq!(split.cross_sectional.len(), 2);
        assert_eq!(split.longitudinal.len(), 1);
    }

    #[test]
    fn test_no_query_falls_back_to_first_cross_sectional() {
        let split = categorize(vec![
            model("Long", None, None, true),
            model("Cross", None, None, false),
        ]);
        let picked = pick_selection(&split, None, false).unwrap();
        assert_eq!(picked.label, "Cross");
    }

    #[test]
    fn test_slug_match_ignores_punctuation_and_case() {
        let split = categorize(vec![
            model("Dementia v0.5", Some("dementia"), Some("v0.5"), false),
            model("Stroke", Some("stroke"), Some("v1.0"), false),
        ]);
        let picked = pick_selection(&split, Some("Dementia V0.5"), false).unwrap();
        assert_eq!(picked.code.as_deref(), Some("dementia"));
    }

    #[test]
    fn test_latest_picks_highest_version_among_matches() {
        let split = categorize(vec![
            model("Dementia", Some("dementia"), Some("v0.9"), false),
            model("Dementia", Some("dementia"), Some("v0.10"), false),
            model("Dementia", Some("dementia"), Some("v0.2"), false),
        ]);
        let picked = pick_selection(&split, Some("dementia"), true).unwrap();
        assert_eq!(picked.version.as_deref(), Some("v0.10"));
    }

    #[test]
    fn test_unmatched_query_falls_back() {
        let split = categorize(vec![model("Only", None, None, false)]);
        let picked = pick_selection(&split, Some("nope"), false).unwrap();
        assert_eq!(picked.label, "Only");
    }

    #[test]
    fn test_version_comparison_rules() {
        use Ordering::*;
        assert_eq!(compare_versions(Some("v1.2"), Some("v1.10")), Less);
        assert_eq!(compare_versions(Some("2.0"), Some("v2.0")), Equal);
        // Numeric tokens beat alphabetic ones.
        assert_eq!(compare_versions(Some("1.1"), Some("1.beta")), Greater);
        // Longer version with equal prefix sorts higher.
        assert_eq!(compare_versions(Some("1.0.1"), Some("1.0")), Greater);
        assert_eq!(compare_versions(None, Some("0.1")), Less);
    }
}
