use crate::config::SuggestionConfig;
use tracing::debug;

/// Find the stored clip name closest to a name that was not found
///
/// Performs case-insensitive Jaro-Winkler matching against `names`.
/// Returns the best candidate if similarity >= threshold, otherwise `None`.
/// An exact (case-sensitive) match is never suggested: the caller already
/// looked it up and missed.
///
/// # Performance
/// Linear in the number of stored clips; fine for a personal collection.
pub fn closest_clip<'a>(
    requested: &str,
    names: &'a [String],
    config: &SuggestionConfig,
) -> Option<&'a str> {
    if !config.enabled || names.is_empty() || requested.is_empty() {
        return None;
    }

    let normalized_requested = requested.to_lowercase();
    let mut best_match: Option<(&str, f64)> = None;

    for name in names {
        if name == requested {
            continue;
        }

        let similarity = strsim::jaro_winkler(&normalized_requested, &name.to_lowercase());

        debug!(
            candidate = name.as_str(),
            similarity = %similarity,
            threshold = %config.threshold,
            "suggestion check"
        );

        if similarity >= config.threshold {
            if let Some((_, best_score)) = best_match {
                if similarity > best_score {
                    best_match = Some((name.as_str(), similarity));
                }
            } else {
                best_match = Some((name.as_str(), similarity));
            }
        }
    }

    best_match.map(|(name, score)| {
        debug!(requested, suggestion = name, similarity = %score, "suggesting clip");
        name
    })
}
