use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, TitleCatalog},
    store::RecommendationStore,
};

/// Number of neighbors shown for a selected title
pub const DEFAULT_TOP_N: usize = 10;

/// Converts a cosine score to a whole match percentage
///
/// Rounds to two decimals first and then to a whole percent, half to even at
/// both steps.
pub fn match_percent(score: f64) -> u8 {
    let two_decimals = (score * 100.0).round_ties_even() / 100.0;
    (two_decimals * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
}

/// Recommends titles similar to the one named by `selector`
///
/// `selector` is a display key (`"<title> - <year>"`). The result keeps the
/// store's ranking; neighbors missing from the title catalog are skipped.
pub fn recommend(
    titles: &TitleCatalog,
    store: &RecommendationStore,
    selector: &str,
    top_n: usize,
) -> AppResult<Vec<Recommendation>> {
    let item_id = titles
        .resolve(selector)
        .ok_or_else(|| AppError::NotFound(format!("No title matches '{}'", selector)))?;

    let row = store.get(item_id).ok_or_else(|| {
        AppError::NotFound(format!("No recommendations for '{}'", selector))
    })?;

    let recommendations: Vec<Recommendation> = row
        .top(top_n)
        .filter_map(|(neighbor, score)| match titles.get(neighbor) {
            Some(entry) => Some(Recommendation {
                year: entry.year,
                title: entry.title.clone(),
                match_percent: match_percent(score),
            }),
            None => {
                tracing::debug!(item_id = neighbor, "Neighbor missing from title catalog");
                None
            }
        })
        .collect();

    tracing::debug!(
        selector = %selector,
        item_id,
        results = recommendations.len(),
        "Resolved recommendations"
    );

    Ok(recommendations)
}
