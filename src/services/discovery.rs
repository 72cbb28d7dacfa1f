use std::cmp::Ordering;

use crate::models::{ContentCatalog, ContentMetadata, FilterCategory};

/// Number of titles shown by attribute discovery
pub const DEFAULT_TOP_N: usize = 10;

/// Filters the catalog by type, genre and year and ranks by weighted score
///
/// The type filter always applies and matches as a substring. The genre
/// filter applies only when `Genre` is active and a non-empty genre is given;
/// it matches as a substring of the comma-joined genre list, so "Rom" keeps
/// "Action,Romance". The year filter
/// applies only when `Year` is active and a year is given. Ties in weighted
/// score keep catalog order.
pub fn filter_and_rank<'a>(
    catalog: &'a ContentCatalog,
    content_type: &str,
    active: &[FilterCategory],
    year: Option<i32>,
    genre: Option<&str>,
    top_n: usize,
) -> Vec<&'a ContentMetadata> {
    let genre = genre
        .filter(|g| !g.is_empty())
        .filter(|_| active.contains(&FilterCategory::Genre));
    let year = year.filter(|_| active.contains(&FilterCategory::Year));

    let mut matches: Vec<(usize, &ContentMetadata)> = catalog
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.content_type.contains(content_type))
        .filter(|(_, row)| genre.map_or(true, |g| row.genres.contains(g)))
        .filter(|(_, row)| year.map_or(true, |y| row.year == y))
        .collect();

    let by_score = |a: &(usize, &ContentMetadata), b: &(usize, &ContentMetadata)| -> Ordering {
        b.1.weighted_score
            .total_cmp(&a.1.weighted_score)
            .then(a.0.cmp(&b.0))
    };

    if matches.len() > top_n {
        matches.select_nth_unstable_by(top_n, by_score);
        matches.truncate(top_n);
    }
    matches.sort_unstable_by(by_score);

    tracing::debug!(
        content_type = %content_type,
        genre = ?genre,
        year = ?year,
        results = matches.len(),
        "Filtered catalog"
    );

    matches.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, content_type: &str, genres: &str, year: i32, votes: u64) -> ContentMetadata {
        ContentMetadata::new(
            id.to_string(),
            content_type.to_string(),
            format!("Title {}", id),
            year,
            genres.to_string(),
            1.0,
            votes,
        )
    }

    fn ids<'a>(rows: &[&'a ContentMetadata]) -> Vec<&'a str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_no_filters_returns_top_ten_by_weighted_score() {
        let catalog = ContentCatalog::new(
            (1..=11)
                .map(|score| row(&score.to_string(), "Movie", "Drama", 2000, score))
                .collect(),
        );

        let result = filter_and_rank(&catalog, "Movie", &[], None, None, DEFAULT_TOP_N);

        assert_eq!(result.len(), 10);
        assert_eq!(
            ids(&result),
            vec!["11", "10", "9", "8", "7", "6", "5", "4", "3", "2"]
        );
    }

    #[test]
    fn test_genre_filter_is_substring_match() {
        let catalog = ContentCatalog::new(vec![
            row("a", "Movie", "Action,Romance", 2000, 4),
            row("b", "Movie", "Comedy", 2000, 3),
            row("c", "Movie", "Comedy", 2000, 2),
            row("d", "Movie", "Romance", 2000, 1),
        ]);

        let result = filter_and_rank(
            &catalog,
            "Movie",
            &[FilterCategory::Genre],
            None,
            Some("Comedy"),
            DEFAULT_TOP_N,
        );
        assert_eq!(ids(&result), vec!["b", "c"]);

        let result = filter_and_rank(
            &catalog,
            "Movie",
            &[FilterCategory::Genre],
            None,
            Some("Rom"),
            DEFAULT_TOP_N,
        );
        assert_eq!(ids(&result), vec!["a", "d"]);
    }

    #[test]
    fn test_inactive_category_ignores_value() {
        let catalog = ContentCatalog::new(vec![
            row("a", "movie", "Drama", 1999, 2),
            row("b", "movie", "Comedy", 2001, 1),
        ]);

        let result = filter_and_rank(&catalog, "movie", &[], Some(1999), Some("Comedy"), 10);
        assert_eq!(ids(&result), vec!["a", "b"]);

        let result = filter_and_rank(&catalog, "movie", &[FilterCategory::Year], Some(2001), None, 10);
        assert_eq!(ids(&result), vec!["b"]);
    }

    #[test]
    fn test_type_filter_is_substring_match() {
        let catalog = ContentCatalog::new(vec![
            row("a", "movie", "Drama", 2000, 1),
            row("b", "tvSeries", "Drama", 2000, 2),
            row("c", "tvMiniSeries", "Drama", 2000, 3),
        ]);

        assert_eq!(ids(&filter_and_rank(&catalog, "Series", &[], None, None, 10)), vec!["c", "b"]);
        assert_eq!(ids(&filter_and_rank(&catalog, "movie", &[], None, None, 10)), vec!["a"]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = ContentCatalog::new(
            ["x", "y", "z", "w"]
                .iter()
                .map(|id| row(id, "movie", "Drama", 2000, 5))
                .collect(),
        );
        let result = filter_and_rank(&catalog, "movie", &[], None, None, 3);
        assert_eq!(ids(&result), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_empty_results_are_not_an_error() {
        let catalog = ContentCatalog::new(vec![row("a", "movie", "Drama", 2000, 1)]);
        let result = filter_and_rank(
            &catalog,
            "movie",
            &[FilterCategory::Genre, FilterCategory::Year],
            Some(1950),
            Some("Horror"),
            10,
        );
        assert!(result.is_empty());
        assert!(filter_and_rank(&ContentCatalog::default(), "movie", &[], None, None, 10).is_empty());
    }
}
