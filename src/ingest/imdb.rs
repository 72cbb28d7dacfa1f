use std::collections::HashMap;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};

use crate::{
    error::{AppError, AppResult},
    models::{ContentCatalog, ContentMetadata},
};

/// IMDb's null marker
const NULL_MARKER: &str = "\\N";
const TYPE_FILTER: [&str; 2] = ["movie", "tvSeries"];

const RATING_COLUMNS: [&str; 3] = ["tconst", "averageRating", "numVotes"];
const BASICS_COLUMNS: [&str; 5] = ["tconst", "titleType", "primaryTitle", "startYear", "genres"];

/// Reads a field, mapping the null marker to `None`
fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok((value != NULL_MARKER).then_some(value))
}

#[derive(Debug, Deserialize)]
struct RatingRecord {
    #[serde(deserialize_with = "nullable")]
    tconst: Option<String>,
    #[serde(rename = "averageRating", deserialize_with = "nullable")]
    average_rating: Option<String>,
    #[serde(rename = "numVotes", deserialize_with = "nullable")]
    num_votes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BasicsRecord {
    #[serde(deserialize_with = "nullable")]
    tconst: Option<String>,
    #[serde(rename = "titleType", deserialize_with = "nullable")]
    title_type: Option<String>,
    #[serde(rename = "primaryTitle", deserialize_with = "nullable")]
    primary_title: Option<String>,
    #[serde(rename = "startYear", deserialize_with = "nullable")]
    start_year: Option<String>,
    #[serde(deserialize_with = "nullable")]
    genres: Option<String>,
}

fn csv_error(origin: &str, err: csv::Error) -> AppError {
    let line = err.position().map_or(0, |p| p.line() as usize);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => AppError::Io(e),
        _ => AppError::parse(origin, line, message),
    }
}

/// Streams the rows of a tab-separated IMDb table into `f`
///
/// IMDb does not quote fields, so quote characters are kept as data. Every
/// column in `required` must appear in the header row.
fn for_each_record<R, T, F>(origin: &str, input: R, required: &[&str], mut f: F) -> AppResult<()>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut(T, usize) -> AppResult<()>,
{
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| csv_error(origin, e))?
        .clone();
    if let Some(missing) = required.iter().find(|name| !headers.iter().any(|h| h == **name)) {
        return Err(AppError::parse(
            origin,
            1,
            format!("missing column '{}'", missing),
        ));
    }

    let mut record = StringRecord::new();
    while reader
        .read_record(&mut record)
        .map_err(|e| csv_error(origin, e))?
    {
        let line = record.position().map_or(0, |p| p.line() as usize);
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| csv_error(origin, e))?;
        f(row, line)?;
    }
    Ok(())
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    name: &str,
    origin: &str,
    line: usize,
) -> AppResult<T> {
    value
        .parse()
        .map_err(|_| AppError::parse(origin, line, format!("invalid {} '{}'", name, value)))
}

/// Joins IMDb `title.basics` and `title.ratings` into the discovery catalog
///
/// Keeps movies and TV series, attaches ratings by title id and drops every
/// row where any used column is the null marker or has no rating. Row order
/// follows the basics table.
pub fn load_imdb_catalog<B: Read, R: Read>(basics: B, ratings: R) -> AppResult<ContentCatalog> {
    let mut rating_by_id: HashMap<String, (f64, u64)> = HashMap::new();
    for_each_record(
        "title.ratings",
        ratings,
        &RATING_COLUMNS,
        |row: RatingRecord, line| {
            let (Some(id), Some(avg), Some(votes)) =
                (row.tconst, row.average_rating, row.num_votes)
            else {
                return Ok(());
            };
            let avg = parse_field::<f64>(&avg, "averageRating", "title.ratings", line)?;
            let votes = parse_field::<u64>(&votes, "numVotes", "title.ratings", line)?;
            rating_by_id.insert(id, (avg, votes));
            Ok(())
        },
    )?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for_each_record(
        "title.basics",
        basics,
        &BASICS_COLUMNS,
        |row: BasicsRecord, line| {
            let Some(content_type) = row.title_type else {
                return Ok(());
            };
            if !TYPE_FILTER.contains(&content_type.as_str()) {
                return Ok(());
            }

            let (Some(id), Some(title), Some(year), Some(genres)) =
                (row.tconst, row.primary_title, row.start_year, row.genres)
            else {
                dropped += 1;
                return Ok(());
            };
            let Some(&(average_rating, num_votes)) = rating_by_id.get(&id) else {
                dropped += 1;
                return Ok(());
            };

            rows.push(ContentMetadata::new(
                id,
                content_type,
                title,
                parse_field::<i32>(&year, "startYear", "title.basics", line)?,
                genres,
                average_rating,
                num_votes,
            ));
            Ok(())
        },
    )?;

    tracing::info!(rows = rows.len(), dropped, "Loaded IMDb catalog");

    Ok(ContentCatalog::new(rows))
}
