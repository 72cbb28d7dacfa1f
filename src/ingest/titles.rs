use std::io::BufRead;

use encoding_rs::ISO_8859_2;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogEntry, ItemId},
};

/// Parses the raw `<id>,<year>,<title>` movie title table
///
/// Only the first two commas split fields; commas inside the title are
/// removed. The file is ISO-8859-2 encoded.
pub fn parse_title_table<R: BufRead>(origin: &str, mut reader: R) -> AppResult<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let (line, _) = ISO_8859_2.decode_without_bom_handling(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }

        entries.push(parse_title_line(line).map_err(|msg| AppError::parse(origin, line_no, msg))?);
    }

    tracing::info!(origin = %origin, titles = entries.len(), "Parsed title table");
    Ok(entries)
}

fn parse_title_line(line: &str) -> Result<CatalogEntry, String> {
    let mut fields = line.splitn(3, ',');
    let (Some(id), Some(year), Some(title)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(format!("expected '<id>,<year>,<title>', got '{}'", line));
    };

    let item_id = id
        .trim()
        .parse::<ItemId>()
        .map_err(|_| format!("invalid item id '{}'", id))?;

    Ok(CatalogEntry::new(item_id, year, title.replace(',', "")))
}
