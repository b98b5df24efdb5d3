use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::{Result, ScrapeError};
use crate::types::ScrapedTable;

/// Header text of the leading rank column
const RANK_HEADER: &str = "Rk";

/// Row classes the site uses for header rows repeated inside `tbody`
const REPEATED_HEADER_CLASSES: [&str; 2] = ["thead", "over_header"];

/// Parse the per-game statistics table out of a season document
///
/// The rank column is dropped so that header positions line up with the
/// `td` cells of each player row. Rows with fewer cells than headers are
/// padded with empty strings; more cells than headers means the layout has
/// changed and is rejected.
pub fn parse_per_game_table(
    html: &str,
    table_id: &str,
    season: u16,
    source_url: &str,
) -> Result<ScrapedTable> {
    let document = Html::parse_document(html);

    let table_selector = selector(&format!("table#{table_id}"))?;
    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| ScrapeError::parse(format!("Could not find table #{table_id}")))?;

    let headers = extract_headers(&table)?;
    let rows = extract_rows(&table, headers.len())?;

    let mut scraped = ScrapedTable::new(season, source_url);
    scraped.headers = headers;
    scraped.rows = rows;

    if scraped.is_empty() {
        return Err(ScrapeError::parse(format!("Table #{table_id} contains no player rows")));
    }

    Ok(scraped)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ScrapeError::parse(format!("Failed to create selector '{css}': {e}")))
}

/// Extract header abbreviations from the last header row of `thead`
fn extract_headers(table: &ElementRef) -> Result<Vec<String>> {
    let header_row_selector = selector("thead tr")?;
    let th_selector = selector("th")?;

    // Some tables carry an extra grouping row above the real header row
    let header_row = table
        .select(&header_row_selector)
        .last()
        .ok_or_else(|| ScrapeError::parse("Could not find header row"))?;

    let mut headers: Vec<String> = header_row.select(&th_selector).map(|th| cell_text(&th)).collect();

    if headers.first().map(String::as_str) == Some(RANK_HEADER) {
        headers.remove(0);
    }

    if headers.is_empty() {
        return Err(ScrapeError::parse("Header row has no columns"));
    }

    debug!("Extracted headers: {:?}", headers);
    Ok(headers)
}

/// Extract one list of cell strings per player row of `tbody`
fn extract_rows(table: &ElementRef, width: usize) -> Result<Vec<Vec<String>>> {
    let row_selector = selector("tbody tr")?;
    let td_selector = selector("td")?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (row_index, row) in table.select(&row_selector).enumerate() {
        if is_repeated_header(&row) {
            skipped += 1;
            continue;
        }

        let mut cells: Vec<String> = row.select(&td_selector).map(|td| cell_text(&td)).collect();

        if cells.is_empty() {
            skipped += 1;
            continue;
        }

        if cells.len() > width {
            return Err(ScrapeError::parse(format!(
                "Row {row_index} has {} cells but the header has {width} columns",
                cells.len()
            )));
        }

        if cells.len() < width {
            warn!(
                "Row {} has {} of {} cells, padding with empty values",
                row_index,
                cells.len(),
                width
            );
            cells.resize(width, String::new());
        }

        rows.push(cells);
    }

    debug!("Extracted {} player rows, skipped {} header rows", rows.len(), skipped);
    Ok(rows)
}

fn is_repeated_header(row: &ElementRef) -> bool {
    row.value()
        .attr("class")
        .map(|classes| {
            classes.split_whitespace().any(|class| REPEATED_HEADER_CLASSES.contains(&class))
        })
        .unwrap_or(false)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
