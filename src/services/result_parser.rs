use scraper::{ElementRef, Html, Selector};

use crate::domain::result_record::ResultRecord;

pub const RESULTS_TABLE_SELECTOR: &str = "table.GridView";

/// Extracts one record per data row of the results grid.
///
/// The first row is the header. Rows with fewer than two cells are ignored.
/// Cell 0 holds the view link, cell 1 the filer's name and cell 2 (optional)
/// the position.
pub fn parse_results(html: &str) -> Vec<ResultRecord> {
    let row_selector = Selector::parse(&format!("{} tr", RESULTS_TABLE_SELECTOR)).unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let a_tag_selector = Selector::parse("a").unwrap();

    let html_document = Html::parse_document(html);

    html_document
        .select(&row_selector)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            if cells.len() < 2 {
                return None;
            }

            let name = cell_text(&cells[1]);
            let position = cells.get(2).map(cell_text).unwrap_or_default();
            let retrieval_trigger = cells[0]
                .select(&a_tag_selector)
                .next()
                .and_then(|a_tag| a_tag.value().attr("href"))
                .map(|href| href.to_string());

            Some(ResultRecord {
                name,
                position,
                retrieval_trigger,
            })
        })
        .collect()
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
