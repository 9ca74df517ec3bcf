//! Plain-text page output

use std::io::Write;

use datagrid_lib::Grid;
use datagrid_lib::grid::PaginationInfo;

/// Writes the column header, the rows of the current page as tab-separated
/// text and a pagination summary.
pub fn render<W: Write>(grid: &Grid, out: &mut W) -> std::io::Result<()> {
    let columns = grid.columns();
    let view = grid.view();

    let header: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    writeln!(out, "{}", header.join("\t"))?;

    for row in view.page_rows() {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| row.value(&c.key).display_string().unwrap_or_default())
            .map(|cell| cell.replace(['\t', '\n'], " "))
            .collect();
        writeln!(out, "{}", cells.join("\t"))?;
    }

    writeln!(out, "{}", summary(&view.pagination()))
}

fn summary(info: &PaginationInfo) -> String {
    let mut line = format!(
        "Showing {}-{} of {} (page {} of {})",
        info.start, info.end, info.total_records, info.current_page, info.total_pages
    );
    if info.has_next {
        line.push_str(", more available");
    }
    line
}
