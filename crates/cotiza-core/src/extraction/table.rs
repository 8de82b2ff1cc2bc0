use crate::config::TableSettings;
use crate::error::CotizaError;
use crate::extraction::PageContent;
use crate::model::Column;
use crate::parsing::totals::is_totals_line;

/// Reconstruct the quotation table from pdftotext -layout output.
///
/// pdftotext -layout keeps column alignment with runs of spaces. The header
/// line fixes the column spans; every following line is cut into segments
/// and each segment lands in the column it overlaps most.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGrid {
    pub page_number: usize,
    /// Row 0 is the header row.
    pub rows: Vec<Vec<String>>,
}

impl RawGrid {
    pub fn header(&self) -> &[String] {
        self.rows.first().map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// Return the first table of the first page that has one.
///
/// Only the first table on that page is used, even if the page holds more.
pub fn extract_first_table(
    pages: &[PageContent],
    settings: &TableSettings,
) -> Result<RawGrid, CotizaError> {
    for page in pages {
        if let Some(grid) = find_tables(page, settings).into_iter().next() {
            tracing::debug!(
                page = grid.page_number,
                columns = grid.header().len(),
                rows = grid.data_rows().len(),
                "table found"
            );
            return Ok(grid);
        }
    }
    Err(CotizaError::NoTableFound)
}

/// Find every table on a page, in reading order.
pub fn find_tables(page: &PageContent, settings: &TableSettings) -> Vec<RawGrid> {
    let mut tables = Vec::new();
    let mut current: Option<TableBuilder> = None;
    let mut blank_run = 0;

    for line in &page.lines {
        if let Some(header) = header_spans(line, settings) {
            if let Some(done) = current.take() {
                tables.extend(done.finish(page.page_number));
            }
            current = Some(TableBuilder::new(header));
            blank_run = 0;
            continue;
        }

        let Some(builder) = current.as_mut() else {
            continue;
        };

        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run >= settings.max_blank_lines.max(1) {
                if let Some(done) = current.take() {
                    tables.extend(done.finish(page.page_number));
                }
            }
            continue;
        }
        blank_run = 0;

        if is_totals_line(line) {
            if let Some(done) = current.take() {
                tables.extend(done.finish(page.page_number));
            }
            continue;
        }

        let segments = split_segments(line, settings.column_gap);
        builder.push_line(&segments);
    }

    if let Some(done) = current.take() {
        tables.extend(done.finish(page.page_number));
    }

    tables
}

#[derive(Debug, Clone)]
struct ColumnSpan {
    start: usize,
    end: usize,
    text: String,
    column: Option<Column>,
}

struct TableBuilder {
    header: Vec<ColumnSpan>,
    rows: Vec<Vec<String>>,
}

impl TableBuilder {
    fn new(header: Vec<ColumnSpan>) -> Self {
        TableBuilder {
            header,
            rows: Vec::new(),
        }
    }

    fn push_line(&mut self, segments: &[Segment<'_>]) {
        let mut cells = vec![String::new(); self.header.len()];
        for seg in segments {
            let idx = best_column(seg, &self.header);
            if !cells[idx].is_empty() {
                cells[idx].push(' ');
            }
            cells[idx].push_str(seg.text);
        }

        // A line with text only in the description columns is a soft wrap
        // of the row above it. The fragment joins with a space so the cell
        // stays on one line for the normalizer.
        let wraps_previous = cells.iter().zip(&self.header).all(|(cell, span)| {
            cell.is_empty() || span.column.is_some_and(|c| c.is_text())
        });

        match self.rows.last_mut() {
            Some(prev) if wraps_previous => {
                for (prev_cell, cell) in prev.iter_mut().zip(cells) {
                    if cell.is_empty() {
                        continue;
                    }
                    if !prev_cell.is_empty() {
                        prev_cell.push(' ');
                    }
                    prev_cell.push_str(&cell);
                }
            }
            _ => self.rows.push(cells),
        }
    }

    fn finish(self, page_number: usize) -> Option<RawGrid> {
        if self.rows.is_empty() {
            return None;
        }
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        rows.push(self.header.into_iter().map(|s| s.text).collect());
        rows.extend(self.rows);
        Some(RawGrid { page_number, rows })
    }
}

/// Detect a table header line and return its column spans.
fn header_spans(line: &str, settings: &TableSettings) -> Option<Vec<ColumnSpan>> {
    let spans: Vec<ColumnSpan> = split_segments(line, settings.column_gap)
        .into_iter()
        .map(|s| ColumnSpan {
            start: s.start,
            end: s.end,
            text: s.text.to_string(),
            column: Column::from_header(s.text),
        })
        .collect();
    let known = spans.iter().filter(|s| s.column.is_some()).count();
    if known >= settings.min_header_columns.max(1) {
        Some(spans)
    } else {
        None
    }
}

/// Index of the header column a segment belongs to.
///
/// Largest character overlap wins; with no overlap, the column whose centre
/// is nearest.
fn best_column(seg: &Segment<'_>, header: &[ColumnSpan]) -> usize {
    let overlap = |h: &ColumnSpan| seg.end.min(h.end) as isize - seg.start.max(h.start) as isize;

    let best_overlap = header
        .iter()
        .enumerate()
        .map(|(i, h)| (i, overlap(h)))
        .filter(|(_, o)| *o > 0)
        .max_by_key(|(i, o)| (*o, std::cmp::Reverse(*i)));

    if let Some((i, _)) = best_overlap {
        return i;
    }

    // Doubled centres keep the comparison in integers.
    let centre = (seg.start + seg.end) as isize;
    header
        .iter()
        .enumerate()
        .min_by_key(|(_, h)| (centre - (h.start + h.end) as isize).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// A run of text on a layout line, with character (not byte) positions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

/// Split a line on gaps of at least `gap` whitespace characters.
fn split_segments(line: &str, gap: usize) -> Vec<Segment<'_>> {
    let gap = gap.max(1);
    let mut segments = Vec::new();
    // (byte offset, char offset) of the open segment's first char
    let mut start: Option<(usize, usize)> = None;
    // (byte offset, char offset) just past the last non-space char
    let mut last_end = (0, 0);
    let mut space_count = 0;

    for (col, (i, c)) in line.char_indices().enumerate() {
        if c.is_whitespace() {
            space_count += 1;
            if space_count == gap {
                if let Some((sb, sc)) = start.take() {
                    segments.push(Segment {
                        start: sc,
                        end: last_end.1,
                        text: &line[sb..last_end.0],
                    });
                }
            }
        } else {
            if start.is_none() {
                start = Some((i, col));
            }
            space_count = 0;
            last_end = (i + c.len_utf8(), col + 1);
        }
    }

    if let Some((sb, sc)) = start {
        segments.push(Segment {
            start: sc,
            end: last_end.1,
            text: &line[sb..last_end.0],
        });
    }

    segments
}
