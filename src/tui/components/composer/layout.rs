//! Row layout and cursor tracking for the composer.
//!
//! The draft is hard-wrapped by display width into [`Row`]s (byte ranges
//! into the buffer). Rendering, cursor placement and vertical movement all
//! read the same row table, so what is drawn is exactly what the cursor
//! walks over.

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthChar;

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Maximum visible content lines before internal scrolling kicks in
pub(super) const MAX_VISIBLE_LINES: u16 = 6;
/// Offset from area edge to first content column (border + padding)
const CONTENT_OFFSET_X: u16 = 2;
/// Offset from area edge to first content row (border)
const CONTENT_OFFSET_Y: u16 = 1;

/// One visual row of the draft: `buffer[start..end]`, never containing `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Row {
    pub start: usize,
    pub end: usize,
}

/// Inner content width of a composer box `box_width` columns wide.
pub(super) fn inner_width(box_width: u16) -> u16 {
    box_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Split `text` into rows no wider than `width` display columns.
/// Always returns at least one row.
pub(super) fn layout_rows(text: &str, width: u16) -> Vec<Row> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut line_start = 0;

    for line in text.split('\n') {
        let mut row_start = line_start;
        let mut used = 0;
        for (offset, c) in line.char_indices() {
            let w = char_width(c);
            if used + w > width && used > 0 {
                rows.push(Row {
                    start: row_start,
                    end: line_start + offset,
                });
                row_start = line_start + offset;
                used = 0;
            }
            used += w;
        }
        rows.push(Row {
            start: row_start,
            end: line_start + line.len(),
        });
        line_start += line.len() + 1;
    }

    rows
}

/// Find the byte offset of the previous character boundary before `pos` in `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}

/// Cursor byte offset plus the first visible row.
pub(super) struct CursorState {
    /// Byte offset in the buffer (0..=buffer.len()), always on a char boundary
    pub pos: usize,
    /// First visible row when the draft is taller than the box
    pub scroll_offset: usize,
    /// Inner width from the last render (used for vertical movement)
    pub last_width: u16,
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 76;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_width: Self::DEFAULT_WIDTH,
        }
    }

    /// Reset after the draft was cleared.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll_offset = 0;
    }

    /// Index of the row holding the cursor. At a soft-wrap boundary the
    /// cursor belongs to the following row.
    pub fn row_index(&self, rows: &[Row]) -> usize {
        rows.iter()
            .rposition(|row| row.start <= self.pos)
            .unwrap_or(0)
    }

    /// Move one row up (`-1`) or down (`1`), keeping the display column.
    /// Returns `false` at the first/last row.
    pub fn move_vertically(&mut self, buffer: &str, direction: i8) -> bool {
        let rows = layout_rows(buffer, self.last_width);
        let current = self.row_index(&rows);
        let target = match direction {
            d if d < 0 && current > 0 => current - 1,
            d if d > 0 && current + 1 < rows.len() => current + 1,
            _ => return false,
        };

        let column = str_width(&buffer[rows[current].start..self.pos]);
        let row = rows[target];
        let mut pos = row.start;
        let mut used = 0;
        for (offset, c) in buffer[row.start..row.end].char_indices() {
            let w = char_width(c);
            if used + w > column {
                break;
            }
            used += w;
            pos = row.start + offset + c.len_utf8();
        }
        self.pos = pos;
        true
    }

    /// Keep the cursor row inside the visible window.
    pub fn update_scroll_offset(&mut self, rows: &[Row]) {
        let visible = usize::from(MAX_VISIBLE_LINES);
        if rows.len() <= visible {
            self.scroll_offset = 0;
            return;
        }
        let current = self.row_index(rows);
        if current < self.scroll_offset {
            self.scroll_offset = current;
        } else if current >= self.scroll_offset + visible {
            self.scroll_offset = current + 1 - visible;
        }
        self.scroll_offset = self.scroll_offset.min(rows.len() - visible);
    }

    /// Screen position (column, row) of the cursor inside a composer box at `area`.
    pub fn screen_pos(&self, buffer: &str, rows: &[Row], area: Rect) -> (u16, u16) {
        let current = self.row_index(rows);
        let column = rows
            .get(current)
            .map(|row| str_width(&buffer[row.start..self.pos]))
            .unwrap_or(0);
        let visible_row = current.saturating_sub(self.scroll_offset);

        let x = area.x + CONTENT_OFFSET_X + column as u16;
        let y = area.y + CONTENT_OFFSET_Y + visible_row as u16;
        let max_x = (area.x + area.width).saturating_sub(CONTENT_OFFSET_X);
        (x.min(max_x), y)
    }
}
