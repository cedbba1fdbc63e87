//! Fixed-width text for the sign's secondary character display.

/// Characters per line on the character display.
pub const LINE_WIDTH: usize = 16;
/// Lines on the character display.
pub const LINE_COUNT: usize = 2;
/// Total characters in one status blob.
pub const STATUS_WIDTH: usize = LINE_WIDTH * LINE_COUNT;

/// Two lines of exactly [`LINE_WIDTH`] characters each.
///
/// Construction pads and truncates, so a `StatusText` is always exactly
/// [`STATUS_WIDTH`] characters when rendered and the display firmware never
/// sees a partial line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusText {
    lines: [String; LINE_COUNT],
}

impl StatusText {
    /// All spaces; shown when no task is active.
    pub fn blank() -> Self {
        StatusText {
            lines: [" ".repeat(LINE_WIDTH), " ".repeat(LINE_WIDTH)],
        }
    }

    /// Center each line into its fixed width, truncating overlong input.
    pub fn from_lines(top: &str, bottom: &str) -> Self {
        StatusText {
            lines: [center(top), center(bottom)],
        }
    }

    /// The conventional rotation card: title on top, attribution below.
    pub fn title_card(title: &str, artist: &str) -> Self {
        StatusText::from_lines(title, &format!("By: {artist}"))
    }

    pub fn top(&self) -> &str {
        &self.lines[0]
    }

    pub fn bottom(&self) -> &str {
        &self.lines[1]
    }

    /// Both lines joined into one [`STATUS_WIDTH`]-character string, the
    /// shape the display firmware consumes.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(STATUS_WIDTH);
        out.push_str(&self.lines[0]);
        out.push_str(&self.lines[1]);
        out
    }
}

/// Center `text` in [`LINE_WIDTH`] columns, odd leftover space going right.
fn center(text: &str) -> String {
    let trimmed: String = text.chars().take(LINE_WIDTH).collect();
    let len = trimmed.chars().count();
    let left = (LINE_WIDTH - len) / 2;
    let right = LINE_WIDTH - len - left;
    let mut out = String::with_capacity(LINE_WIDTH);
    out.extend(std::iter::repeat_n(' ', left));
    out.push_str(&trimmed);
    out.extend(std::iter::repeat_n(' ', right));
    out
}
