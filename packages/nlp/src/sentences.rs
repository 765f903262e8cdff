//! Rule-based sentence segmentation.
//!
//! A sentence ends after terminal punctuation (`.`, `!`, `?`, plus any
//! closing quotes or brackets) that is followed by whitespace or the end
//! of the text, or at a blank line. Single line breaks do not end a
//! sentence, so wrapped PDF lines stay together.

/// Lazily splits a text into sentence spans.
///
/// Each span is a trimmed, non-empty substring of the input.
#[derive(Debug, Clone)]
pub struct SentenceSpans<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> SentenceSpans<'a> {
    /// Creates a segmenter positioned at the start of `text`.
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Byte offset one past the end of the sentence starting at `from`.
    fn sentence_end(&self, from: usize) -> usize {
        let rest = &self.text[from..];
        let mut chars = rest.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                '.' | '!' | '?' => {
                    let mut end = i + c.len_utf8();
                    while let Some(&(j, next)) = chars.peek() {
                        if is_terminal(next) || is_closing(next) {
                            end = j + next.len_utf8();
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    match chars.peek() {
                        None => return self.text.len(),
                        Some(&(_, next)) if next.is_whitespace() => return from + end,
                        Some(_) => {}
                    }
                }
                '\n' if starts_with_blank_line(&rest[i + 1..]) => return from + i,
                _ => {}
            }
        }

        self.text.len()
    }
}

impl<'a> Iterator for SentenceSpans<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let start = self.pos;
            let end = self.sentence_end(start);
            // A blank-line boundary returns the newline's own offset; step
            // past it so the scan always makes progress.
            self.pos = if end == start { start + 1 } else { end };

            let span = self.text[start..end].trim();
            if !span.is_empty() {
                return Some(span);
            }
        }
        None
    }
}

const fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

const fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}

/// Whether `rest` (the text after a newline) begins with another newline,
/// ignoring horizontal whitespace.
fn starts_with_blank_line(rest: &str) -> bool {
    rest.trim_start_matches([' ', '\t', '\r']).starts_with('\n')
}
