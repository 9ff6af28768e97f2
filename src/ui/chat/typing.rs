//! Word-by-word reveal of a finished reply

/// Shown after the partial text while the reply is being typed out
pub const CURSOR: &str = "▌";

/// Iterator over growing prefixes of a reply, one word at a time
///
/// Each frame ends at a word boundary followed by [`CURSOR`]. Original
/// whitespace, newlines included, is kept so Markdown renders the same while
/// typing as it does once finished.
pub struct TypingFrames<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TypingFrames<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl Iterator for TypingFrames<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let rest = &self.text[self.pos..];
        let word_start = rest.len() - rest.trim_start().len();
        if word_start == rest.len() {
            return None;
        }

        let word_len = rest[word_start..]
            .find(char::is_whitespace)
            .unwrap_or(rest.len() - word_start);
        self.pos += word_start + word_len;

        Some(format!("{}{CURSOR}", &self.text[..self.pos]))
    }
}

pub fn typing_frames(text: &str) -> TypingFrames<'_> {
    TypingFrames::new(text)
}
