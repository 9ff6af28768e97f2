//! Stop-sequence detection for generated text
//!
//! Text arrives piece by piece from the sampler. A stop sequence can straddle
//! two pieces, so the matcher keeps the whole output and rescans only the
//! window a new piece could have completed.

/// Accumulates generated text and halts at the first stop sequence
#[derive(Debug)]
pub struct StopMatcher<'a> {
    stops: &'a [String],
    longest: usize,
    text: String,
    hit: Option<&'a str>,
}

impl<'a> StopMatcher<'a> {
    pub fn new(stops: &'a [String]) -> Self {
        let longest = stops.iter().map(String::len).max().unwrap_or(0);
        Self {
            stops,
            longest,
            text: String::new(),
            hit: None,
        }
    }

    /// Appends a piece of output. Returns true once a stop sequence is seen;
    /// the text is then truncated right before it and further pieces are ignored.
    pub fn push(&mut self, piece: &str) -> bool {
        if self.hit.is_some() {
            return true;
        }

        let old_len = self.text.len();
        self.text.push_str(piece);

        let mut from = old_len.saturating_sub(self.longest.saturating_sub(1));
        while !self.text.is_char_boundary(from) {
            from -= 1;
        }

        let earliest = self
            .stops
            .iter()
            .filter(|stop| !stop.is_empty())
            .filter_map(|stop| {
                self.text[from..]
                    .find(stop.as_str())
                    .map(|pos| (from + pos, stop.as_str()))
            })
            .min_by_key(|(pos, _)| *pos);

        if let Some((pos, stop)) = earliest {
            self.text.truncate(pos);
            self.hit = Some(stop);
            return true;
        }
        false
    }

    /// The stop sequence that ended generation, if any
    pub fn hit(&self) -> Option<&'a str> {
        self.hit
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Cuts `text` at the earliest occurrence of any stop sequence
pub fn truncate_at_stop<'t>(text: &'t str, stops: &[String]) -> &'t str {
    let cut = stops
        .iter()
        .filter(|stop| !stop.is_empty())
        .filter_map(|stop| text.find(stop.as_str()))
        .min()
        .unwrap_or(text.len());
    &text[..cut]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops() -> Vec<String> {
        ["###", "\n\n\n\n", "### Input:", "### Instruction:"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_no_stop() {
        let stops = stops();
        let mut matcher = StopMatcher::new(&stops);
        assert!(!matcher.push("Hello"));
        assert!(!matcher.push(", world"));
        assert_eq!(matcher.text(), "Hello, world");
        assert!(matcher.hit().is_none());
    }

    #[test]
    fn test_stop_split_across_pieces() {
        let stops = stops();
        let mut matcher = StopMatcher::new(&stops);
        assert!(!matcher.push("We build apps.\n#"));
        assert!(!matcher.push("#"));
        assert!(matcher.push("# Input: more"));
        assert_eq!(matcher.text(), "We build apps.\n");
        assert_eq!(matcher.hit(), Some("###"));
    }

    #[test]
    fn test_blank_line_run_stops() {
        let stops = stops();
        let mut matcher = StopMatcher::new(&stops);
        assert!(!matcher.push("Done.\n\n"));
        assert!(matcher.push("\n\nTrailing"));
        assert_eq!(matcher.into_text(), "Done.");
    }

    #[test]
    fn test_pieces_after_hit_are_ignored() {
        let stops = stops();
        let mut matcher = StopMatcher::new(&stops);
        assert!(matcher.push("a###b"));
        assert!(matcher.push("more text"));
        assert_eq!(matcher.text(), "a");
    }

    #[test]
    fn test_multibyte_before_stop() {
        let stops = stops();
        let mut matcher = StopMatcher::new(&stops);
        assert!(!matcher.push("Café ☕"));
        assert!(matcher.push("###"));
        assert_eq!(matcher.text(), "Café ☕");
    }

    #[test]
    fn test_truncate_at_stop() {
        let stops = stops();
        assert_eq!(truncate_at_stop("answer ### Input: x", &stops), "answer ");
        assert_eq!(truncate_at_stop("clean answer", &stops), "clean answer");
        assert_eq!(truncate_at_stop("a\n\n\n\nb###", &stops), "a");
    }
}
