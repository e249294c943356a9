/// How far back from the size limit the splitter will look for
/// whitespace before giving up and cutting mid-word.
const BREAK_SEARCH_WINDOW: usize = 50;

#[derive(Debug, Clone)]
pub struct OverlapSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for OverlapSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl OverlapSplitter {
    /// `chunk_overlap` is clamped below `chunk_size` so every step makes
    /// forward progress.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Splits `text` into chunks of at most `chunk_size` characters,
    /// consecutive chunks sharing `chunk_overlap` characters of source
    /// text. Splits prefer whitespace near the limit and fall back to a
    /// hard cut at a character boundary, so the result is UTF-8 safe for
    /// CJK and emoji input.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let hard_end = (start + self.chunk_size).min(chars.len());
            let end = if hard_end == chars.len() {
                hard_end
            } else {
                self.natural_break(&chars, start, hard_end)
            };

            chunks.push(chars[start..end].iter().collect());

            if end == chars.len() {
                break;
            }

            start = end - self.chunk_overlap;
        }

        chunks
    }

    /// Looks back from `hard_end` for the last whitespace inside the
    /// search window; the break lands just after it. A break that would
    /// not advance past the overlap region is discarded.
    fn natural_break(&self, chars: &[char], start: usize, hard_end: usize) -> usize {
        let window_start = hard_end.saturating_sub(BREAK_SEARCH_WINDOW).max(start);

        let soft_end = chars[window_start..hard_end]
            .iter()
            .rposition(|c| c.is_whitespace())
            .map(|i| window_start + i + 1);

        match soft_end {
            Some(end) if end > start + self.chunk_overlap => end,
            _ => hard_end,
        }
    }
}
