//! Span buffers over a shared text buffer.
//!
//! A [`TokenBuilder`] records `(start, end)` byte offsets into the source text
//! instead of copying characters out of it. Loop fields accumulate one span per
//! row here while the tokenizer streams values, and the PDB translator uses the
//! same buffer for fixed-column records.

/// A growable list of byte spans into one source buffer.
///
/// Spans are stored flat as `[start0, end0, start1, end1, ...]`. Rows whose
/// value was quoted or semicolon-delimited are remembered separately, since
/// they are rare in real files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBuilder {
    indices: Vec<usize>,
    escaped: Vec<usize>,
}

impl TokenBuilder {
    /// Create an empty builder with room for `count` spans.
    pub fn with_capacity(count: usize) -> Self {
        Self {
            indices: Vec::with_capacity(2 * count),
            escaped: Vec::new(),
        }
    }

    /// Append an unescaped span.
    pub fn add(&mut self, start: usize, end: usize) {
        self.indices.push(start);
        self.indices.push(end);
    }

    /// Append a span, recording whether it came from a quoted or text-field value.
    pub fn add_token(&mut self, start: usize, end: usize, escaped: bool) {
        if escaped {
            self.escaped.push(self.count());
        }
        self.add(start, end);
    }

    /// Number of spans recorded so far.
    pub fn count(&self) -> usize {
        self.indices.len() / 2
    }

    /// Returns `true` if no spans were recorded.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The `(start, end)` span at `index`.
    pub fn span(&self, index: usize) -> Option<(usize, usize)> {
        let start = *self.indices.get(2 * index)?;
        let end = *self.indices.get(2 * index + 1)?;
        Some((start, end))
    }

    /// Whether the span at `index` was added as escaped.
    pub fn is_escaped(&self, index: usize) -> bool {
        // Rows are appended in order, so the list is sorted.
        self.escaped.binary_search(&index).is_ok()
    }
}

/// Trim spaces and tabs from both ends of `data[start..end]`.
///
/// Offsets past the end of `data` are clamped, so fixed-column readers can
/// ask for columns beyond the end of a short line. An all-blank range yields
/// an empty span.
pub fn trim(data: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = data.as_bytes();
    let end = end.min(bytes.len());
    let mut s = start.min(end);
    let mut e = end;
    while s < e && matches!(bytes[s], b' ' | b'\t') {
        s += 1;
    }
    while e > s && matches!(bytes[e - 1], b' ' | b'\t') {
        e -= 1;
    }
    (s, e)
}
