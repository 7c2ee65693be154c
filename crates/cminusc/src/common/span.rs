//! Source spans and line lookup

/// Byte range in the source text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Maps byte offsets to 1-based line numbers
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// Line number (1-based) containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(next) => next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let index = LineIndex::new("int x;\nint y;\n\nvoid f(void) {}");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(5), 1);
        assert_eq!(index.line_of(7), 2);
        assert_eq!(index.line_of(14), 3);
        assert_eq!(index.line_of(15), 4);
    }

    #[test]
    fn test_merge() {
        let span = Span::new(4, 8).merge(Span::new(2, 5));
        assert_eq!(span, Span::new(2, 8));
        assert!(!span.is_empty());
        assert!(Span::default().is_empty());
    }
}
