//! Names for anonymous block scopes

/// Generates `{block@LINE.ORDINAL}` names.
///
/// The ordinal restarts at zero whenever the line differs from the line of
/// the previous name, so blocks opened on one line stay distinct and the same
/// tree always yields the same sequence.
#[derive(Debug, Clone, Default)]
pub struct BlockNamer {
    last_line: Option<usize>,
    ordinal: usize,
}

impl BlockNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self, line: usize) -> String {
        if self.last_line == Some(line) {
            self.ordinal += 1;
        } else {
            self.last_line = Some(line);
            self.ordinal = 0;
        }
        format!("{{block@{}.{}}}", line, self.ordinal)
    }
}
