use std::error::Error;
use std::fmt;

/// An ordered collection of errors reported as one.
///
/// Validation stages report many violations at once instead of stopping at
/// the first, and concurrent extraction jobs each contribute their own
/// failure. `MultiError` keeps every item, in order, and renders them under
/// a single summary line in one of two styles:
///
/// - [`bulleted`](MultiError::bulleted): one `- item` line per error, used
///   for manifest, precondition, and per-archive reports
/// - [`blocks`](MultiError::blocks): one block per error separated by blank
///   lines, used for the batch report where items are themselves multi-line
#[derive(Debug)]
pub struct MultiError {
    summary: String,
    items: Vec<String>,
    style: Style,
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Bulleted,
    Blocks,
}

impl MultiError {
    /// Combine errors under a summary, one bulleted line per error.
    pub fn bulleted(summary: impl Into<String>, errors: Vec<anyhow::Error>) -> Self {
        Self::new(summary, errors, Style::Bulleted)
    }

    /// Combine errors under a summary, one block per error separated by
    /// blank lines.
    pub fn blocks(summary: impl Into<String>, errors: Vec<anyhow::Error>) -> Self {
        Self::new(summary, errors, Style::Blocks)
    }

    fn new(summary: impl Into<String>, errors: Vec<anyhow::Error>, style: Style) -> Self {
        Self {
            summary: summary.into(),
            // Render each error with its full context chain up front; the
            // originals are not retained.
            items: errors.iter().map(|err| format!("{err:#}")).collect(),
            style,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            Style::Bulleted => {
                write!(f, "{}:", self.summary)?;
                for item in &self.items {
                    write!(f, "\n- {item}")?;
                }
            }
            Style::Blocks => {
                write!(f, "{}", self.summary)?;
                for (i, item) in self.items.iter().enumerate() {
                    if i == 0 {
                        write!(f, "\n{item}")?;
                    } else {
                        write!(f, "\n\n{item}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Error for MultiError {}
