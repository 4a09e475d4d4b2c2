//! Parse state shared with listener callbacks.

/// A view of the reader's current position, passed to every callback.
///
/// The listener may call [`stop`](Context::stop) to suspend parsing; a
/// subsequent `parse` call resumes from the next character.
#[derive(Debug)]
pub struct Context {
    pub(crate) components: Vec<String>,
    pub(crate) unfolded_line: String,
    pub(crate) line_number: usize,
    pub(crate) stop: bool,
}

impl Context {
    pub(crate) fn new() -> Self {
        Self {
            components: Vec::new(),
            unfolded_line: String::new(),
            line_number: 1,
            stop: false,
        }
    }

    /// The hierarchy of components the parser is currently inside of,
    /// outermost first. Does not include the component a `BEGIN` or `END`
    /// event is itself opening or closing.
    #[must_use]
    pub fn parent_components(&self) -> &[String] {
        &self.components
    }

    /// The raw logical line, with folding removed.
    #[must_use]
    pub fn unfolded_line(&self) -> &str {
        &self.unfolded_line
    }

    /// The line number of the first physical line of the current property.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Instructs the reader to return from the current `parse` invocation
    /// after the current callback.
    pub fn stop(&mut self) {
        self.stop = true;
    }
}
