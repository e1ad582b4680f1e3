//! Output buffering for the lowering engine.
//!
//! Two stacks live here. The buffer stack redirects output while a
//! sub-fragment is lowered in isolation (e.g. capturing receiver text for a
//! template); discipline is strictly scoped — push, lower, pop — on every
//! exit path. The deferred stack holds writes that are split around exactly
//! one remaining hole, waiting for argument text produced later by
//! invocation or assignment lowering.

/// A write waiting for its hole to be filled.
#[derive(Clone, Debug)]
pub struct DeferredWrite {
    pub prefix: String,
    pub suffix: String,
    /// Whether the write still expects hole text between prefix and suffix.
    /// A template without argument holes completes as-is.
    pub has_hole: bool,
    /// Temp variables to release once the write completes.
    pub release_temps: Vec<String>,
}

impl DeferredWrite {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        DeferredWrite {
            prefix: prefix.into(),
            suffix: suffix.into(),
            has_hole: true,
            release_temps: Vec::new(),
        }
    }

    /// A deferred write with no remaining hole; fill text is discarded.
    pub fn complete(text: impl Into<String>) -> Self {
        DeferredWrite {
            prefix: text.into(),
            suffix: String::new(),
            has_hole: false,
            release_temps: Vec::new(),
        }
    }

    pub fn releasing(mut self, temp: impl Into<String>) -> Self {
        self.release_temps.push(temp.into());
        self
    }
}

/// The output buffer plus its redirection and deferred-write stacks.
#[derive(Default)]
pub struct OutputWriter {
    main: String,
    redirects: Vec<String>,
    deferred: Vec<DeferredWrite>,
}

impl OutputWriter {
    pub fn new() -> Self {
        OutputWriter::default()
    }

    fn current(&mut self) -> &mut String {
        self.redirects.last_mut().unwrap_or(&mut self.main)
    }

    pub fn write(&mut self, text: &str) {
        self.current().push_str(text);
    }

    /// Length of the active buffer, for later insertion.
    pub fn len(&self) -> usize {
        self.redirects.last().unwrap_or(&self.main).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert text into the active buffer at a previously recorded offset.
    /// Used to wrap an already-emitted expression after the fact.
    pub fn insert_at(&mut self, offset: usize, text: &str) {
        let buffer = self.current();
        debug_assert!(offset <= buffer.len());
        buffer.insert_str(offset.min(buffer.len()), text);
    }

    // =========================================================================
    // Buffer redirection
    // =========================================================================

    pub fn push_buffer(&mut self) {
        self.redirects.push(String::new());
    }

    pub fn pop_buffer(&mut self) -> String {
        self.redirects.pop().unwrap_or_default()
    }

    // =========================================================================
    // Deferred writes
    // =========================================================================

    pub fn push_deferred(&mut self, write: DeferredWrite) {
        self.deferred.push(write);
    }

    pub fn pop_deferred(&mut self) -> Option<DeferredWrite> {
        self.deferred.pop()
    }

    pub fn deferred_depth(&self) -> usize {
        self.deferred.len()
    }

    /// The finished output. Meaningless while redirects are active.
    pub fn output(&self) -> &str {
        &self.main
    }

    pub fn into_output(self) -> String {
        self.main
    }
}
