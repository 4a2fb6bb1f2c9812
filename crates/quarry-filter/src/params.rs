//! Local-parameter prefix accumulation.

/// Accumulates local parameters into a single `{!...}` prefix.
///
/// The prefix opens lazily on the first parameter and is closed exactly once by
/// [`LocalParams::finish`]. An empty container renders as the empty string.
#[derive(Debug, Clone, Default)]
pub struct LocalParams {
    /// Rendered prefix so far, without the closing brace.
    buf: String,
}

impl LocalParams {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one raw parameter such as `tag=color` or `cache=false`.
    pub fn add(&mut self, param: &str) {
        if self.buf.is_empty() {
            self.buf.push_str("{!");
        } else {
            self.buf.push(' ');
        }
        self.buf.push_str(param);
    }

    /// Appends a `key=value` parameter.
    pub fn add_pair(&mut self, key: &str, value: &str) {
        self.add(&format!("{key}={value}"));
    }

    /// Returns true if no parameter has been added.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Closes the prefix and returns it.
    pub fn finish(self) -> String {
        let mut buf = self.buf;
        if !buf.is_empty() {
            buf.push('}');
        }
        buf
    }
}
