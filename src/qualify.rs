//! Folder qualification.
//!
//! A folder qualifies when one of its immediate names carries the wanted
//! extension, or when the extra listing does. The extra listing is the
//! directory the tool was started from; a match there qualifies every folder
//! in the walk.

use crate::paths;

/// Decides whether a visited folder should be compiled or extracted
#[derive(Debug, Clone, Copy)]
pub struct Qualifier<'a> {
    /// Suffix a name must end with (`.osu` or `.osz`)
    extension: &'static str,
    /// Names from the invocation directory, checked for every folder
    extra: &'a [String],
}

impl<'a> Qualifier<'a> {
    /// Create a qualifier for `extension`; pass an empty `extra` to only
    /// look at each folder's own names
    pub fn new(extension: &'static str, extra: &'a [String]) -> Self {
        Self { extension, extra }
    }

    /// The suffix this qualifier looks for
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    /// True if any of `names` or any extra name ends with the extension
    pub fn matches<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> bool {
        let wanted = |name: &str| paths::has_extension(name, self.extension);
        names.into_iter().any(wanted) || self.extra.iter().map(String::as_str).any(wanted)
    }
}
