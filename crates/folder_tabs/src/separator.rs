//! Path separator detection.

/// Separator used to split option values into folder segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// Windows-style `\`
    Backslash,
    /// Unix-style `/`
    Slash,
}

impl Separator {
    /// The separator character.
    pub fn as_char(self) -> char {
        match self {
            Separator::Backslash => '\\',
            Separator::Slash => '/',
        }
    }

    /// Split a value into its segments.
    pub fn split(self, value: &str) -> Vec<&str> {
        value.split(self.as_char()).collect()
    }
}

/// Detect which separator the option values use.
///
/// Backslash wins when both characters appear anywhere in the list.
/// Returns `None` when no value contains a separator, in which case the
/// list stays flat.
///
/// With `require_dot` set, a list where no value contains a `.` is treated
/// as a non-file enumeration and never gets a hierarchy.
pub fn detect_separator<S: AsRef<str>>(values: &[S], require_dot: bool) -> Option<Separator> {
    if require_dot && !values.iter().any(|v| v.as_ref().contains('.')) {
        log::trace!("No dotted values, skipping folder detection");
        return None;
    }

    if values.iter().any(|v| v.as_ref().contains('\\')) {
        Some(Separator::Backslash)
    } else if values.iter().any(|v| v.as_ref().contains('/')) {
        Some(Separator::Slash)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_values_have_no_separator() {
        let values = ["a.png", "b.png", "c d.jpg"];
        assert_eq!(detect_separator(&values, true), None);
        assert_eq!(detect_separator(&values, false), None);
    }

    #[test]
    fn test_backslash_takes_priority() {
        let values = ["x/y.png", "a\\b.png"];
        assert_eq!(detect_separator(&values, true), Some(Separator::Backslash));
    }

    #[test]
    fn test_forward_slash() {
        let values = ["top.png", "nested/deep/file.png"];
        assert_eq!(detect_separator(&values, true), Some(Separator::Slash));
    }

    #[test]
    fn test_dot_gate() {
        // Looks like paths, but nothing has an extension
        let values = ["models/sd15", "models/sdxl"];
        assert_eq!(detect_separator(&values, true), None);
        assert_eq!(detect_separator(&values, false), Some(Separator::Slash));
    }

    #[test]
    fn test_empty_list() {
        let values: [&str; 0] = [];
        assert_eq!(detect_separator(&values, false), None);
    }

    #[test]
    fn test_split() {
        assert_eq!(Separator::Backslash.split("a\\b\\c.png"), vec!["a", "b", "c.png"]);
        assert_eq!(Separator::Slash.split("c.png"), vec!["c.png"]);
    }
}
