//! Escaping rules of the data-string representation.
//!
//! Inside a component every literal delimiter and every literal
//! [`ESCAPE_CHARACTER`] is prefixed with the escape character. Components are
//! then joined with the bare delimiter. [`split_data_string`] is the exact
//! inverse.

use crate::contract;
use crate::{ContractError, ESCAPE_CHARACTER};

/// Escape every delimiter and escape character in `component`.
///
/// ```rust
/// use nametree::escape_component;
///
/// assert_eq!(escape_component("a.b", '.'), r"a\.b");
/// assert_eq!(escape_component(r"x\y", '.'), r"x\\y");
/// ```
pub fn escape_component(component: &str, delimiter: char) -> String {
    let mut escaped = String::with_capacity(component.len());
    for c in component.chars() {
        if c == delimiter || c == ESCAPE_CHARACTER {
            escaped.push(ESCAPE_CHARACTER);
        }
        escaped.push(c);
    }
    escaped
}

/// Undo [`escape_component`] for a single component.
///
/// # Errors
///
/// - [`ContractError::IllegalArgument`] if `escaped` contains an unescaped
///   delimiter, ends in a lone escape character, or escapes a character that
///   is neither the delimiter nor the escape character
pub fn unescape_component(escaped: &str, delimiter: char) -> Result<String, ContractError> {
    if escaped.is_empty() {
        return Ok(String::new());
    }
    let mut components = split_data_string(escaped, delimiter)?;
    contract::require(components.len() == 1, || {
        format!("'{escaped}' holds more than one component")
    })?;
    Ok(components.remove(0))
}

/// Split a data string on unescaped delimiters and unescape each piece.
///
/// The empty string yields no components.
///
/// ```rust
/// use nametree::split_data_string;
///
/// let parts = split_data_string(r"a\.b.c", '.').unwrap();
/// assert_eq!(parts, vec!["a.b".to_string(), "c".to_string()]);
/// ```
///
/// # Errors
///
/// - [`ContractError::IllegalArgument`] for a dangling escape character or an
///   escape in front of an ordinary character
pub fn split_data_string(data: &str, delimiter: char) -> Result<Vec<String>, ContractError> {
    let mut components = Vec::new();
    if data.is_empty() {
        return Ok(components);
    }

    let mut current = String::new();
    let mut chars = data.chars().enumerate();
    while let Some((pos, c)) = chars.next() {
        if c == ESCAPE_CHARACTER {
            let next = chars.next().map(|(_, n)| n);
            match next {
                Some(n) if n == delimiter || n == ESCAPE_CHARACTER => current.push(n),
                Some(n) => {
                    return Err(ContractError::IllegalArgument {
                        message: format!("escape before ordinary character '{n}' at {pos}"),
                    });
                }
                None => {
                    return Err(ContractError::IllegalArgument {
                        message: format!("dangling escape character at {pos}"),
                    });
                }
            }
        } else if c == delimiter {
            components.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    components.push(current);
    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_masks_every_occurrence() {
        assert_eq!(escape_component("a.b.c", '.'), r"a\.b\.c");
        assert_eq!(escape_component("..", '.'), r"\.\.");
        assert_eq!(escape_component(r"\\", '.'), r"\\\\");
    }

    #[test]
    fn escape_leaves_other_delimiters_alone() {
        assert_eq!(escape_component("a/b", '.'), "a/b");
        assert_eq!(escape_component("a.b", '/'), "a.b");
    }

    #[test]
    fn split_plain() {
        assert_eq!(split_data_string("a.b.c", '.').unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn split_empty_is_no_components() {
        assert!(split_data_string("", '.').unwrap().is_empty());
    }

    #[test]
    fn split_keeps_empty_pieces() {
        // Rejecting empty components is the caller's job.
        assert_eq!(split_data_string("a..b", '.').unwrap(), ["a", "", "b"]);
    }

    #[test]
    fn split_unescapes_delimiter_and_escape() {
        let parts = split_data_string(r"a\.b.c\\d.\\\.", '.').unwrap();
        assert_eq!(parts, ["a.b", r"c\d", r"\."]);
    }

    #[test]
    fn split_rejects_dangling_escape() {
        let err = split_data_string(r"a.b\", '.').unwrap_err();
        assert!(err.is_illegal_argument());
        assert!(err.message().contains("dangling"));
    }

    #[test]
    fn split_rejects_escaped_ordinary_character() {
        assert!(split_data_string(r"a\b", '.').unwrap_err().is_illegal_argument());
    }

    #[test]
    fn unescape_single_component() {
        assert_eq!(unescape_component(r"x\.y\\z", '.').unwrap(), r"x.y\z");
    }

    #[test]
    fn unescape_rejects_multiple_components() {
        assert!(unescape_component("x.y", '.').unwrap_err().is_illegal_argument());
    }

    #[test]
    fn escape_then_unescape_is_identity() {
        for component in ["plain", "a.b", r"a\b", r"\.", r".\", "...", r"\\\\"] {
            let escaped = escape_component(component, '.');
            assert_eq!(unescape_component(&escaped, '.').unwrap(), component);
        }
    }
}
