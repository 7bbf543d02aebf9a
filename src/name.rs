//! # Name
//!
//! Immutable, delimiter-separated sequence of string components.
//!
//! ## Responsibility
//! - Component access and the non-mutating "mutators" (`set_component`,
//!   `insert`, `append`, `remove`, `concat`), each returning a new [`Name`]
//! - Rendering (`as_string`) and the canonical data string
//!   (`as_data_string`, parsed back by [`Name::parse`])
//! - Structural equality and hashing
//!
//! ## Dependencies
//! - [`contract`](crate::contract) for pre/postcondition and invariant checks
//! - [`escape`](crate::escape_component) for the data-string rules
//!
//! ## Usage
//!
//! ```rust
//! use nametree::Name;
//!
//! let name = Name::new(["a", "b", "c"], '.')?;
//! assert_eq!(name.as_string(), "a.b.c");
//! assert_eq!(name.remove(1)?.as_string(), "a.c");
//! assert_eq!(name.insert(1, "x")?.as_string(), "a.x.b.c");
//!
//! // The receiver is never touched.
//! assert_eq!(name.no_components(), 3);
//! # Ok::<(), nametree::ContractError>(())
//! ```

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::contract::{self, Invariant};
use crate::escape::{escape_component, split_data_string};
use crate::{ContractError, DEFAULT_DELIMITER, ESCAPE_CHARACTER};

/// An immutable hierarchical name.
///
/// Two names are equal iff their delimiters and their component sequences
/// are equal element-wise. Cloning is cheap: the component sequence is
/// shared, and every operation that "changes" a name builds a fresh one.
///
/// # Invariants
///
/// - the delimiter is not [`ESCAPE_CHARACTER`]
/// - no component is the empty string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    components: Arc<[String]>,
    delimiter: char,
}

/// Parse a delimiter given as text.
///
/// ```rust
/// use nametree::delimiter_from_str;
///
/// assert_eq!(delimiter_from_str("/").unwrap(), '/');
/// assert!(delimiter_from_str("::").is_err());
/// assert!(delimiter_from_str(r"\").is_err());
/// ```
///
/// # Errors
///
/// - [`ContractError::IllegalArgument`] unless `s` is exactly one character
///   and that character is not the escape character
pub fn delimiter_from_str(s: &str) -> Result<char, ContractError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            check_delimiter(c)?;
            Ok(c)
        }
        _ => Err(ContractError::IllegalArgument {
            message: format!("delimiter must be exactly one character, got '{s}'"),
        }),
    }
}

fn check_delimiter(delimiter: char) -> Result<(), ContractError> {
    contract::require(delimiter != ESCAPE_CHARACTER, || {
        format!("delimiter must not be the escape character '{ESCAPE_CHARACTER}'")
    })
}

fn check_component(component: &str) -> Result<(), ContractError> {
    contract::require(!component.is_empty(), || {
        "component must not be empty".to_string()
    })
}

impl Name {
    /// Build a name from `components` joined by `delimiter`.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] if the delimiter is the escape
    ///   character or any component is empty
    pub fn new<I, S>(components: I, delimiter: char) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        check_delimiter(delimiter)?;
        let components: Vec<String> = components.into_iter().map(Into::into).collect();
        for component in &components {
            check_component(component)?;
        }

        let name = Name {
            components: components.into(),
            delimiter,
        };
        name.check_invariants()?;
        Ok(name)
    }

    /// Build a name using [`DEFAULT_DELIMITER`].
    ///
    /// # Errors
    ///
    /// Same as [`Name::new`].
    pub fn with_default_delimiter<I, S>(components: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(components, DEFAULT_DELIMITER)
    }

    /// A name without components.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] if `delimiter` is the escape character
    pub fn empty(delimiter: char) -> Result<Self, ContractError> {
        Self::new(std::iter::empty::<String>(), delimiter)
    }

    /// Parse a data string produced by [`Name::as_data_string`].
    ///
    /// ```rust
    /// use nametree::Name;
    ///
    /// let name = Name::parse(r"a\.b.c", '.')?;
    /// assert_eq!(name.components(), ["a.b", "c"]);
    /// assert_eq!(name.as_data_string(), r"a\.b.c");
    /// # Ok::<(), nametree::ContractError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an invalid delimiter, a
    ///   malformed escape sequence, or an empty component
    pub fn parse(data: &str, delimiter: char) -> Result<Self, ContractError> {
        check_delimiter(delimiter)?;
        Self::new(split_data_string(data, delimiter)?, delimiter)
    }

    /// Number of components.
    #[inline]
    pub fn no_components(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the name has no components.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The delimiter character.
    #[inline]
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// All components, in order.
    #[inline]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Iterate over the components.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.components.iter()
    }

    /// Component at index `i`.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] unless `i < no_components()`
    pub fn component(&self, i: usize) -> Result<&str, ContractError> {
        self.require_index(i)?;
        Ok(&self.components[i])
    }

    /// A new name with the component at `i` replaced by `c`.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an out-of-range index or an
    ///   empty component
    /// - [`ContractError::MethodFailed`] if the result does not hold `c` at `i`
    pub fn set_component(&self, i: usize, c: impl Into<String>) -> Result<Name, ContractError> {
        let c = c.into();
        self.require_index(i)?;
        check_component(&c)?;

        let mut next = self.components.to_vec();
        next[i].clone_from(&c);
        log::trace!("set component {i} of '{self}' to '{c}'");

        contract::guarded(
            self.with_components(next),
            |n| n.no_components() == self.no_components() && n.components[i] == c,
            "set_component",
        )
    }

    /// A new name with `c` inserted before index `i` (`i == no_components()`
    /// appends).
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] unless `i <= no_components()`, or
    ///   if `c` is empty
    /// - [`ContractError::MethodFailed`] if the count did not grow by one
    pub fn insert(&self, i: usize, c: impl Into<String>) -> Result<Name, ContractError> {
        let c = c.into();
        let count = self.no_components();
        contract::require(i <= count, || {
            format!("insert index {i} out of range 0..={count}")
        })?;
        check_component(&c)?;

        let mut next = Vec::with_capacity(count + 1);
        next.extend_from_slice(&self.components[..i]);
        next.push(c.clone());
        next.extend_from_slice(&self.components[i..]);
        log::trace!("insert '{c}' at {i} into '{self}'");

        contract::guarded(
            self.with_components(next),
            |n| n.no_components() == count + 1 && n.components[i] == c,
            "insert",
        )
    }

    /// Same as `insert(no_components(), c)`.
    ///
    /// # Errors
    ///
    /// Same as [`Name::insert`].
    pub fn append(&self, c: impl Into<String>) -> Result<Name, ContractError> {
        self.insert(self.no_components(), c)
    }

    /// A new name without the component at `i`.
    ///
    /// Removing the last remaining component yields an empty name.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] unless `i < no_components()`
    /// - [`ContractError::MethodFailed`] if the count did not shrink by one
    pub fn remove(&self, i: usize) -> Result<Name, ContractError> {
        self.require_index(i)?;
        let count = self.no_components();

        let mut next = self.components.to_vec();
        next.remove(i);
        log::trace!("remove component {i} from '{self}'");

        contract::guarded(
            self.with_components(next),
            |n| n.no_components() == count - 1,
            "remove",
        )
    }

    /// A new name with the components of `other` appended in order.
    ///
    /// The receiver's delimiter is kept; components are copied verbatim, so
    /// a differing delimiter on `other` is harmless.
    ///
    /// # Errors
    ///
    /// - [`ContractError::MethodFailed`] if the count is not the sum of both
    pub fn concat(&self, other: &Name) -> Result<Name, ContractError> {
        let expected = self.no_components() + other.no_components();
        let mut next = Vec::with_capacity(expected);
        next.extend_from_slice(&self.components);
        next.extend_from_slice(&other.components);

        contract::guarded(
            self.with_components(next),
            |n| n.no_components() == expected && n.components.ends_with(&other.components),
            "concat",
        )
    }

    /// Components joined by the name's own delimiter, without escaping.
    pub fn as_string(&self) -> String {
        self.as_string_with(self.delimiter)
    }

    /// Components joined by `delimiter`, without escaping.
    pub fn as_string_with(&self, delimiter: char) -> String {
        let mut buf = [0u8; 4];
        let delimiter: &str = delimiter.encode_utf8(&mut buf);
        self.components.join(delimiter)
    }

    /// Canonical, reversible representation.
    ///
    /// Every delimiter and escape character inside a component is prefixed
    /// with [`ESCAPE_CHARACTER`]; components are joined with the bare
    /// delimiter. [`Name::parse`] reverses it.
    pub fn as_data_string(&self) -> String {
        let mut buf = [0u8; 4];
        let delimiter: &str = self.delimiter.encode_utf8(&mut buf);
        self.components
            .iter()
            .map(|c| escape_component(c, self.delimiter))
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// Structural equality; the same as `==`.
    #[inline]
    pub fn is_equal(&self, other: &Name) -> bool {
        self == other
    }

    /// Hash code consistent with `==`: equal names give equal codes.
    pub fn hash_code(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn require_index(&self, i: usize) -> Result<(), ContractError> {
        let count = self.no_components();
        contract::require(i < count, || format!("index {i} out of range 0..{count}"))
    }

    fn with_components(&self, components: Vec<String>) -> Name {
        Name {
            components: components.into(),
            delimiter: self.delimiter,
        }
    }
}

impl Invariant for Name {
    fn check_invariants(&self) -> Result<(), ContractError> {
        contract::invariant(self.delimiter != ESCAPE_CHARACTER, || {
            "delimiter is the escape character".to_string()
        })?;
        if let Some(pos) = self.components.iter().position(String::is_empty) {
            return contract::invariant(false, || format!("component {pos} is empty"));
        }
        Ok(())
    }
}

impl Default for Name {
    fn default() -> Self {
        Name {
            components: Arc::from(Vec::new()),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl FromStr for Name {
    type Err = ContractError;

    /// Parses a data string with [`DEFAULT_DELIMITER`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::parse(s, DEFAULT_DELIMITER)
    }
}

impl<'a> IntoIterator for &'a Name {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{Name, delimiter_from_str};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Wire form: the delimiter plus the canonical data string.
    #[derive(Serialize, Deserialize)]
    struct NameRepr {
        delimiter: String,
        name: String,
    }

    impl Serialize for Name {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            NameRepr {
                delimiter: self.delimiter.to_string(),
                name: self.as_data_string(),
            }
            .serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Name {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let repr = NameRepr::deserialize(deserializer)?;
            let delimiter = delimiter_from_str(&repr.delimiter).map_err(D::Error::custom)?;
            Name::parse(&repr.name, delimiter).map_err(D::Error::custom)
        }
    }
}
