//! # Contract Guard
//!
//! Precondition, postcondition and invariant checks shared by
//! [`Name`](crate::Name) and [`Tree`](crate::Tree).
//!
//! ## Responsibility
//! - Map each kind of check onto its [`ContractError`] variant
//! - Run the "tentative value → postcondition → invariants" sequence for
//!   operations that produce a new value
//!
//! ## Usage
//!
//! ```rust
//! use nametree::contract::{self, Invariant};
//! use nametree::ContractError;
//!
//! #[derive(Debug)]
//! struct Counter(u32);
//!
//! impl Invariant for Counter {
//!     fn check_invariants(&self) -> Result<(), ContractError> {
//!         contract::invariant(self.0 < 100, || format!("counter overflowed: {}", self.0))
//!     }
//! }
//!
//! fn bump(c: &Counter, by: u32) -> Result<Counter, ContractError> {
//!     contract::require(by > 0, || "step must be positive".to_string())?;
//!     let expected = c.0 + by;
//!     contract::guarded(Counter(expected), |next| next.0 == expected, "bump")
//! }
//!
//! assert!(bump(&Counter(1), 0).unwrap_err().is_illegal_argument());
//! assert!(bump(&Counter(99), 5).unwrap_err().is_invalid_state());
//! assert_eq!(bump(&Counter(1), 2).unwrap().0, 3);
//! ```

use crate::ContractError;

/// Types with a class invariant that can be checked on demand.
pub trait Invariant {
    /// Check every class invariant.
    ///
    /// # Errors
    ///
    /// - [`ContractError::InvalidState`] naming the first invariant that fails
    fn check_invariants(&self) -> Result<(), ContractError>;
}

/// Precondition check.
///
/// # Errors
///
/// [`ContractError::IllegalArgument`] with the lazily built message when
/// `condition` is false.
#[inline]
pub fn require(condition: bool, message: impl FnOnce() -> String) -> Result<(), ContractError> {
    if condition {
        Ok(())
    } else {
        Err(ContractError::IllegalArgument { message: message() })
    }
}

/// Postcondition check.
///
/// # Errors
///
/// [`ContractError::MethodFailed`] when `condition` is false.
#[inline]
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), ContractError> {
    if condition {
        Ok(())
    } else {
        Err(ContractError::MethodFailed { message: message() })
    }
}

/// Class-invariant check.
///
/// # Errors
///
/// [`ContractError::InvalidState`] when `condition` is false.
#[inline]
pub fn invariant(condition: bool, message: impl FnOnce() -> String) -> Result<(), ContractError> {
    if condition {
        Ok(())
    } else {
        Err(ContractError::InvalidState { message: message() })
    }
}

/// Hand back `tentative` only if it satisfies `postcondition` and its own
/// invariants.
///
/// On failure the tentative value is dropped, so a half-built result is never
/// observable. `operation` names the call in the failure message.
///
/// # Errors
///
/// - [`ContractError::MethodFailed`] if `postcondition` rejects the value
/// - [`ContractError::InvalidState`] if the value's invariants fail
pub fn guarded<T, P>(tentative: T, postcondition: P, operation: &str) -> Result<T, ContractError>
where
    T: Invariant,
    P: FnOnce(&T) -> bool,
{
    ensure(postcondition(&tentative), || {
        format!("{operation}: postcondition does not hold")
    })?;
    tentative.check_invariants()?;
    Ok(tentative)
}
