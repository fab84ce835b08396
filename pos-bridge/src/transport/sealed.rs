//! Sealed trait marker for Transport implementations.
//!
//! Keeps `Transport` implementations inside this crate so every one of them applies the
//! same failure classification.

pub(crate) mod private {
    /// Sealed trait marker.
    ///
    /// This trait cannot be implemented outside this crate.
    pub trait Sealed {}
}
