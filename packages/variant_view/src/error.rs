use std::fmt;

use thiserror::Error;

/// Which side of a cast a type argument is on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum CastRole {
    /// The element type of the view being cast.
    Source,

    /// The element type of the view being produced.
    Target,
}

impl fmt::Display for CastRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// A cast was requested between types that do not support it.
///
/// This is a bug in the calling code, not a condition that goes away on retry. The call site
/// must be changed to use a supported pairing of types.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum TypeConfigurationError {
    /// One of the types is a concrete type rather than an interface.
    #[error(
        "cannot cast a view of {source_type} to a view of {target_type}: \
        the {role} type is not an interface"
    )]
    NotPolymorphic {
        /// Which of the two types is not an interface.
        role: CastRole,

        /// The element type of the view being cast.
        source_type: &'static str,

        /// The element type of the view being produced.
        target_type: &'static str,
    },

    /// Both types are interfaces but neither is substitutable for the other.
    #[error(
        "cannot cast a view of {source_type} to a view of {target_type}: \
        neither type is substitutable for the other"
    )]
    Incompatible {
        /// The element type of the view being cast.
        source_type: &'static str,

        /// The element type of the view being produced.
        target_type: &'static str,
    },
}

/// An element of a view was used through a capability it does not have.
///
/// This is reported at the point of use, never at cast time. It can only happen after a
/// covariant view was written to or a contravariant view was read from, i.e. in the regimes
/// where the capability claimed by a view is not guaranteed by its storage.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum CapabilityViolation {
    /// The element exists but its concrete type does not implement the requested interface.
    #[error("element {index} is a {concrete_type}, which does not implement {interface}")]
    NotImplemented {
        /// Index of the element within the view.
        index: usize,

        /// The concrete type of the element.
        concrete_type: &'static str,

        /// The interface the element was used through.
        interface: &'static str,
    },

    /// The element slot was exposed by reslicing but was never assigned a value.
    #[error("element {index} was never assigned a value, so it cannot be used as {interface}")]
    Vacant {
        /// Index of the element within the view.
        index: usize,

        /// The interface the element was used through.
        interface: &'static str,
    },
}
