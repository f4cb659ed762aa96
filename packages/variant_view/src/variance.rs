use crate::{
    CastRole, Described, TypeConfigurationError, TypeDescriptor, is_polymorphic, substitutable,
};

/// The soundness regime of viewing elements of one interface type as another interface type.
///
/// # Example
///
/// ```rust
/// use variant_view::{Variance, interface};
///
/// trait Animal {}
/// trait Cat: Animal {}
///
/// interface!(Animal; Cat: Animal);
///
/// assert_eq!(Variance::of::<dyn Cat, dyn Animal>(), Ok(Variance::Covariant));
/// assert_eq!(Variance::of::<dyn Animal, dyn Cat>(), Ok(Variance::Contravariant));
/// assert_eq!(Variance::of::<dyn Cat, dyn Cat>(), Ok(Variance::Invariant));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Variance {
    /// Both types have the same capability set. Reading and writing are both sound.
    Invariant,

    /// The source type is narrower than the target type. Every element genuinely has the
    /// capabilities of the target type, so reading is sound. Writing is not: it can put values
    /// into the storage that lack capabilities the source type promises.
    Covariant,

    /// The source type is broader than the target type. Writing is sound because every value
    /// accepted by the target type also satisfies the source type. Reading is not: elements
    /// are only guaranteed to have the capabilities of the source type.
    Contravariant,
}

impl Variance {
    /// Determines the regime of viewing elements of type `source` as type `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeConfigurationError::NotPolymorphic`] if either type is not an interface
    /// (the source is checked first) and [`TypeConfigurationError::Incompatible`] if neither
    /// type is substitutable for the other.
    pub fn between(
        source: &TypeDescriptor,
        target: &TypeDescriptor,
    ) -> Result<Self, TypeConfigurationError> {
        for (role, descriptor) in [(CastRole::Source, source), (CastRole::Target, target)] {
            if !is_polymorphic(descriptor) {
                return Err(TypeConfigurationError::NotPolymorphic {
                    role,
                    source_type: source.type_name(),
                    target_type: target.type_name(),
                });
            }
        }

        Self::classify(source, target).ok_or_else(|| TypeConfigurationError::Incompatible {
            source_type: source.type_name(),
            target_type: target.type_name(),
        })
    }

    /// Determines the regime of viewing elements of type `T1` as type `T2`.
    ///
    /// # Errors
    ///
    /// See [`Variance::between()`].
    pub fn of<T1, T2>() -> Result<Self, TypeConfigurationError>
    where
        T1: ?Sized + Described,
        T2: ?Sized + Described,
    {
        Self::between(&T1::descriptor(), &T2::descriptor())
    }

    /// Relates two types by substitutability alone, regardless of whether they are interfaces.
    ///
    /// Returns `None` if neither is substitutable for the other.
    #[must_use]
    pub fn classify(source: &TypeDescriptor, target: &TypeDescriptor) -> Option<Self> {
        match (substitutable(source, target), substitutable(target, source)) {
            (true, true) => Some(Self::Invariant),
            (true, false) => Some(Self::Covariant),
            (false, true) => Some(Self::Contravariant),
            (false, false) => None,
        }
    }

    /// Whether every element read through the target type is guaranteed to have the
    /// capabilities of the target type.
    #[must_use]
    pub fn is_sound_for_reads(self) -> bool {
        matches!(self, Self::Invariant | Self::Covariant)
    }

    /// Whether every value written through the target type is guaranteed to have the
    /// capabilities of the source type.
    #[must_use]
    pub fn is_sound_for_writes(self) -> bool {
        matches!(self, Self::Invariant | Self::Contravariant)
    }
}
