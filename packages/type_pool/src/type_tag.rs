use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An identity token for one instantiated type.
///
/// Two tags are equal (and hash equal) if and only if they were created for the identical type.
/// Distinct instantiations of the same generic type produce distinct tags.
///
/// The tag also carries the type name for diagnostics. The name never participates in
/// equality because type names are not guaranteed to be unique.
///
/// # Example
///
/// ```rust
/// use type_pool::TypeTag;
///
/// assert_eq!(TypeTag::of::<Vec<u8>>(), TypeTag::of::<Vec<u8>>());
/// assert_ne!(TypeTag::of::<Vec<u8>>(), TypeTag::of::<Vec<i8>>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Returns the tag of `T`.
    #[must_use]
    #[inline]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// The `TypeId` that determines the identity of the tag.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// A human-readable name of the tagged type, for diagnostics only.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTag")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
