use std::any::Any;
use std::sync::Arc;

use smallvec::SmallVec;
use type_pool::TypeTag;

// Most interface hierarchies are shallow, so capability sets rarely spill to the heap.
type CapabilitySet = SmallVec<[TypeTag; 4]>;

/// Whether a type describes a set of capabilities or a concrete data layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum TypeKind {
    /// A capability set that many unrelated concrete types may implement, i.e. a trait object
    /// type such as `dyn Animal`.
    Interface,

    /// A concrete data layout, i.e. a struct or enum.
    Concrete,
}

/// Describes the identity, kind and capability set of one type.
///
/// The capability set of an interface contains the interface itself and the capability sets of
/// all its super-interfaces. The capability set of a concrete type contains the concrete type
/// itself and the capability sets of every interface it implements. Substitutability between
/// two types is decided from these sets alone, see [`substitutable()`].
///
/// Descriptors are obtained via [`Described::descriptor()`], which the [`interface!`][1] and
/// [`implements!`][2] macros implement.
///
/// [1]: crate::interface
/// [2]: crate::implements
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    tag: TypeTag,
    kind: TypeKind,
    capabilities: CapabilitySet,
}

impl TypeDescriptor {
    /// Describes the interface type `T` with the given super-interfaces.
    ///
    /// This is used by the [`interface!`][crate::interface] macro and is rarely useful to call
    /// directly.
    #[must_use]
    pub fn interface<T>(supers: &[Self]) -> Self
    where
        T: ?Sized + 'static,
    {
        Self::new(TypeTag::of::<T>(), TypeKind::Interface, supers)
    }

    /// Describes the concrete type `T` that implements the given interfaces.
    ///
    /// This is used by the [`implements!`][crate::implements] macro and is rarely useful to call
    /// directly.
    #[must_use]
    pub fn concrete<T>(interfaces: &[Self]) -> Self
    where
        T: ?Sized + 'static,
    {
        Self::new(TypeTag::of::<T>(), TypeKind::Concrete, interfaces)
    }

    fn new(tag: TypeTag, kind: TypeKind, inherited: &[Self]) -> Self {
        let mut capabilities = CapabilitySet::new();
        capabilities.push(tag);

        for capability in inherited.iter().flat_map(|d| d.capabilities.iter()) {
            if !capabilities.contains(capability) {
                capabilities.push(*capability);
            }
        }

        Self {
            tag,
            kind,
            capabilities,
        }
    }

    /// The identity of the described type.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// The name of the described type, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.tag.type_name()
    }

    /// Whether the described type is an interface or a concrete type.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Every capability that values of the described type are guaranteed to have.
    #[must_use]
    pub fn capabilities(&self) -> &[TypeTag] {
        &self.capabilities
    }

    /// Whether values of the described type are guaranteed to have the given capability.
    #[must_use]
    pub fn has_capability(&self, capability: TypeTag) -> bool {
        self.capabilities.contains(&capability)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for TypeDescriptor {}

/// A type that can describe itself via a [`TypeDescriptor`].
///
/// Implement this via the [`interface!`][1] macro for trait object types and via the
/// [`implements!`][2] macro for concrete types.
///
/// [1]: crate::interface
/// [2]: crate::implements
pub trait Described: 'static {
    /// Describes the type.
    fn descriptor() -> TypeDescriptor;
}

/// Whether the described type is a capability set (interface) rather than a concrete layout.
#[must_use]
pub fn is_polymorphic(descriptor: &TypeDescriptor) -> bool {
    descriptor.kind == TypeKind::Interface
}

/// Whether every type that implements `a` also implements `b`.
///
/// This holds when the capability set of `a` is a superset of the capability set of `b`. The
/// relation is reflexive and transitive but not symmetric.
///
/// # Example
///
/// ```rust
/// use variant_view::{Described, interface, substitutable};
///
/// trait Animal {}
/// trait Cat: Animal {}
///
/// interface!(Animal; Cat: Animal);
///
/// let animal = <dyn Animal>::descriptor();
/// let cat = <dyn Cat>::descriptor();
///
/// assert!(substitutable(&cat, &animal));
/// assert!(!substitutable(&animal, &cat));
/// ```
#[must_use]
pub fn substitutable(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    b.capabilities
        .iter()
        .all(|capability| a.capabilities.contains(capability))
}

/// A trait object type declared via [`interface!`][crate::interface].
///
/// An interface can upcast a shared value to any interface in its capability set, directly or
/// through a chain of super-interfaces. Values resolve to inherited capabilities this way, so a
/// concrete type only needs to list its most specific interfaces in
/// [`implements!`][crate::implements].
pub trait Interface: Described {
    /// Upcasts `value` to the super-interface `S` identified by `target`, returning the result
    /// as `Box<Arc<S>>` behind `dyn Any`. Returns `None` if `target` is not a super-interface.
    #[doc(hidden)]
    fn upcast_erased(value: Arc<Self>, target: TypeTag) -> Option<Box<dyn Any>>;
}

/// Declares trait object types as interfaces whose variance can be checked.
///
/// Each declaration names a trait and, optionally, its supertraits. Every supertrait listed must
/// itself be declared via this macro. The capability set of the interface includes the
/// capability sets of all listed supertraits.
///
/// # Example
///
/// ```rust
/// use variant_view::{Described, interface, is_polymorphic};
///
/// trait Animal {}
/// trait Pet {}
/// trait Cat: Animal + Pet {}
///
/// interface! {
///     Animal;
///     Pet;
///     Cat: Animal, Pet;
/// }
///
/// let cat = <dyn Cat>::descriptor();
///
/// assert!(is_polymorphic(&cat));
/// assert_eq!(cat.capabilities().len(), 3);
/// ```
///
/// Listing a trait that is not actually a supertrait does not compile:
///
/// ```rust,compile_fail
/// use variant_view::interface;
///
/// trait Fish {}
/// trait Shark {}
///
/// interface!(Fish; Shark: Fish);
/// ```
#[macro_export]
macro_rules! interface {
    ($($iface:path $(: $($super:path),+)?);+ $(;)?) => {
        $(
            impl $crate::Described for dyn $iface {
                fn descriptor() -> $crate::TypeDescriptor {
                    $crate::TypeDescriptor::interface::<Self>(&[
                        $($(<dyn $super as $crate::Described>::descriptor()),+)?
                    ])
                }
            }

            impl $crate::Interface for dyn $iface {
                #[allow(unused_variables, reason = "unused when there are no supertraits")]
                fn upcast_erased(
                    value: ::std::sync::Arc<Self>,
                    target: $crate::TypeTag,
                ) -> ::std::option::Option<::std::boxed::Box<dyn ::std::any::Any>> {
                    $($(
                        let inherited: ::std::sync::Arc<Self> = ::std::sync::Arc::clone(&value);
                        // Only compiles if the listed trait really is a supertrait.
                        let upcast: ::std::sync::Arc<dyn $super> = inherited;

                        if target == $crate::TypeTag::of::<dyn $super>() {
                            return ::std::option::Option::Some(::std::boxed::Box::new(upcast));
                        }

                        if let ::std::option::Option::Some(resolved) =
                            <dyn $super as $crate::Interface>::upcast_erased(upcast, target)
                        {
                            return ::std::option::Option::Some(resolved);
                        }
                    )+)?

                    ::std::option::Option::None
                }
            }
        )+
    };
}
