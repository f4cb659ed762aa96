use std::any::Any;
use std::fmt;
use std::sync::Arc;

use type_pool::TypeTag;

use crate::Described;

/// A concrete type whose values can be stored in a [`View`][crate::View] and resolved to any of
/// the interfaces the type implements.
///
/// Implement this via the [`implements!`][crate::implements] macro, which also implements
/// [`Described`] and the [`Implements`] markers.
pub trait Concrete: Send + Sync + 'static {
    /// The identity of the concrete type.
    fn type_tag(&self) -> TypeTag;

    /// Resolves `self` to `Arc<I>` where `target` is the tag of `I`, returning the result as
    /// `Box<Arc<I>>` behind `dyn Any`. Returns `None` if the type does not implement `I`.
    #[doc(hidden)]
    fn resolve_erased(self: Arc<Self>, target: TypeTag) -> Option<Box<dyn Any>>;
}

/// Marks a concrete type as implementing the interface `I` (or being `I` itself).
///
/// Values are only accepted into a view of `I` if they implement `Implements<I>`.
pub trait Implements<I>: Concrete + Described + Sized
where
    I: ?Sized,
{
}

/// A type-erased value of some concrete type, stored as an element of a view.
///
/// Cloning an object is cheap and yields another reference to the same value.
#[derive(Clone)]
pub struct Object {
    inner: Arc<dyn Concrete>,
}

impl Object {
    /// Wraps a value of a concrete type.
    #[must_use]
    pub fn new<C>(value: C) -> Self
    where
        C: Concrete,
    {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Wraps a value of a concrete type that is already shared.
    #[must_use]
    pub fn from_arc<C>(value: Arc<C>) -> Self
    where
        C: Concrete,
    {
        Self { inner: value }
    }

    /// The concrete type of the value.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.inner.type_tag()
    }

    /// Resolves the value as the interface (or concrete type) `I`.
    ///
    /// Returns `None` if the concrete type of the value did not declare that it implements `I`.
    #[must_use]
    pub fn resolve<I>(&self) -> Option<Arc<I>>
    where
        I: ?Sized + 'static,
    {
        let erased = Arc::clone(&self.inner).resolve_erased(TypeTag::of::<I>())?;

        erased.downcast::<Arc<I>>().ok().map(|resolved| *resolved)
    }

    /// Whether the value implements the interface (or is of the concrete type) `I`.
    #[must_use]
    pub fn implements<I>(&self) -> bool
    where
        I: ?Sized + 'static,
    {
        self.resolve::<I>().is_some()
    }

    /// Whether two objects reference the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.type_tag())
            .finish_non_exhaustive()
    }
}

/// Declares the interfaces a concrete type implements, so its values can be stored in views.
///
/// Every listed interface must be declared via [`interface!`][crate::interface] and the compiler
/// checks that the type actually implements it. Values resolve to the listed interfaces and to
/// all of their super-interfaces, so listing only the most specific interfaces is enough for
/// reading through any view in their capability set.
///
/// [`View::push()`][crate::View::push] only accepts values into views of listed interfaces. To
/// push into a view of a super-interface without listing it, use
/// [`View::push_object()`][crate::View::push_object].
///
/// # Example
///
/// ```rust
/// use variant_view::{Object, implements, interface};
///
/// trait Animal {
///     fn name(&self) -> &'static str;
/// }
///
/// trait Cat: Animal {
///     fn meow(&self) -> &'static str;
/// }
///
/// interface!(Animal; Cat: Animal);
///
/// struct Tabby;
///
/// impl Animal for Tabby {
///     fn name(&self) -> &'static str {
///         "tabby"
///     }
/// }
///
/// impl Cat for Tabby {
///     fn meow(&self) -> &'static str {
///         "meow"
///     }
/// }
///
/// // Animal does not need to be listed: it is inherited through Cat.
/// implements!(Tabby: dyn Cat);
///
/// let object = Object::new(Tabby);
///
/// assert_eq!(object.resolve::<dyn Animal>().unwrap().name(), "tabby");
/// assert_eq!(object.resolve::<dyn Cat>().unwrap().meow(), "meow");
/// ```
#[macro_export]
macro_rules! implements {
    ($concrete:ty $(: $($iface:ty),+ $(,)?)?) => {
        impl $crate::Described for $concrete {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::concrete::<Self>(&[
                    $($(<$iface as $crate::Described>::descriptor()),+)?
                ])
            }
        }

        impl $crate::Concrete for $concrete {
            fn type_tag(&self) -> $crate::TypeTag {
                $crate::TypeTag::of::<Self>()
            }

            fn resolve_erased(
                self: ::std::sync::Arc<Self>,
                target: $crate::TypeTag,
            ) -> ::std::option::Option<::std::boxed::Box<dyn ::std::any::Any>> {
                if target == $crate::TypeTag::of::<Self>() {
                    return ::std::option::Option::Some(::std::boxed::Box::new(self));
                }

                $($(
                    let this: ::std::sync::Arc<Self> = ::std::sync::Arc::clone(&self);
                    let resolved: ::std::sync::Arc<$iface> = this;

                    if target == $crate::TypeTag::of::<$iface>() {
                        return ::std::option::Option::Some(::std::boxed::Box::new(resolved));
                    }

                    if let ::std::option::Option::Some(inherited) =
                        <$iface as $crate::Interface>::upcast_erased(resolved, target)
                    {
                        return ::std::option::Option::Some(inherited);
                    }
                )+)?

                ::std::option::Option::None
            }
        }

        impl $crate::Implements<$concrete> for $concrete {}

        $($(
            impl $crate::Implements<$iface> for $concrete {}
        )+)?
    };
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::{TypeKind, substitutable};

    assert_impl_all!(Object: Send, Sync, Clone, fmt::Debug);

    trait Shape {
        fn area(&self) -> u32;
    }

    trait Polygon: Shape {
        fn corners(&self) -> u32;
    }

    trait Colored {}

    crate::interface! {
        Shape;
        Polygon: Shape;
        Colored;
    }

    struct Square(u32);

    impl Shape for Square {
        fn area(&self) -> u32 {
            self.0 * self.0
        }
    }

    impl Polygon for Square {
        fn corners(&self) -> u32 {
            4
        }
    }

    struct Circle;

    impl Shape for Circle {
        fn area(&self) -> u32 {
            3
        }
    }

    struct Marker;

    struct Triangle;

    impl Shape for Triangle {
        fn area(&self) -> u32 {
            6
        }
    }

    impl Polygon for Triangle {
        fn corners(&self) -> u32 {
            3
        }
    }

    crate::implements!(Square: dyn Polygon, dyn Shape);
    crate::implements!(Triangle: dyn Polygon);
    crate::implements!(Circle: dyn Shape);
    crate::implements!(Marker);

    assert_impl_all!(Square: Implements<dyn Polygon>, Implements<dyn Shape>, Implements<Square>);
    assert_not_impl_any!(Circle: Implements<dyn Polygon>);
    assert_not_impl_any!(Marker: Implements<dyn Colored>);

    #[test]
    fn resolves_declared_interfaces() {
        let object = Object::new(Square(3));

        assert_eq!(object.resolve::<dyn Shape>().map(|s| s.area()), Some(9));
        assert_eq!(object.resolve::<dyn Polygon>().map(|p| p.corners()), Some(4));
    }

    #[test]
    fn resolves_inherited_interfaces_without_listing_them() {
        let object = Object::new(Triangle);

        assert_eq!(object.resolve::<dyn Shape>().map(|s| s.area()), Some(6));
        assert_eq!(object.resolve::<dyn Polygon>().map(|p| p.corners()), Some(3));
        assert!(!object.implements::<dyn Colored>());
    }

    #[test]
    fn every_declared_capability_resolves() {
        let object = Object::new(Triangle);

        for capability in Triangle::descriptor().capabilities() {
            let resolved = Arc::new(Triangle).resolve_erased(*capability);

            assert!(resolved.is_some(), "{capability} is declared but does not resolve");
        }

        assert!(object.implements::<Triangle>());
    }

    #[test]
    fn resolves_own_concrete_type() {
        let object = Object::new(Square(2));

        let square = object.resolve::<Square>().expect("object is a square");
        assert_eq!(square.0, 2);
    }

    #[test]
    fn does_not_resolve_undeclared_interfaces() {
        let object = Object::new(Circle);

        assert!(object.implements::<dyn Shape>());
        assert!(!object.implements::<dyn Polygon>());
        assert!(!object.implements::<dyn Colored>());
        assert!(!object.implements::<Square>());
    }

    #[test]
    fn type_tag_is_concrete_type() {
        assert_eq!(Object::new(Circle).type_tag(), TypeTag::of::<Circle>());
        assert_eq!(Object::new(Marker).type_tag(), TypeTag::of::<Marker>());
    }

    #[test]
    fn concrete_descriptor_lists_interfaces() {
        let square = Square::descriptor();

        assert_eq!(square.kind(), TypeKind::Concrete);
        assert!(substitutable(&square, &<dyn Polygon>::descriptor()));
        assert!(substitutable(&square, &<dyn Shape>::descriptor()));
        assert!(!substitutable(&Circle::descriptor(), &<dyn Polygon>::descriptor()));
    }

    #[test]
    fn clones_share_value() {
        let object = Object::new(Square(1));
        let clone = object.clone();

        assert!(object.ptr_eq(&clone));
        assert!(!object.ptr_eq(&Object::new(Square(1))));
    }

    #[test]
    fn from_arc_shares_value() {
        let square = Arc::new(Square(5));
        let object = Object::from_arc(Arc::clone(&square));

        let resolved = object.resolve::<Square>().expect("object is a square");
        assert!(Arc::ptr_eq(&resolved, &square));
    }

    #[test]
    fn debug_names_concrete_type() {
        let debug_output = format!("{:?}", Object::new(Circle));

        assert!(debug_output.contains("Object"));
        assert!(debug_output.contains("Circle"));
    }
}
