use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use type_pool::{Sequence, TypeRegistry, TypeTag};

use crate::{
    CapabilityViolation, Described, Implements, Object, TypeConfigurationError, TypeDescriptor,
    Variance,
};

/// A sequence of values that claims every element implements the interface `I`.
///
/// A view is a header over shared storage, with the same aliasing behavior as
/// [`Sequence`]: clones, reslices and casts of a view read and write the same storage.
///
/// Besides the claimed type `I`, every view remembers its *origin*: the type its storage was
/// created for, which is the only capability guarantee the storage really has. The two differ
/// after [`cast_view()`] and the relation between them is reported by
/// [`variance()`][Self::variance].
///
/// Elements are never checked against `I` when a view is created or cast. Instead, each use of
/// an element through `I` via [`Item::capability()`] checks that particular element and
/// reports a [`CapabilityViolation`] if it does not implement `I`.
///
/// # Example
///
/// ```rust
/// use variant_view::{View, implements, interface};
///
/// trait Animal {
///     fn name(&self) -> String;
/// }
///
/// interface!(Animal);
///
/// struct Sparrow;
///
/// impl Animal for Sparrow {
///     fn name(&self) -> String {
///         "sparrow".to_string()
///     }
/// }
///
/// implements!(Sparrow: dyn Animal);
///
/// let mut animals = View::<dyn Animal>::with_capacity(4);
/// animals.push(Sparrow);
///
/// let first = animals.get(0).unwrap();
/// assert_eq!(first.capability().unwrap().name(), "sparrow");
/// ```
pub struct View<I>
where
    I: ?Sized,
{
    sequence: Sequence<Object>,
    origin: TypeDescriptor,

    _claim: PhantomData<fn() -> Arc<I>>,
}

impl<I> View<I>
where
    I: ?Sized + Described,
{
    /// Creates an empty view without any capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty view with storage for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(Sequence::with_capacity(capacity), I::descriptor())
    }

    /// Creates an empty view whose storage is allocated from the object pool of `registry`.
    #[must_use]
    pub fn alloc_in(registry: &TypeRegistry) -> Self {
        Self::from_parts(registry.alloc::<Object>(), I::descriptor())
    }

    fn from_parts(sequence: Sequence<Object>, origin: TypeDescriptor) -> Self {
        Self {
            sequence,
            origin,
            _claim: PhantomData,
        }
    }

    /// The number of elements in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the view contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The number of elements the underlying storage can hold without moving to new storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.sequence.capacity()
    }

    /// Appends a value that implements `I`.
    ///
    /// While there is spare capacity, this writes into storage that may be shared with other
    /// views, including views of other interface types. See [`Sequence::push()`].
    pub fn push<C>(&mut self, value: C)
    where
        C: Implements<I>,
    {
        self.sequence.push(Object::new(value));
    }

    /// Appends a type-erased value, checking that it implements `I`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityViolation::NotImplemented`] without modifying the view if the
    /// concrete type of the value does not implement `I`.
    pub fn push_object(&mut self, object: Object) -> Result<(), CapabilityViolation> {
        if !object.implements::<I>() {
            return Err(CapabilityViolation::NotImplemented {
                index: self.len(),
                concrete_type: object.type_tag().type_name(),
                interface: TypeTag::of::<I>().type_name(),
            });
        }

        self.sequence.push(object);
        Ok(())
    }

    /// Returns the element at `index`, or `None` if `index` is out of bounds.
    ///
    /// This never fails for an in-bounds index, even if the element does not implement `I`;
    /// that is only detected when the element is used via [`Item::capability()`].
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Item<I>> {
        if index >= self.len() {
            return None;
        }

        // In bounds, so `None` here means the slot was never written.
        Some(Item::new(index, self.sequence.get(index)))
    }

    /// Iterates over a snapshot of the elements in the view.
    pub fn iter(&self) -> impl Iterator<Item = Item<I>> {
        self.sequence
            .slots()
            .into_iter()
            .enumerate()
            .map(|(index, object)| Item::new(index, object))
    }

    /// Returns a new view over the same storage with a different length.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the capacity of the storage.
    #[must_use]
    pub fn reslice(&self, len: usize) -> Self {
        Self::from_parts(self.sequence.reslice(len), self.origin.clone())
    }

    /// Reinterprets this view as a view of `T2` over the same storage.
    ///
    /// This is equivalent to [`cast_view()`] on a clone of this view.
    ///
    /// # Errors
    ///
    /// See [`cast_view()`].
    pub fn cast<T2>(&self) -> Result<View<T2>, TypeConfigurationError>
    where
        T2: ?Sized + Described,
    {
        cast_view::<I, T2>(self.clone())
    }

    /// The type the storage of this view was created for.
    ///
    /// Elements written through views of this type or through any view derived from one in a
    /// write-sound regime are guaranteed to implement it.
    #[must_use]
    pub fn origin(&self) -> &TypeDescriptor {
        &self.origin
    }

    /// The regime of this view relative to its origin.
    ///
    /// Returns `None` if the claimed type and the origin are unrelated, which can happen after
    /// a chain of casts such as `Cat` to `Animal` to `Dog`. In that case neither reads nor writes
    /// are sound.
    #[must_use]
    pub fn variance(&self) -> Option<Variance> {
        Variance::classify(&self.origin, &I::descriptor())
    }

    /// The storage of the view as a sequence of type-erased elements.
    #[must_use]
    pub fn sequence(&self) -> &Sequence<Object> {
        &self.sequence
    }

    /// Whether this view and `other` read and write the same storage.
    #[must_use]
    pub fn shares_storage_with<J>(&self, other: &View<J>) -> bool
    where
        J: ?Sized,
    {
        self.sequence.shares_storage_with(&other.sequence)
    }
}

impl<I> Clone for View<I>
where
    I: ?Sized,
{
    /// Creates a new header over the same storage, with the same length.
    fn clone(&self) -> Self {
        Self {
            sequence: self.sequence.clone(),
            origin: self.origin.clone(),
            _claim: PhantomData,
        }
    }
}

impl<I> Default for View<I>
where
    I: ?Sized + Described,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I> fmt::Debug for View<I>
where
    I: ?Sized + Described,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("claim", &TypeTag::of::<I>())
            .field("origin", &self.origin.tag())
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// One element of a [`View<I>`].
///
/// Holding an item does not imply the element implements `I`. That is checked when the item is
/// used via [`capability()`][Self::capability].
pub struct Item<I>
where
    I: ?Sized,
{
    index: usize,
    object: Option<Object>,

    _claim: PhantomData<fn() -> Arc<I>>,
}

impl<I> Item<I>
where
    I: ?Sized + Described,
{
    fn new(index: usize, object: Option<Object>) -> Self {
        Self {
            index,
            object,
            _claim: PhantomData,
        }
    }

    /// The index of the element within the view it came from.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The type-erased element, or `None` if the slot was never written.
    #[must_use]
    pub fn object(&self) -> Option<&Object> {
        self.object.as_ref()
    }

    /// The concrete type of the element, or `None` if the slot was never written.
    #[must_use]
    pub fn type_tag(&self) -> Option<TypeTag> {
        self.object.as_ref().map(Object::type_tag)
    }

    /// Uses the element as `I`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityViolation::NotImplemented`] if the concrete type of the element does
    /// not implement `I` and [`CapabilityViolation::Vacant`] if the slot was never written.
    pub fn capability(&self) -> Result<Arc<I>, CapabilityViolation> {
        let interface = TypeTag::of::<I>().type_name();

        let Some(object) = &self.object else {
            return Err(CapabilityViolation::Vacant {
                index: self.index,
                interface,
            });
        };

        object
            .resolve::<I>()
            .ok_or_else(|| CapabilityViolation::NotImplemented {
                index: self.index,
                concrete_type: object.type_tag().type_name(),
                interface,
            })
    }
}

impl<I> fmt::Debug for Item<I>
where
    I: ?Sized + Described,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("index", &self.index)
            .field("claim", &TypeTag::of::<I>())
            .field("object", &self.object)
            .finish()
    }
}

/// Reinterprets a view of `T1` as a view of `T2` over the same storage, without copying.
///
/// Both types must be interfaces and one must be substitutable for the other. The result has
/// the same length and capacity as the input and shares its storage. No element is checked
/// against `T2`.
///
/// Two regimes are accepted, with different risks for the caller:
///
/// * [`Variance::Covariant`] (`T1` is narrower, e.g. `Cat` to `Animal`): every element can be
///   used as `T2`. Appending through the new view may put values into the shared storage that
///   do not implement `T1`; using such an element through a `T1` view later fails with a
///   [`CapabilityViolation`] at that point.
/// * [`Variance::Contravariant`] (`T1` is broader, e.g. `Animal` to `Cat`): elements are only
///   known to implement `T1`, so using an element through the new view fails with a
///   [`CapabilityViolation`] unless that element happens to implement `T2`.
///
/// # Errors
///
/// Returns [`TypeConfigurationError::NotPolymorphic`] if either type is not an interface and
/// [`TypeConfigurationError::Incompatible`] if neither type is substitutable for the other.
///
/// # Example
///
/// ```rust
/// use variant_view::{CapabilityViolation, View, cast_view, implements, interface};
///
/// trait Animal {}
/// trait Cat: Animal {
///     fn meow(&self) -> &'static str;
/// }
///
/// interface!(Animal; Cat: Animal);
///
/// struct Tabby;
/// struct Beagle;
///
/// impl Animal for Tabby {}
/// impl Cat for Tabby {
///     fn meow(&self) -> &'static str {
///         "meow"
///     }
/// }
/// impl Animal for Beagle {}
///
/// implements!(Tabby: dyn Cat, dyn Animal);
/// implements!(Beagle: dyn Animal);
///
/// let mut cats = View::<dyn Cat>::with_capacity(2);
/// cats.push(Tabby);
///
/// // Covariant: every cat is an animal.
/// let mut animals = cast_view::<dyn Cat, dyn Animal>(cats.clone()).unwrap();
/// assert!(animals.shares_storage_with(&cats));
///
/// // Appending a dog through the animal view writes into storage the cat view can reach.
/// animals.push(Beagle);
///
/// let cats = cats.reslice(2);
/// assert_eq!(cats.get(0).unwrap().capability().unwrap().meow(), "meow");
/// assert!(matches!(
///     cats.get(1).unwrap().capability(),
///     Err(CapabilityViolation::NotImplemented { index: 1, .. })
/// ));
/// ```
pub fn cast_view<T1, T2>(input: View<T1>) -> Result<View<T2>, TypeConfigurationError>
where
    T1: ?Sized + Described,
    T2: ?Sized + Described,
{
    let variance = Variance::of::<T1, T2>()?;

    if variance == Variance::Contravariant {
        tracing::warn!(
            source = %TypeTag::of::<T1>(),
            target = %TypeTag::of::<T2>(),
            len = input.len(),
            "created contravariant view; elements may not implement the target interface"
        );
    } else {
        tracing::debug!(
            source = %TypeTag::of::<T1>(),
            target = %TypeTag::of::<T2>(),
            ?variance,
            len = input.len(),
            "cast view"
        );
    }

    Ok(View {
        sequence: input.sequence,
        origin: input.origin,
        _claim: PhantomData,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::CastRole;

    trait Vehicle {
        fn wheels(&self) -> u32;
    }

    trait Car: Vehicle {
        fn doors(&self) -> u32;
    }

    trait Boat: Vehicle {}

    crate::interface! {
        Vehicle;
        Car: Vehicle;
        Boat: Vehicle;
    }

    struct Sedan;

    impl Vehicle for Sedan {
        fn wheels(&self) -> u32 {
            4
        }
    }

    impl Car for Sedan {
        fn doors(&self) -> u32 {
            4
        }
    }

    struct Bicycle;

    impl Vehicle for Bicycle {
        fn wheels(&self) -> u32 {
            2
        }
    }

    crate::implements!(Sedan: dyn Car, dyn Vehicle);
    crate::implements!(Bicycle: dyn Vehicle);

    assert_impl_all!(View<dyn Car>: Send, Sync, Clone, Debug, Default);
    assert_impl_all!(Item<dyn Car>: Send, Sync, Debug);

    #[test]
    fn new_view_is_empty() {
        let view = View::<dyn Vehicle>::new();

        assert!(view.is_empty());
        assert_eq!(view.capacity(), 0);
        assert!(view.get(0).is_none());
        assert_eq!(view.variance(), Some(Variance::Invariant));
        assert_eq!(view.origin(), &<dyn Vehicle>::descriptor());
    }

    #[test]
    fn push_and_use_elements() {
        let mut vehicles = View::<dyn Vehicle>::new();
        vehicles.push(Sedan);
        vehicles.push(Bicycle);

        let wheels = vehicles
            .iter()
            .map(|item| item.capability().map(|vehicle| vehicle.wheels()))
            .collect::<Result<Vec<_>, _>>();

        assert_eq!(wheels, Ok(vec![4, 2]));
    }

    #[test]
    fn alloc_in_uses_registry_capacity() {
        let registry = TypeRegistry::builder().initial_capacity(3).build();

        let view = View::<dyn Car>::alloc_in(&registry);

        assert_eq!(view.capacity(), 3);
        assert!(registry.contains::<Object>());
    }

    #[test]
    fn cast_preserves_storage_length_and_capacity() {
        let mut cars = View::<dyn Car>::with_capacity(5);
        cars.push(Sedan);
        cars.push(Sedan);

        let vehicles = cars.cast::<dyn Vehicle>().expect("every car is a vehicle");

        assert!(vehicles.shares_storage_with(&cars));
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles.capacity(), 5);
        assert_eq!(vehicles.origin(), &<dyn Car>::descriptor());
        assert_eq!(vehicles.variance(), Some(Variance::Covariant));
    }

    #[test]
    fn cast_to_sibling_is_rejected() {
        let cars = View::<dyn Car>::new();

        let result = cast_view::<dyn Car, dyn Boat>(cars);

        assert!(matches!(
            result,
            Err(TypeConfigurationError::Incompatible { .. })
        ));
    }

    #[test]
    fn cast_from_concrete_is_rejected() {
        let sedans = View::<Sedan>::new();

        let result = cast_view::<Sedan, dyn Vehicle>(sedans);

        assert!(matches!(
            result,
            Err(TypeConfigurationError::NotPolymorphic {
                role: CastRole::Source,
                ..
            })
        ));
    }

    #[test]
    fn concrete_view_resolves_concrete_type() {
        let mut sedans = View::<Sedan>::new();
        sedans.push(Sedan);

        let sedan = sedans
            .get(0)
            .expect("in bounds")
            .capability()
            .expect("element is a sedan");

        assert_eq!(sedan.doors(), 4);
    }

    #[test]
    fn contravariant_view_fails_only_on_use() {
        let mut vehicles = View::<dyn Vehicle>::with_capacity(2);
        vehicles.push(Bicycle);

        let cars = cast_view::<dyn Vehicle, dyn Car>(vehicles).expect("cars are vehicles");
        assert_eq!(cars.variance(), Some(Variance::Contravariant));

        let item = cars.get(0).expect("in bounds");
        assert_eq!(item.type_tag(), Some(TypeTag::of::<Bicycle>()));

        assert_eq!(
            item.capability().map(|car| car.doors()),
            Err(CapabilityViolation::NotImplemented {
                index: 0,
                concrete_type: TypeTag::of::<Bicycle>().type_name(),
                interface: TypeTag::of::<dyn Car>().type_name(),
            })
        );
    }

    #[test]
    fn push_object_checks_claim() {
        let mut cars = View::<dyn Car>::new();

        let rejected = cars.push_object(Object::new(Bicycle));

        assert!(matches!(
            rejected,
            Err(CapabilityViolation::NotImplemented { index: 0, .. })
        ));
        assert!(cars.is_empty());

        cars.push_object(Object::new(Sedan)).expect("sedan is a car");
        assert_eq!(cars.len(), 1);
    }

    #[test]
    fn resliced_vacant_slot_is_reported() {
        let mut cars = View::<dyn Car>::with_capacity(2);
        cars.push(Sedan);

        let extended = cars.reslice(2);
        let item = extended.get(1).expect("in bounds after reslice");

        assert!(item.object().is_none());
        assert!(item.type_tag().is_none());
        assert!(matches!(
            item.capability(),
            Err(CapabilityViolation::Vacant { index: 1, .. })
        ));
    }

    #[test]
    fn chained_casts_can_leave_origin_unrelated() {
        let cars = View::<dyn Car>::new();

        let boats = cars
            .cast::<dyn Vehicle>()
            .and_then(|vehicles| vehicles.cast::<dyn Boat>())
            .expect("each step is a valid cast");

        assert_eq!(boats.origin(), &<dyn Car>::descriptor());
        assert_eq!(boats.variance(), None);
    }

    #[test]
    fn debug_names_claim_and_origin() {
        let cars = View::<dyn Car>::new();
        let vehicles = cars.cast::<dyn Vehicle>().expect("every car is a vehicle");

        let debug_output = format!("{vehicles:?}");

        assert!(debug_output.contains("Vehicle"));
        assert!(debug_output.contains("Car"));
    }
}
