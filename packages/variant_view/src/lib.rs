#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Reinterprets a sequence of one interface type as a sequence of a related interface type,
//! sharing the storage instead of copying it.
//!
//! Interfaces are trait object types such as `dyn Animal`, declared via [`interface!`]. Concrete
//! types declare the interfaces they implement via [`implements!`]. Values are stored in a
//! [`View<I>`], which claims that every element implements `I`.
//!
//! [`cast_view()`] turns a `View<T1>` into a `View<T2>` over the same storage when `T1` and `T2`
//! are related interfaces. The relation determines the [`Variance`] of the resulting view:
//!
//! * **Covariant** (`Cat` to `Animal`): reading is sound. Writing through the broader view can
//!   place values in the shared storage that the narrower view does not expect.
//! * **Contravariant** (`Animal` to `Cat`): elements are only known to be animals, so using one
//!   as a cat may fail.
//!
//! Casts between unrelated interfaces or involving concrete types are rejected with a
//! [`TypeConfigurationError`]. Casts themselves never inspect elements. When an element is used
//! through an interface it does not implement, that use reports a [`CapabilityViolation`].
//!
//! # Example
//!
//! ```rust
//! use variant_view::{Variance, View, cast_view, implements, interface};
//!
//! trait Animal {
//!     fn name(&self) -> String;
//! }
//!
//! trait Cat: Animal {
//!     fn meow(&self) -> String;
//! }
//!
//! interface!(Animal; Cat: Animal);
//!
//! struct Tabby;
//!
//! impl Animal for Tabby {
//!     fn name(&self) -> String {
//!         "tabby".to_string()
//!     }
//! }
//!
//! impl Cat for Tabby {
//!     fn meow(&self) -> String {
//!         "meow".to_string()
//!     }
//! }
//!
//! implements!(Tabby: dyn Cat, dyn Animal);
//!
//! let mut cats = View::<dyn Cat>::new();
//! cats.push(Tabby);
//!
//! let animals = cast_view::<dyn Cat, dyn Animal>(cats.clone()).unwrap();
//!
//! assert_eq!(animals.variance(), Some(Variance::Covariant));
//! assert!(animals.shares_storage_with(&cats));
//!
//! for animal in animals.iter() {
//!     assert_eq!(animal.capability().unwrap().name(), "tabby");
//! }
//! ```
//!
//! # Storage
//!
//! Views allocate their storage either directly or from the object pool of a
//! [`TypeRegistry`][type_pool::TypeRegistry] via [`View::alloc_in()`]. Storage follows the
//! aliasing rules of [`type_pool::Sequence`]: appending within capacity writes into shared
//! storage, appending beyond capacity moves the appending view to new storage.

mod descriptor;
mod error;
mod object;
mod variance;
mod view;

pub use descriptor::*;
pub use error::*;
pub use object::*;
pub use type_pool::TypeTag;
pub use variance::*;
pub use view::*;
