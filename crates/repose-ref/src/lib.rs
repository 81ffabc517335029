//! # Ref composition
//!
//! A view hands out one ref, but several parties often want the handle: the
//! component itself, a parent that forwarded a `ViewRef`, a focus helper
//! passing a callback. `RefComposer` merges them. Each update cycle the host
//! passes the current list of slots to `apply` and attaches the returned
//! `Notifier` to the view.
//!
//! ```rust
//! use repose_ref::*;
//!
//! let composer = RefComposer::<u64>::new();
//! let own = view_ref::<u64>();
//! let forwarded = view_ref::<u64>();
//!
//! let notifier = compose_refs!(composer, &own, &forwarded)?;
//! notifier.set(7)?;
//! assert_eq!(own.get(), Some(7));
//! assert_eq!(forwarded.get(), Some(7));
//! # Ok::<(), RefError>(())
//! ```
//!
//! ## Diffing
//!
//! Slots are compared position by position, by identity. On the next cycle:
//!
//! - an unchanged slot is not notified at all;
//! - a replaced slot first gets `None`, and only after every replaced slot
//!   has been cleared do the new occupants receive the current value.
//!
//! ```rust
//! use repose_ref::*;
//!
//! let composer = RefComposer::<u64>::new();
//! let a = view_ref::<u64>();
//! let b = view_ref::<u64>();
//! let c = view_ref::<u64>();
//!
//! compose_refs!(composer, &a, &b)?.set(1)?;
//! compose_refs!(composer, &a, &c)?;
//! assert_eq!(b.get(), None);
//! assert_eq!(c.get(), Some(1));
//! # Ok::<(), RefError>(())
//! ```
//!
//! The number of slots is fixed by the first cycle. Pass `None` (or
//! `Slot::Empty`) for a target that is absent this time; a changing count
//! is reported as `RefError::ArityMismatch`.
//!
//! ## Binding a composer
//!
//! - `RefComposer::new` / `create_ref_composer`: owned by one consumer.
//! - `remember_ref_composer`: bound to a call position inside a composition
//!   pass, the usual choice inside a component.
//! - `shared_ref_composer`: one per value type on the thread, for callers
//!   that run strictly one after another.

pub mod composer;
pub mod error;
pub mod prelude;
pub mod runtime;
pub mod shared;
pub mod slot;
pub mod tests;

pub use composer::*;
pub use error::*;
pub use runtime::*;
pub use shared::*;
pub use slot::*;
