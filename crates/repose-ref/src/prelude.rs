pub use crate::composer::{Notifier, RefComposer, SlotList, create_ref_composer};
pub use crate::compose_refs;
pub use crate::error::RefError;
pub use crate::runtime::{
    ComposeGuard, compose, remember, remember_ref_composer, remember_ref_composer_with_key,
    remember_with_key,
};
pub use crate::shared::{reset_shared_ref_composer, shared_ref_composer};
pub use crate::slot::{RefCallback, Slot, ViewRef, dispatch, view_ref};
