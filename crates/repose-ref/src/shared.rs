//! One composer per value type, shared by every caller on the thread.
//!
//! The shared composer keeps a single history. A consumer must finish its
//! `apply`/`notify` sequence before another consumer starts one; interleaving
//! two consumers makes each one's slots diff against the other's. Nothing
//! here locks or detects that, and the composer stays `!Send`.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::RefComposer;

thread_local! {
    static SHARED: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Handle to the thread's shared composer for `T`.
pub fn shared_ref_composer<T: Clone + 'static>() -> RefComposer<T> {
    SHARED.with(|s| {
        let mut s = s.borrow_mut();
        let id = TypeId::of::<T>();

        if let Some(existing) = s
            .get(&id)
            .and_then(|b| b.downcast_ref::<RefComposer<T>>())
        {
            return existing.clone();
        }

        let composer = RefComposer::<T>::new();
        s.insert(id, Box::new(composer.clone()));
        composer
    })
}

/// Forgets the shared history for `T`. Handles obtained earlier keep the old
/// history; later calls to [`shared_ref_composer`] start from scratch.
pub fn reset_shared_ref_composer<T: 'static>() {
    let removed = SHARED.with(|s| s.borrow_mut().remove(&TypeId::of::<T>()));
    drop(removed);
}
