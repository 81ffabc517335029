use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::RefComposer;

thread_local! {
    pub static COMPOSER: RefCell<Composer> = RefCell::new(Composer::default());
}

/// Positional and keyed storage that survives recomposition.
#[derive(Default)]
pub struct Composer {
    pub slots: Vec<Box<dyn Any>>,
    pub cursor: usize,
    pub keyed_slots: HashMap<String, Box<dyn Any>>,
}

/// Marks one composition pass.
///
/// `begin` rewinds the cursor so the Nth `remember` call maps to the Nth
/// stored value. On drop, positional slots the pass never reached are
/// released.
pub struct ComposeGuard {
    _private: (),
}

impl ComposeGuard {
    pub fn begin() -> Self {
        COMPOSER.with(|c| {
            c.borrow_mut().cursor = 0;
        });
        ComposeGuard { _private: () }
    }
}

impl Drop for ComposeGuard {
    fn drop(&mut self) {
        // Taken out first so slot destructors never run under the borrow.
        let released: Vec<Box<dyn Any>> = COMPOSER.with(|c| {
            let mut c = c.borrow_mut();
            let reached = c.cursor;
            if reached < c.slots.len() {
                c.slots.split_off(reached)
            } else {
                Vec::new()
            }
        });
        if !released.is_empty() {
            log::debug!("compose: released {} unreached slots", released.len());
        }
    }
}

/// Runs `f` as one composition pass.
pub fn compose<R>(f: impl FnOnce() -> R) -> R {
    let _guard = ComposeGuard::begin();
    f()
}

/// Value stored at the current call position of the composition pass.
///
/// The Nth call in a pass gets the Nth stored value, so calls must not be
/// skipped conditionally. A different type at a position replaces the value.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let cursor = c.cursor;
        c.cursor += 1;

        if cursor >= c.slots.len() {
            let rc: Rc<T> = Rc::new(init());
            c.slots.push(Box::new(rc.clone()));
            return rc;
        }

        if let Some(rc) = c.slots[cursor].downcast_ref::<Rc<T>>() {
            rc.clone()
        } else {
            log::warn!(
                "remember: slot {} type changed; replacing. \
                 If this is due to conditional composition, prefer remember_with_key.",
                cursor
            );
            let rc: Rc<T> = Rc::new(init());
            c.slots[cursor] = Box::new(rc.clone());
            rc
        }
    })
}

/// Value stored under `key`, independent of call order. Kept across passes
/// until the thread's composer is reset.
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let key = key.into();

        if let Some(existing) = c.keyed_slots.get(&key) {
            if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
                return rc.clone();
            } else {
                log::warn!(
                    "remember_with_key: key '{}' reused with a different type; replacing.",
                    key
                );
            }
        }

        let rc: Rc<T> = Rc::new(init());
        c.keyed_slots.insert(key, Box::new(rc.clone()));
        rc
    })
}

/// A composer bound to this call position.
///
/// Recompositions get the same composer back, so the slot diff runs against
/// the previous pass of the same component.
pub fn remember_ref_composer<T: Clone + 'static>() -> RefComposer<T> {
    (*remember(RefComposer::<T>::new)).clone()
}

pub fn remember_ref_composer_with_key<T: Clone + 'static>(
    key: impl Into<String>,
) -> RefComposer<T> {
    let key = format!("ref_composer:{}", key.into());
    (*remember_with_key(key, RefComposer::<T>::new)).clone()
}
