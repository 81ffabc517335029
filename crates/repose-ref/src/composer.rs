use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::{RefError, Slot, dispatch};

pub type SlotList<T> = SmallVec<[Slot<T>; 4]>;

struct RefState<T> {
    /// Last value pushed through the notifier.
    current: Option<T>,
    /// Slots registered by the last `apply`. `None` until the first cycle.
    previous: Option<SlotList<T>>,
}

/// Pushes the composed value to every registered slot.
///
/// A composer hands out the same notifier on every cycle, so hosts that
/// memoize on callback identity see a stable handle. Equality is identity.
pub struct Notifier<T>(Rc<RefCell<RefState<T>>>);

impl<T: Clone + 'static> Notifier<T> {
    /// Stores `value` then dispatches it to the registered slots in list
    /// order. Stops at the first slot that fails.
    pub fn notify(&self, value: Option<T>) -> Result<(), RefError> {
        let slots = {
            let mut state = self.0.borrow_mut();
            state.current = value.clone();
            state.previous.clone().unwrap_or_default()
        };
        for (i, slot) in slots.iter().enumerate() {
            dispatch(slot, value.clone()).map_err(|e| e.at(i))?;
        }
        Ok(())
    }

    pub fn set(&self, value: T) -> Result<(), RefError> {
        self.notify(Some(value))
    }

    pub fn clear(&self) -> Result<(), RefError> {
        self.notify(None)
    }

    pub fn current(&self) -> Option<T> {
        self.0.borrow().current.clone()
    }
}

impl<T> Notifier<T> {
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for Notifier<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> PartialEq for Notifier<T> {
    fn eq(&self, other: &Self) -> bool {
        Notifier::ptr_eq(self, other)
    }
}

impl<T> Eq for Notifier<T> {}

impl<T> std::fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Notifier({:p})", Rc::as_ptr(&self.0))
    }
}

/// Composes any number of ref slots into one notifier.
///
/// Call [`RefComposer::apply`] once per update cycle with the slots of that
/// cycle and attach the returned [`Notifier`] where a single ref is
/// expected. Only slots that changed since the previous cycle are touched:
/// the old occupant is cleared, then the new one receives the current value.
///
/// Clones share history. One composer serves one consumer; see
/// [`crate::shared_ref_composer`] for the shared variant.
pub struct RefComposer<T> {
    notifier: Notifier<T>,
}

impl<T: Clone + 'static> RefComposer<T> {
    pub fn new() -> Self {
        Self {
            notifier: Notifier(Rc::new(RefCell::new(RefState {
                current: None,
                previous: None,
            }))),
        }
    }

    /// Registers the slots for this cycle and returns the notifier.
    ///
    /// The slot count is fixed after the first cycle; a different count
    /// fails with [`RefError::ArityMismatch`] before any slot is touched.
    /// Use [`Slot::Empty`] to leave a position unused.
    ///
    /// If a dispatch fails, slots already attached stay registered. On a
    /// first cycle the failing and unreached positions are registered as
    /// empty.
    pub fn apply<I>(&self, slots: I) -> Result<Notifier<T>, RefError>
    where
        I: IntoIterator<Item = Slot<T>>,
    {
        let new: SlotList<T> = slots.into_iter().collect();
        let state = &self.notifier.0;

        // No borrow is held while dispatching: slots may call back into us.
        let (previous, current) = {
            let s = state.borrow();
            (s.previous.clone(), s.current.clone())
        };

        match previous {
            None => {
                if current.is_some() {
                    // Positions count as empty until their slot has been
                    // attached, so a failed pass leaves a usable history.
                    state.borrow_mut().previous =
                        Some(new.iter().map(|_| Slot::Empty).collect());
                    for (i, slot) in new.iter().enumerate() {
                        dispatch(slot, current.clone()).map_err(|e| e.at(i))?;
                        let mut s = state.borrow_mut();
                        if let Some(entry) = s.previous.as_mut().and_then(|p| p.get_mut(i)) {
                            *entry = slot.clone();
                        }
                    }
                }
                log::trace!("ref composer: first cycle with {} slots", new.len());
            }
            Some(old) => {
                if old.len() != new.len() {
                    return Err(RefError::ArityMismatch {
                        old: old.len(),
                        new: new.len(),
                    });
                }

                let changed: SmallVec<[usize; 4]> = (0..new.len())
                    .filter(|&i| !Slot::same(&old[i], &new[i]))
                    .collect();

                // Detach everything before attaching anything.
                for &i in &changed {
                    dispatch(&old[i], None).map_err(|e| e.at(i))?;
                }

                for &i in &changed {
                    let value = {
                        let mut s = state.borrow_mut();
                        if let Some(entry) = s.previous.as_mut().and_then(|p| p.get_mut(i)) {
                            *entry = new[i].clone();
                        }
                        s.current.clone()
                    };
                    dispatch(&new[i], value).map_err(|e| e.at(i))?;
                }

                log::trace!(
                    "ref composer: {} of {} slots changed",
                    changed.len(),
                    new.len()
                );
            }
        }

        state.borrow_mut().previous = Some(new);
        Ok(self.notifier.clone())
    }

    /// The notifier `apply` returns, available without running a cycle.
    pub fn notifier(&self) -> Notifier<T> {
        self.notifier.clone()
    }

    pub fn current(&self) -> Option<T> {
        self.notifier.current()
    }

    /// Slot count fixed by the first cycle, if one has run.
    pub fn arity(&self) -> Option<usize> {
        self.notifier.0.borrow().previous.as_ref().map(|p| p.len())
    }
}

impl<T: Clone + 'static> Default for RefComposer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RefComposer<T> {
    fn clone(&self) -> Self {
        Self {
            notifier: self.notifier.clone(),
        }
    }
}

/// Creates an independent composer for one consumer.
pub fn create_ref_composer<T: Clone + 'static>() -> RefComposer<T> {
    RefComposer::new()
}

/// Variadic form of [`RefComposer::apply`].
///
/// Each argument goes through `Slot::from`, so `&ViewRef`, `RefCallback`,
/// `Option<_>` and `Slot` values can be mixed.
#[macro_export]
macro_rules! compose_refs {
    ($composer:expr $(, $slot:expr)* $(,)?) => {
        $composer.apply([$($crate::Slot::from($slot)),*])
    };
}
