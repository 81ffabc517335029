use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::RefError;

pub type RefCallback<T> = Rc<dyn Fn(Option<T>)>;

/// Shared holder a composer can write a handle into.
///
/// Clones point at the same cell, so a `ViewRef` kept by a parent sees the
/// value written through the clone handed to a composer.
pub struct ViewRef<T>(Rc<RefCell<Option<T>>>);

impl<T> ViewRef<T> {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: Option<T>) {
        *self.0.borrow_mut() = value;
    }

    pub fn take(&self) -> Option<T> {
        self.0.borrow_mut().take()
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for ViewRef<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Default for ViewRef<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ViewRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewRef").field(&*self.0.borrow()).finish()
    }
}

pub fn view_ref<T>() -> ViewRef<T> {
    ViewRef::new()
}

/// One ref target in a composed list.
///
/// Slots are compared by identity only: two callbacks wrapping the same
/// closure body are still different slots unless they share an `Rc`.
pub enum Slot<T> {
    Callback(RefCallback<T>),
    Cell(ViewRef<T>),
    /// Type-erased target handed over by a dynamic host. Resolved on
    /// dispatch: a `RefCell<Option<T>>` or `ViewRef<T>` acts as a cell, a
    /// `RefCallback<T>` as a callback, `()` or `None::<Slot<T>>` as empty and
    /// `Some(slot)` as the wrapped slot. Anything else is rejected, so hosts
    /// with other "absent" markers must map them to `Slot::Empty` first.
    Dynamic(Rc<dyn Any>),
    Empty,
}

impl<T> Slot<T> {
    pub fn callback(f: impl Fn(Option<T>) + 'static) -> Self {
        Slot::Callback(Rc::new(f))
    }

    pub fn dynamic(value: impl Any) -> Self {
        Slot::Dynamic(Rc::new(value))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Identity comparison. Any two empty slots are the same slot.
    pub fn same(a: &Self, b: &Self) -> bool {
        match (a, b) {
            (Slot::Empty, Slot::Empty) => true,
            (Slot::Callback(a), Slot::Callback(b)) => Rc::ptr_eq(a, b),
            (Slot::Cell(a), Slot::Cell(b)) => ViewRef::ptr_eq(a, b),
            (Slot::Dynamic(a), Slot::Dynamic(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        match self {
            Slot::Callback(f) => Slot::Callback(f.clone()),
            Slot::Cell(cell) => Slot::Cell(cell.clone()),
            Slot::Dynamic(any) => Slot::Dynamic(any.clone()),
            Slot::Empty => Slot::Empty,
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Callback(cb) => write!(f, "Callback({:p})", Rc::as_ptr(cb) as *const ()),
            Slot::Cell(cell) => write!(f, "Cell({:p})", Rc::as_ptr(&cell.0)),
            Slot::Dynamic(any) => write!(f, "Dynamic({:p})", Rc::as_ptr(any) as *const ()),
            Slot::Empty => f.write_str("Empty"),
        }
    }
}

impl<T> From<ViewRef<T>> for Slot<T> {
    fn from(cell: ViewRef<T>) -> Self {
        Slot::Cell(cell)
    }
}

impl<T> From<&ViewRef<T>> for Slot<T> {
    fn from(cell: &ViewRef<T>) -> Self {
        Slot::Cell(cell.clone())
    }
}

impl<T> From<RefCallback<T>> for Slot<T> {
    fn from(f: RefCallback<T>) -> Self {
        Slot::Callback(f)
    }
}

impl<T> From<&RefCallback<T>> for Slot<T> {
    fn from(f: &RefCallback<T>) -> Self {
        Slot::Callback(f.clone())
    }
}

/// `None` becomes `Slot::Empty`, so targets can be omitted conditionally
/// without changing the arity of the list.
impl<T, S: Into<Slot<T>>> From<Option<S>> for Slot<T> {
    fn from(slot: Option<S>) -> Self {
        slot.map_or(Slot::Empty, Into::into)
    }
}

/// Delivers `value` to one slot. `None` clears it.
///
/// Panics raised by a callback propagate to the caller.
pub fn dispatch<T: 'static>(slot: &Slot<T>, value: Option<T>) -> Result<(), RefError> {
    match slot {
        Slot::Empty => {}
        Slot::Callback(f) => f(value),
        Slot::Cell(cell) => cell.set(value),
        Slot::Dynamic(any) => {
            if let Some(cell) = any.downcast_ref::<RefCell<Option<T>>>() {
                *cell.borrow_mut() = value;
            } else if let Some(cell) = any.downcast_ref::<ViewRef<T>>() {
                cell.set(value);
            } else if let Some(f) = any.downcast_ref::<RefCallback<T>>() {
                f(value);
            } else if let Some(slot) = any.downcast_ref::<Option<Slot<T>>>() {
                if let Some(slot) = slot {
                    return dispatch(slot, value);
                }
            } else if !any.is::<()>() {
                return Err(RefError::InvalidSlot { position: None });
            }
        }
    }
    Ok(())
}
