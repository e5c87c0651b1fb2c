use std::{
    cell::{Ref, RefCell, RefMut},
    fmt::{Debug, Error, Formatter},
    rc::Rc,
};

/// Shared single-threaded ownership with interior mutability. This is the
/// only sharing primitive in the crate; the resolution model is cooperative
/// and synchronous, so `Rc<RefCell<T>>` is sufficient.
pub struct Container<T>(Rc<RefCell<T>>);

impl<T> Container<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Pointer identity, ignoring the contained value.
    pub fn same_identity(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for Container<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Debug> Debug for Container<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        self.0.borrow().fmt(f)
    }
}

impl<T: PartialEq> PartialEq for Container<T> {
    fn eq(&self, other: &Self) -> bool {
        // Identity short-circuits so self-referential structures compare
        // without borrowing the same cell twice.
        Rc::ptr_eq(&self.0, &other.0) || *self.0.borrow() == *other.0.borrow()
    }
}

impl<T: Default> Default for Container<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
