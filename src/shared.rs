use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;

use crate::alloc::boxed::Box;
use crate::errors::EmptyOwnerError;
use crate::slot::HeapSlot;

/// A reference-counted owner of a heap-allocated `T`.
///
/// Every [`clone`](Clone::clone) joins the same sharing group and increments a counter that
/// lives in its own heap allocation. Dropping an owner decrements the counter, and the owner
/// that brings it to zero deletes both the object and the counter.
///
/// An empty owner never allocates a counter: its [`use_count`](Self::use_count) is 0 and its
/// clones are empty as well.
///
/// The counter is not atomic, so owners cannot cross threads:
///
/// ```compile_fail
/// let owner = scoped_owners::SharedOwner::new(1);
/// std::thread::spawn(move || drop(owner));
/// ```
pub struct SharedOwner<T> {
    // Invariant: both slots are empty, or both point to live allocations.
    object: HeapSlot<T>,
    count: HeapSlot<Cell<usize>>,

    _t: PhantomData<T>,
}

impl<T> SharedOwner<T> {
    /// Moves `value` to the heap and becomes its first owner.
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Creates an owner that holds nothing and allocates nothing.
    pub const fn empty() -> Self {
        SharedOwner {
            object: HeapSlot::empty(),
            count: HeapSlot::empty(),
            _t: PhantomData,
        }
    }

    /// Takes ownership of an existing heap allocation and becomes its first owner.
    pub fn from_box(value: Box<T>) -> Self {
        Self::adopt(HeapSlot::from_box(value))
    }

    /// Takes ownership of a raw heap pointer. A null pointer creates an empty owner.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must come from [`Box::into_raw`] (or an equivalent leak of a `Box<T>`),
    /// and the caller must not use or free it afterwards.
    pub unsafe fn from_raw(raw: *mut T) -> Self {
        // SAFETY: Forwarded to our caller.
        Self::adopt(unsafe { HeapSlot::from_raw(raw) })
    }

    fn adopt(object: HeapSlot<T>) -> Self {
        if object.is_empty() {
            return Self::empty();
        }

        let count = HeapSlot::from_box(Box::new(Cell::new(1)));
        log::trace!("shared owner allocated counter {:?} for {:?}", count, object);

        SharedOwner {
            object,
            count,
            _t: PhantomData,
        }
    }

    /// Returns the number of owners in this owner's sharing group, or 0 if it is empty.
    pub fn use_count(&self) -> usize {
        self.counter().map_or(0, Cell::get)
    }

    /// Returns `true` if this owner holds no object.
    pub const fn is_empty(&self) -> bool {
        self.object.is_empty()
    }

    /// Returns `true` if this owner holds an object.
    pub const fn is_owning(&self) -> bool {
        !self.object.is_empty()
    }

    /// Returns the raw pointer to the object, or null if the owner is empty.
    ///
    /// The sharing group keeps ownership; the pointer must not be freed by the caller.
    pub fn as_ptr(&self) -> *const T {
        self.object.as_ptr()
    }

    /// Returns `true` if both owners point to the same object. Two empty owners are equal.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.object.same_allocation(&other.object)
    }

    /// Returns a reference to the object, if any.
    pub fn get(&self) -> Option<&T> {
        // SAFETY: While we are part of the group the count is at least 1, so nobody releases the
        // object, and mutable borrows are only handed out to a sole owner through `&mut self`.
        unsafe { self.object.as_ref() }
    }

    /// Returns a reference to the object, or an error if the owner is empty.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyOwnerError`] if the owner holds no object.
    pub fn try_get(&self) -> Result<&T, EmptyOwnerError> {
        self.get().ok_or(EmptyOwnerError)
    }

    /// Returns a reference to the object without checking for emptiness.
    ///
    /// # Safety
    ///
    /// The owner must not be empty.
    pub unsafe fn get_unchecked(&self) -> &T {
        // SAFETY: The caller guarantees that the pointer is non-null; see `get()` for liveness.
        unsafe { &*self.object.as_ptr() }
    }

    /// Returns a mutable reference to the object if this is its only owner.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.use_count() != 1 {
            return None;
        }

        // SAFETY: No other owner exists and `&mut self` rules out other borrows through this one.
        unsafe { self.object.as_mut() }
    }

    /// Transfers this owner's share into a new owner, leaving this one empty.
    /// The count does not change.
    pub fn take(&mut self) -> Self {
        SharedOwner {
            object: self.object.take(),
            count: self.count.take(),
            _t: PhantomData,
        }
    }

    /// Releases the current share (if any), then adopts the share of `source` verbatim,
    /// leaving `source` empty. The count of `source`'s group does not change.
    pub fn transfer_from(&mut self, source: &mut Self) {
        self.release();
        self.object = source.object.take();
        self.count = source.count.take();
        log::trace!("shared owner adopted {:?} (count {})", self.object, self.use_count());
    }

    /// Releases this owner's share and leaves it empty.
    ///
    /// If this was the last owner, the object and its counter are deleted.
    pub fn reset(&mut self) {
        self.release();
    }

    /// Returns the object if this is its only owner, or gives the owner back otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged if the owner is empty or other owners share the object.
    pub fn try_unwrap(mut self) -> Result<T, Self> {
        if self.use_count() != 1 {
            return Err(self);
        }

        // SAFETY: We are the last owner; both slots are left empty so `Drop` releases nothing.
        let object = unsafe { self.object.into_box() };
        // SAFETY: The counter belongs to our group alone and nothing reads it after this.
        unsafe { self.count.release() };

        match object {
            Some(object) => Ok(*object),
            // A count of 1 implies an object.
            None => Err(self),
        }
    }

    fn counter(&self) -> Option<&Cell<usize>> {
        // SAFETY: The counter lives as long as the group and is only mutated through `Cell`.
        unsafe { self.count.as_ref() }
    }

    /// Leaves the sharing group. The last owner out deletes the object and the counter.
    fn release(&mut self) {
        let Some(count) = self.counter() else {
            return;
        };

        let remaining = count.get() - 1;
        count.set(remaining);

        if remaining == 0 {
            log::trace!("shared owner deleting {:?} and counter {:?}", self.object, self.count);
            // SAFETY: The count reached zero, so no other owner refers to either allocation
            // and both slots are left empty.
            unsafe {
                self.object.release();
                self.count.release();
            }
        } else {
            self.object = HeapSlot::empty();
            self.count = HeapSlot::empty();
        }
    }
}

impl<T> Clone for SharedOwner<T> {
    /// # Panics
    ///
    /// Panics if the reference count would overflow `usize`.
    fn clone(&self) -> Self {
        if let Some(count) = self.counter() {
            // A wrapped count would let a later drop free the object under the other owners.
            let Some(next) = count.get().checked_add(1) else {
                panic!("reference count overflow");
            };
            count.set(next);
        }

        SharedOwner {
            object: self.object.clone(),
            count: self.count.clone(),
            _t: PhantomData,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        // Owners of the same group already count each other.
        if self.count.same_allocation(&source.count) {
            return;
        }

        self.release();
        *self = source.clone();
    }
}

impl<T> Drop for SharedOwner<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Default for SharedOwner<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Box<T>> for SharedOwner<T> {
    fn from(value: Box<T>) -> Self {
        Self::from_box(value)
    }
}

impl<T> Deref for SharedOwner<T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the owner is empty.
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("{}", EmptyOwnerError),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedOwner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f
                .debug_struct("SharedOwner")
                .field("value", value)
                .field("use_count", &self.use_count())
                .finish(),
            None => f.write_str("SharedOwner(<empty>)"),
        }
    }
}

impl<T> fmt::Pointer for SharedOwner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}
