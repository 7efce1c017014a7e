use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use crate::alloc::boxed::Box;
use crate::errors::EmptyOwnerError;
use crate::slot::HeapSlot;

/// The sole owner of a heap-allocated `T`.
///
/// The object is deleted exactly once: when the owner goes out of scope, when it is replaced
/// through [`reset`](Self::reset) or [`transfer_from`](Self::transfer_from), or never, if it was
/// handed back to the caller with [`into_raw`](Self::into_raw) or [`into_box`](Self::into_box).
///
/// Ownership can be transferred, but the owner can never be duplicated:
///
/// ```compile_fail
/// use scoped_owners::ExclusiveOwner;
///
/// let owner = ExclusiveOwner::new(1);
/// let copy: ExclusiveOwner<i32> = owner.clone();
/// ```
pub struct ExclusiveOwner<T> {
    slot: HeapSlot<T>,

    // Tells dropck that we logically own a `T`.
    _t: PhantomData<T>,
}

// SAFETY: We have unique access to the object, just like `Box<T>`.
unsafe impl<T: Send> Send for ExclusiveOwner<T> {}
// SAFETY: Shared access to the owner only ever hands out `&T`.
unsafe impl<T: Sync> Sync for ExclusiveOwner<T> {}

impl<T> ExclusiveOwner<T> {
    /// Moves `value` to the heap and takes ownership of it.
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Creates an owner that holds nothing.
    pub const fn empty() -> Self {
        ExclusiveOwner {
            slot: HeapSlot::empty(),
            _t: PhantomData,
        }
    }

    /// Takes ownership of an existing heap allocation.
    pub fn from_box(value: Box<T>) -> Self {
        ExclusiveOwner {
            slot: HeapSlot::from_box(value),
            _t: PhantomData,
        }
    }

    /// Takes ownership of a raw heap pointer. A null pointer creates an empty owner.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must come from [`Box::into_raw`] (or an equivalent leak of a `Box<T>`),
    /// and the caller must not use or free it afterwards.
    pub unsafe fn from_raw(raw: *mut T) -> Self {
        ExclusiveOwner {
            // SAFETY: Forwarded to our caller.
            slot: unsafe { HeapSlot::from_raw(raw) },
            _t: PhantomData,
        }
    }

    /// Returns `true` if this owner holds no object.
    pub const fn is_empty(&self) -> bool {
        self.slot.is_empty()
    }

    /// Returns `true` if this owner holds an object.
    pub const fn is_owning(&self) -> bool {
        !self.slot.is_empty()
    }

    /// Returns the raw pointer to the object, or null if the owner is empty.
    ///
    /// The owner keeps ownership; the pointer must not be freed by the caller.
    pub fn as_ptr(&self) -> *const T {
        self.slot.as_ptr()
    }

    /// Returns a reference to the object, if any.
    pub fn get(&self) -> Option<&T> {
        // SAFETY: Only this owner can release the slot, and that requires `&mut self`.
        unsafe { self.slot.as_ref() }
    }

    /// Returns a mutable reference to the object, if any.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: We are the only owner and `&mut self` rules out any other borrow.
        unsafe { self.slot.as_mut() }
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
        // SAFETY: The caller guarantees that the pointer is non-null and it points to a live `T`.
        unsafe { &*self.slot.as_ptr() }
    }

    /// Transfers ownership out into a new owner, leaving this one empty.
    #[must_use = "dropping the returned owner deletes the object"]
    pub fn take(&mut self) -> Self {
        ExclusiveOwner {
            slot: self.slot.take(),
            _t: PhantomData,
        }
    }

    /// Deletes the currently held object (if any), then adopts the object of `source`,
    /// leaving `source` empty.
    pub fn transfer_from(&mut self, source: &mut Self) {
        // `source` cannot alias `self` here, both are exclusive borrows.
        self.delete();
        self.slot = source.slot.take();
        log::trace!("exclusive owner adopted {:?}", self.slot);
    }

    /// Replaces the held object with the one behind `raw`, deleting the old object.
    ///
    /// Resetting an owner to the pointer it already holds does nothing.
    ///
    /// # Safety
    ///
    /// Same as [`from_raw`](Self::from_raw), unless `raw` is the pointer this owner already holds.
    pub unsafe fn reset(&mut self, raw: *mut T) {
        if raw == self.slot.as_ptr() {
            return;
        }

        self.delete();
        // SAFETY: Forwarded to our caller.
        self.slot = unsafe { HeapSlot::from_raw(raw) };
    }

    /// Gives the object back to the caller as a raw pointer without deleting it.
    ///
    /// Returns null if the owner is empty. The pointer can be turned back into an owner with
    /// [`from_raw`](Self::from_raw) or into a box with [`Box::from_raw`].
    #[must_use = "losing the pointer leaks the object"]
    pub fn into_raw(mut self) -> *mut T {
        self.slot.take().into_raw()
    }

    /// Gives the object back to the caller as a box without deleting it.
    pub fn into_box(mut self) -> Option<Box<T>> {
        // SAFETY: We are the only owner; the slot is left empty so `Drop` will not release it again.
        unsafe { self.slot.into_box() }
    }

    fn delete(&mut self) {
        if self.slot.is_empty() {
            return;
        }

        log::trace!("exclusive owner deleting {:?}", self.slot);
        // SAFETY: We are the only owner of the allocation and the slot is left empty,
        // so it cannot be released twice.
        unsafe { self.slot.release() };
    }
}

impl<T> Drop for ExclusiveOwner<T> {
    fn drop(&mut self) {
        self.delete();
    }
}

impl<T> Default for ExclusiveOwner<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Box<T>> for ExclusiveOwner<T> {
    fn from(value: Box<T>) -> Self {
        Self::from_box(value)
    }
}

impl<T> Deref for ExclusiveOwner<T> {
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

impl<T> DerefMut for ExclusiveOwner<T> {
    /// # Panics
    ///
    /// Panics if the owner is empty.
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Some(value) => value,
            None => panic!("{}", EmptyOwnerError),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ExclusiveOwner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("ExclusiveOwner").field(value).finish(),
            None => f.write_str("ExclusiveOwner(<empty>)"),
        }
    }
}

impl<T> fmt::Pointer for ExclusiveOwner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}
