use core::fmt;

/// An error returned from the checked accessors, such as
/// [`ExclusiveOwner::try_get`](crate::ExclusiveOwner::try_get) and
/// [`SharedOwner::try_get`](crate::SharedOwner::try_get), when the owner is empty.
///
/// An owner is empty when it was created without an object or when its object was
/// transferred to another owner.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct EmptyOwnerError;

impl fmt::Display for EmptyOwnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "dereferenced an empty owner".fmt(f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EmptyOwnerError {}
