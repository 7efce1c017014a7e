//! Two deterministic, scope-based owners for a single heap-allocated object.
//!
//! - [`ExclusiveOwner<T>`] is the sole owner of its object. It can be transferred but never
//!   duplicated, and it deletes the object when it goes out of scope.
//! - [`SharedOwner<T>`] shares its object with every duplicate made through [`Clone`]. The
//!   duplicates keep a reference count in a separately allocated counter cell, and the last one
//!   to go away deletes both the object and the counter cell.
//!
//! Both owners can start out empty, either by construction or because their object was
//! transferred to another owner. Dereferencing an empty owner panics; the checked accessors
//! (`get`, `try_get`) report it instead.
//!
//! ```
//! use scoped_owners::{ExclusiveOwner, SharedOwner};
//!
//! let mut first = ExclusiveOwner::new(String::from("exclusive"));
//! let second = first.take();
//! assert!(first.is_empty());
//! assert_eq!(*second, "exclusive");
//!
//! let a = SharedOwner::new(7_u32);
//! let b = a.clone();
//! assert_eq!(a.use_count(), 2);
//! drop(b);
//! assert_eq!(a.use_count(), 1);
//! ```
//!
//! # Raw pointers
//!
//! Both owners can adopt a pointer created by [`Box::into_raw`], which is how a caller hands
//! over an allocation it no longer wants to manage:
//!
//! ```
//! use scoped_owners::ExclusiveOwner;
//!
//! let raw = Box::into_raw(Box::new(1_u64));
//! // SAFETY: `raw` comes from `Box::into_raw` and is not used again.
//! let owner = unsafe { ExclusiveOwner::from_raw(raw) };
//! assert_eq!(*owner, 1);
//! ```
//!
//! # Threads
//!
//! The reference count of [`SharedOwner`] is a plain integer, so the type is neither `Send`
//! nor `Sync`. [`ExclusiveOwner`] is `Send`/`Sync` exactly when `T` is.
//!
//! # Features
//!
//! - `std` (default): implements `std::error::Error` for [`EmptyOwnerError`].
#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod errors;
mod exclusive;
mod shared;
mod slot;

pub use errors::EmptyOwnerError;
pub use exclusive::ExclusiveOwner;
pub use shared::SharedOwner;
