//! Exclusive-ownership handles.
//!
//! # Handles
//!
//! A handle is either empty or owns exactly one heap allocation.
//! It releases the allocation when it is dropped,
//! unless ownership was given up with `release` first.
//! The two handle types differ only in how they release.
//!
//! | Handle type       | Token      | Release strategy         | Element access        |
//! |-------------------|------------|--------------------------|-----------------------|
//! | [`ScalarHandle`]  | `*mut T`   | Single object (`Box<T>`) | `Deref`, `DerefMut`   |
//! | [`ArrayHandle`]   | `*mut [T]` | Bulk (`Box<[T]>`)        | `Index`, `IndexMut`   |
//!
//! # Ownership transfer
//!
//! Moving a handle moves ownership; the moved-from binding is gone.
//! Assigning a handle over another drops the old resource first.
//! To transfer between two places that both stay alive,
//! use `take`, `move_from`, or `swap`, which leave no copy behind.
//! Since both sides of `move_from` are borrowed mutably,
//! a handle cannot be moved into itself.
//! Resetting a handle to the pointer it already owns is a no-op.

pub use self::array::*;
pub use self::scalar::*;

mod owner;
mod release;

mod array;
mod scalar;

#[cfg(test)]
mod testing;
