//! Handles that own a heap allocation exclusively
//! and release it exactly once.
//!
//! A handle is bound to a resource by an explicit call,
//! hands it back only through [`release`][`ScalarHandle::release`],
//! and otherwise releases it when the handle goes out of scope.
//! Handles can be moved but never copied,
//! so no two live handles ever share a resource.
//!
//! ```
//! use owning_handle::ArrayHandle;
//! use owning_handle::ScalarHandle;
//!
//! let mut name = ScalarHandle::from_box(Box::new(String::from("scratch")));
//! name.push_str("-pad");
//! assert_eq!(*name, "scratch-pad");
//!
//! let mut squares = ArrayHandle::from_vec(vec![0, 1, 4, 9, 16]);
//! squares[2] += 1;
//! assert_eq!(squares[2], 5);
//!
//! let moved = name.take();
//! assert!(name.is_empty());
//! assert!(moved.is_some());
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub use self::error::NullAccess;
pub use self::handle::*;

#[macro_use]
mod macros;

mod error;

pub mod handle;
