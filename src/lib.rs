#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;

/// A HashMap implementation using bounded robin-hood probing.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

mod hash_map_proptest;

pub mod hash_table;

pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when a map is created without one.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when a map is created without one.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder used when neither `foldhash` nor `std` is enabled.
        ///
        /// It cannot be constructed, so maps must be created with
        /// [`HashMap::with_hasher`].
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}
