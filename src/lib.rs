//! Process-facing layer over `radix_core`: a shared index that can be
//! swapped while readers keep searching, and a background loader for
//! packed documents.

pub mod api;
pub mod async_worker;
pub mod trace_init;

pub use radix_core::{codec, entry, normalize, settings, trie};
