//! Raw FFI bindings.
//!
//! Nothing in here is safe to call directly; see [`crate::embed`] and
//! [`crate::env`] for the wrappers.

pub mod jni;
