//! Connection handle and lifecycle types.

pub mod handle;
