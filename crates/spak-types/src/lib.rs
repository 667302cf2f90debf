//! Foundation types for SPak shader packages.
//!
//! A shader package is a named collection of opaque blobs (compiled shader
//! bytecode). This crate holds the in-memory container every package format
//! reads into and writes from; it knows nothing about files or encodings.
//!
//! # Key Types
//!
//! - [`ShaderPak`] — insertion-ordered mapping from shader name to bytecode
//!
//! # Design Rules
//!
//! 1. Names are unique; adding an existing name overwrites its bytecode.
//! 2. Iteration order is insertion order, so formats that serialize the
//!    container produce byte-identical output for identical inputs.
//! 3. Equality compares the set of (name, bytecode) pairs and ignores order.

pub mod pak;

pub use pak::ShaderPak;
