//! This is a library for mirroring a small app's state across every open view
//! of the same document on one device. It was created for Arkiv, so it doesn't
//! include much that was not needed for that project.
//!
//! Mirroring strategy:
//! 1. The app owns one in-memory snapshot per open document.
//! 2. Every change durably saves the full snapshot as JSON under a
//!    prefix-namespaced key (`storage`), then broadcasts the full snapshot to
//!    sibling views on a channel named after the document (`channel`).
//! 3. A view receiving a broadcast adopts it wholesale. There is no merging,
//!    no versioning, and no acknowledgement: last message wins.
//!
//! On non-wasm targets both halves are backed by thread-local in-process
//! substitutes, so the full persist/broadcast cycle runs under `cargo test`.

pub mod channel;
pub mod storage;
