//! Field resolution engine.
//!
//! [`resolution`] decides what value a field holds after decode; [`emission`]
//! decides what it writes on encode. Both are plain synchronous functions over
//! a descriptor and already-parsed wire data, with no shared state between
//! calls, so independent fields of one record can be processed in any order or
//! on separate threads.

pub mod emission;
pub mod resolution;

pub use emission::{assemble, emit, Emission};
pub use resolution::{resolve, resolve_traced, resolve_with_bridge, Resolution, Source};
