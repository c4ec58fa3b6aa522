//! Media Queries Level 3: evaluation against a fixed virtual screen.
//! Spec: <https://www.w3.org/TR/mediaqueries-3/>
//!
//! A headless browser has no real output device, so every query is answered
//! from a [`MediaEnvironment`]: a screen of known size, color depth and
//! scripting state. Interaction features (`hover`, `pointer`, ...) never hold.

#![forbid(unsafe_code)]

mod environment;
mod query;

pub use environment::MediaEnvironment;
pub use query::{MediaError, evaluate};
