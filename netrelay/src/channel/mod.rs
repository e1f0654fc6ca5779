//! Channel layer: buffering PTY output and detecting the prompt.

mod buffer;

pub use buffer::PatternBuffer;
