//! Vendor CLI profiles.
//!
//! A [`PlatformDefinition`] tells the SSH session how to recognise the
//! prompt, what to run after login, how to enter and leave configuration
//! mode, and which response text marks a rejected command.

mod cisco_ios;
mod definition;

pub use cisco_ios::platform as cisco_ios;
pub use definition::PlatformDefinition;
