pub mod config;
pub mod pattern;
pub mod debounce;
pub mod highlighter;
pub mod conductor;

pub use config::*;
pub use pattern::*;
pub use debounce::*;
pub use highlighter::*;
pub use conductor::*;

#[cfg(test)]
mod tests;
