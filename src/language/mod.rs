pub mod core;
pub mod selector;

// Re-export the main types for convenience
pub use core::WordBank;
pub use selector::{word_score, PracticeSelector, RandomSelector, WordSelector};
