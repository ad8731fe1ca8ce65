/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The canonical album and its loader (library.rs)
/// - Derived video info and image checks (derived.rs)
/// - Lightbox navigation (viewer.rs)

pub mod data;
pub mod derived;
pub mod library;
pub mod viewer;
