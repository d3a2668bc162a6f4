pub mod adjust;
pub mod geometry;
pub mod loader;
