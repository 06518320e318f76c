pub mod geometry;
pub mod id;
pub mod sketch;
