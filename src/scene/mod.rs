pub mod color;
pub mod geometry;
pub mod object;
pub mod registry;
pub mod resources;
