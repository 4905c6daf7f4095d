pub mod renderer;
pub mod world;
