pub mod appearance;
pub mod builders;
pub mod camera;
pub mod demo;
pub mod engine;
pub mod image;
pub mod light;
pub mod node;
pub mod render;
pub mod scene;
pub mod shader;
pub mod shape;
pub mod state;
pub mod transform;
pub mod window;
