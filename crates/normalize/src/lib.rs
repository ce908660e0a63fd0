pub mod admission;
pub mod normalize;
pub mod robots;

pub use admission::admits;
pub use normalize::{normalize, path_component_count};
pub use robots::RobotsGate;
