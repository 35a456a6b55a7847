mod component;
mod controls;
mod geometry;
mod handle_label;
mod node;
mod state;
mod types;

pub use component::FlowCanvas;
pub use state::FlowState;
pub use types::Position;
