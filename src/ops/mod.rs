pub mod node_ops;
pub mod progress;

pub use node_ops::*;
pub use progress::*;
