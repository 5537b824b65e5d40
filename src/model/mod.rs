pub mod forest;
pub mod node;

pub use forest::*;
pub use node::*;
