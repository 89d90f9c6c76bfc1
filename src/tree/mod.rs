pub mod condition;
pub mod node;
pub mod path;

pub use condition::*;
pub use node::*;
pub use path::*;
