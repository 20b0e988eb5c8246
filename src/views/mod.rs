pub mod node_view;
pub mod value_view;

pub use node_view::{Node, NodeKind, NodeView};
pub use value_view::ValueRef;
