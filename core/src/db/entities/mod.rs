//! Sea-ORM entity definitions.

pub mod tree_node;

pub use tree_node::Entity as TreeNode;
pub use tree_node::Model as TreeNodeRow;
