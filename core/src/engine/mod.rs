//! The tree storage engine: path algebra, position allocation, forest
//! materialization, and the mutation protocols that tie them to the
//! database.

pub mod materializer;
pub mod mutate;
pub mod path;
pub mod position;
