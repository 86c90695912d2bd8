pub mod policy;

mod error;
mod forest;

pub use error::{ForestError, Result};
pub use forest::{LinkCutForest, NodeId};
