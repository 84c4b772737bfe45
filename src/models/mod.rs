pub mod cost;
pub mod farm;
pub mod knowledge;
pub mod recommendation;

pub use cost::*;
pub use farm::*;
pub use knowledge::*;
pub use recommendation::*;
