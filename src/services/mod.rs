pub mod artifacts;
pub mod recommendation;
pub mod serving;
