pub mod indicators;
pub mod detachment;
pub mod transition;
pub mod analyzer;


pub use indicators::*;
pub use detachment::*;
pub use transition::*;
pub use analyzer::*;
