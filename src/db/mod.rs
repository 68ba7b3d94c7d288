mod articles;
mod lots;
mod movements;

pub use articles::*;
pub use lots::*;
pub use movements::*;
