mod criteria;
mod result;

pub use criteria::*;
pub use result::*;
