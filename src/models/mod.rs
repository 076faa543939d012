pub mod gas;
pub mod response;

pub use gas::*;
pub use response::*;
