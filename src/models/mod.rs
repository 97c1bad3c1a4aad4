pub mod ilift;
pub mod irequest;
pub mod istates;

pub use ilift::*;
pub use irequest::*;
pub use istates::*;
