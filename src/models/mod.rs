pub mod enums;
pub mod layout;

pub use enums::*;
pub use layout::*;
