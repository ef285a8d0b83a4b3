pub mod directory;
pub mod document;
pub mod frame;
pub mod token;

pub use directory::*;
pub use document::*;
pub use frame::*;
pub use token::*;
