pub mod channel;
pub mod error;
pub mod frame;
pub mod header;
pub mod record;
pub mod scaling;

pub use channel::*;
pub use error::*;
pub use frame::*;
pub use header::*;
pub use record::*;
pub use scaling::*;
