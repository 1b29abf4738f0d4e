pub mod error;
pub mod filter;
pub mod stats;
pub mod table;
pub mod traits;
pub mod types;

pub use error::*;
pub use filter::*;
pub use stats::*;
pub use traits::*;
pub use types::*;
