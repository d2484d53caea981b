pub mod output;
pub mod record;

pub use output::*;
pub use record::*;
