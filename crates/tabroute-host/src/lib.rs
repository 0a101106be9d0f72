pub mod contracts;
pub mod interception;
pub mod memory;
pub mod router;

pub use contracts::*;
pub use interception::*;
pub use memory::*;
pub use router::*;
