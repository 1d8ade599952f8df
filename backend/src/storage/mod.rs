pub mod csv;
pub mod memory;
pub mod store;
pub mod traits;

pub use memory::{GroupRepository, StudentRepository};
pub use store::{RosterState, RosterStore};
pub use traits::{GroupStorage, StudentStorage};
