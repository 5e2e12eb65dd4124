pub mod edit;
pub mod inspect;

pub use edit::{edit, EditArgs};
pub use inspect::{inspect, InspectArgs};
