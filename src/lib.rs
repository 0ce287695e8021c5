pub mod cli;
pub mod ring;
pub mod store;

pub use ring::{QueueError, RingQueue};
