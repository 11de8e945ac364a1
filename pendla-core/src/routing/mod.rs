//! Query path: walk-reachable endpoints, seed departures, RAPTOR rounds and
//! journey reconstruction.

mod journey;
pub mod raptor;
mod search;

pub use journey::{Journey, Leg};
pub use raptor::RaptorError;
pub use search::{SearchRequest, search};
