//! Sink nodes (consume audio)

mod destination;

pub use destination::Destination;
