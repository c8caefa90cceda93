pub mod client;

pub use client::{TmdbClient, TmdbError};
