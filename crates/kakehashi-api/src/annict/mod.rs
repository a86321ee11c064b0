pub mod client;
pub mod types;

pub use client::AnnictClient;
pub use types::{AnnictViewer, AnnictWork};
