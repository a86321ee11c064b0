pub mod client;
pub mod types;

pub use client::AniListClient;
pub use types::{AniListListEntry, AniListMedia, AniListMediaListEntry, AniListViewer};
