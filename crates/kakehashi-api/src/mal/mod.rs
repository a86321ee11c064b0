pub mod client;
pub mod types;

pub use client::MalClient;
pub use types::{Anime, Sort, UpdateAnimeStatusResponse, User, UserAnimeListData};
