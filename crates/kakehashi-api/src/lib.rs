//! API clients for remote anime tracking services.
//!
//! This crate is the external-API layer of kakehashi: it builds requests,
//! sends them through an authenticated dispatcher, and maps the JSON
//! responses onto typed records. MyAnimeList is reached over REST; AniList
//! and Annict over GraphQL. Public client operations never return errors:
//! failures are logged and surfaced as absent or empty results, leaving the
//! retry decision to the caller.

pub mod anilist;
pub mod annict;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod graphql;
pub mod mal;
pub mod provider;
pub mod sanitize;
pub mod types;
pub mod url_builder;

pub use anilist::AniListClient;
pub use annict::AnnictClient;
pub use config::UserConfig;
pub use dispatch::{ApiResponse, CallVerb, Dispatch, HttpDispatcher, RequestBody};
pub use error::ApiError;
pub use mal::MalClient;
pub use provider::Provider;
pub use types::{AnimeStatusUpdate, WatchStatus};
pub use url_builder::UrlBuilder;
