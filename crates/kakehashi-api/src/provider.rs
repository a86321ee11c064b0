use std::fmt;

use serde::{Deserialize, Serialize};

/// A remote tracking service this crate can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Mal,
    AniList,
    Annict,
}

impl Provider {
    pub const ALL: &[Provider] = &[Self::Mal, Self::AniList, Self::Annict];

    /// The provider's GraphQL endpoint, or `None` for REST-only services.
    ///
    /// This is the only place the provider-to-endpoint mapping lives; call
    /// sites resolve through it instead of branching on the variant.
    pub fn graphql_endpoint(self) -> Option<&'static str> {
        match self {
            Self::AniList => Some("https://graphql.anilist.co"),
            Self::Annict => Some("https://api.annict.com/graphql"),
            Self::Mal => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mal => write!(f, "MyAnimeList"),
            Self::AniList => write!(f, "AniList"),
            Self::Annict => write!(f, "Annict"),
        }
    }
}
