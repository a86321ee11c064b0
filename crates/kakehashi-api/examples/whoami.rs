//! Run with: cargo run -p kakehashi-api --example whoami
//!
//! Fetches the authenticated MAL user's profile using the token stored in
//! the kakehashi config file.

use kakehashi_api::{HttpDispatcher, MalClient, UserConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match UserConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not load config: {e}");
            return;
        }
    };

    let client = MalClient::new(HttpDispatcher::new(config));
    match client.get_user_information().await {
        Some(user) => {
            println!("Logged in as {} (id {})", user.name, user.id);
            if let Some(location) = user.location {
                println!("  Location: {location}");
            }
            println!("  Joined:   {}", user.joined_at.format("%Y-%m-%d"));
        }
        None => println!("Could not fetch user information; is a MAL token configured?"),
    }
}
