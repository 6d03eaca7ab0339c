use std::sync::Arc;

use voiceplay_core::{
    ClientConfig, LookupClient, MediaKind, MediaReference, Player, PlayerView, Resolver,
    SourceCatalog,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("VOICEPLAY_API_KEY").ok();
    let lookup = Arc::new(LookupClient::with_config(ClientConfig {
        api_key,
        ..ClientConfig::default()
    })?);
    let resolver = Arc::new(Resolver::with_lookup(lookup));

    let reference = MediaReference::new("Брат", MediaKind::Movie).with_year(1997);
    println!("🔍 Resolving '{}' ({:?})...\n", reference.title, reference.year);

    let player = Player::mount(reference, SourceCatalog::voice_over()?, Some(resolver));
    player.settle().await;

    match player.view().await {
        PlayerView::Playing {
            sources,
            frame,
            identifier,
            ..
        } => {
            println!("Identifier: {:?}", identifier);
            for (i, source) in sources.iter().enumerate() {
                println!("  {}. {} {} - {}", i + 1, source.icon, source.name, source.url);
            }
            println!("\n{}", frame.to_html());
        }
        other => println!("{:?}", other),
    }

    player.close().await;
    Ok(())
}
