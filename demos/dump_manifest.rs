use m3u8kit::config::Config;
use m3u8kit::utils::url::location_from_str;
use m3u8kit::ManifestBuilder;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Master manifest as a URL or a local path
    let location = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/master.m3u8".to_string());
    let config = match std::env::args().nth(2) {
        Some(path) => Config::load_file(path),
        None => Config::from_env(),
    };

    let url = location_from_str(&location)?;
    println!("Resolving {}", url);

    let builder = ManifestBuilder::with_config(&config)?;
    let master = builder.parse(&url).await?;

    println!("{} media playlists", master.playlists.len());
    for playlist in &master.playlists {
        println!("{}", playlist.path.as_deref().unwrap_or("<no path>"));
        if let Some(bandwidth) = playlist.bandwidth {
            println!("  Bandwidth: {:.0} bit/s", bandwidth);
        }
        if let Some(resolution) = playlist.resolution {
            println!("  Resolution: {}x{}", resolution.width, resolution.height);
        }
        if let Some(codecs) = &playlist.codecs {
            println!("  Codecs: {}", codecs);
        }
        println!(
            "  Segments: {} ({:.3}s, first sequence {})",
            playlist.segments.len(),
            playlist.duration(),
            playlist.media_sequence
        );

        let encrypted = playlist.segments.iter().filter(|s| s.x_key.is_some()).count();
        if encrypted > 0 {
            println!("  Encrypted segments: {}", encrypted);
        }
        for warning in &playlist.warnings {
            println!("  Warning: {}", warning);
        }
    }

    for warning in &master.warnings {
        println!("Warning: {}", warning);
    }

    Ok(())
}
