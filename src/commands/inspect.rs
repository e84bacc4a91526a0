use crate::error::Error;
use crate::services::{JsonDirSource, PriceSource};
use crate::utils::get_data_dir;
use std::path::PathBuf;

pub fn run(data_dir: Option<PathBuf>) {
    let data_dir = data_dir.unwrap_or_else(get_data_dir);
    println!("📁 Data directory: {}", data_dir.display());

    if let Err(e) = inspect(&JsonDirSource::new(data_dir)) {
        eprintln!("❌ Inspect failed: {}", e);
        std::process::exit(1);
    }
}

fn inspect(source: &dyn PriceSource) -> Result<(), Error> {
    let items = source.available_items()?;
    println!("\n📈 Items with price history: {}", items.len());

    for item_id in items {
        match source.price_history(item_id) {
            Ok(observations) => {
                // Non-empty: price_history reports empty series as errors
                let first = &observations[0];
                let last = &observations[observations.len() - 1];
                let with_volume = observations.iter().filter(|o| o.volume.is_some()).count();
                println!(
                    "   {:>8}  {:>6} records  {} → {}  (volume on {})",
                    item_id,
                    observations.len(),
                    first.date(),
                    last.date(),
                    with_volume
                );
            }
            Err(e) => println!("   {:>8}  ⚠️  {}", item_id, e),
        }
    }

    let catalogue = source.catalogue()?;
    println!("\n🗂️  Catalogue categories: {}", catalogue.len());
    for (category, members) in &catalogue {
        println!("   {:>3}  {} items", category, members.len());
    }

    let posts = source.social_posts()?;
    println!("\n📰 Social posts: {}", posts.len());
    if let (Some(first), Some(last)) = (posts.iter().map(|p| p.date()).min(), posts.iter().map(|p| p.date()).max()) {
        println!("   Earliest update: {}; most recent update: {}", first, last);
    }

    Ok(())
}
