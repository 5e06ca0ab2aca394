use anyhow::Result;
use data_loader::EntityStore;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let data_dir = Path::new("data");

    println!("Loading dataset from {}...\n", data_dir.display());

    let start = Instant::now();
    let store = EntityStore::load_from_files(data_dir)?;
    let elapsed = start.elapsed();

    let (users, movies, ratings) = store.counts();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Movies: {}", movies);
    println!("Ratings: {}", ratings);
    println!("\nPerformance: {:.0} ratings/second",
             ratings as f64 / elapsed.as_secs_f64());
    Ok(())
}
