use data_loader::DataIndex;
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    let artifact_dir = Path::new("artifacts");

    println!("Loading similarity artifacts...\n");

    let start = Instant::now();
    let index = DataIndex::load_from_files(artifact_dir)?;
    let elapsed = start.elapsed();

    let (entries, dim) = index.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Catalog entries: {}", entries);
    println!("Matrix: {}x{}", dim, dim);
    println!("Duplicate titles: {}", index.catalog().duplicate_title_count());
    println!("\nPerformance: {:.0} scores/second",
             (dim * dim) as f64 / elapsed.as_secs_f64());
    Ok(())
}
