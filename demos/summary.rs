//! Print a summary of an NZB file
//!
//! Run with: cargo run --example summary -- path/to/file.nzb
//! Set RUST_LOG=debug to see dropped segments.

use nzb_rs::{NzbParser, ParseConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: summary <file.nzb> [--strict]")?;
    let config = if std::env::args().any(|a| a == "--strict") {
        ParseConfig::strict()
    } else {
        ParseConfig::lenient()
    };

    let xml = std::fs::read_to_string(&path)?;
    let nzb = NzbParser::new(config).parse(&xml)?;

    println!("{}", path);
    if let Some(title) = nzb.meta().title() {
        println!("  title:    {}", title);
    }
    if let Some(category) = nzb.meta().category() {
        println!("  category: {}", category);
    }
    if let Some(password) = nzb.meta().password() {
        println!("  password: {}", password);
    }
    println!("  main:     {} ({} bytes)", nzb.file().name(), nzb.file().size());
    println!("  size:     {} bytes ({} in par2)", nzb.size(), nzb.par2_size());
    println!("  groups:   {}", nzb.groups().join(", "));
    println!("  posters:  {}", nzb.posters().join(", "));
    println!();

    for file in nzb.files() {
        let missing = file.missing_segments();
        println!(
            "  {:<60} {:>12} bytes  {:>4} segments{}",
            file.name(),
            file.size(),
            file.segments().len(),
            if missing.is_empty() {
                String::new()
            } else {
                format!("  missing {:?}", missing)
            }
        );
    }

    Ok(())
}
