fn main() -> Result<(), Box<dyn std::error::Error>> {
    rowgraph::build!("metadata.json", "rowgraph.toml");

    Ok(())
}
