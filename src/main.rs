use anyhow::Result;

fn main() -> Result<()> {
    walscan::cli::run()
}
