use crate::render::Renderer;
use crate::{protocol, utils, wal};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// CLI for WAL inspection.
#[derive(Parser)]
#[clap(name = "walscan", version)]
pub struct Cli {
    /// path to a WAL segment file or a directory of segments
    pub path: PathBuf,

    /// also write the rendered report to this file
    #[clap(long)]
    pub out: Option<PathBuf>,

    /// emit one JSON object per record instead of text
    #[clap(long)]
    pub json: bool,
}

pub fn run() -> Result<()> {
    utils::init_logging();
    let cli = Cli::parse();

    let mut renderer = Renderer::new(cli.json, cli.out.as_deref())?;
    let meta = std::fs::metadata(&cli.path)
        .with_context(|| format!("cannot access {}", cli.path.display()))?;

    if meta.is_dir() {
        for path in collect_segments(&cli.path)? {
            // a bad file aborts that file only; the walk continues
            if let Err(err) = inspect_file(&path, &mut renderer) {
                warn!("{err:#}");
            }
        }
    } else {
        inspect_file(&cli.path, &mut renderer)?;
    }

    renderer.flush()
}

/// Resolves a directory to the ordered list of segment files beneath it.
fn collect_segments(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)
            .with_context(|| format!("cannot list {}", current.display()))?
        {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Scans one segment and renders every record it yields. Reader-level
/// corruption is advisory: the payloads read before the fault still render.
pub fn inspect_file(path: &Path, renderer: &mut Renderer) -> Result<()> {
    info!("reading {}", path.display());
    let scan = wal::read_segment(path);
    if let Some(err) = &scan.error {
        warn!("{err}; rendering the {} records read so far", scan.payloads.len());
    }

    for (index, payload) in scan.payloads.iter().enumerate() {
        let record = protocol::decode_record(payload)
            .with_context(|| format!("record #{index} in {}", path.display()))?;
        renderer.render(index, &record)?;
    }

    Ok(())
}
