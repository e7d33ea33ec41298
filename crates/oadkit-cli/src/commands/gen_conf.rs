use crate::cli::GenConfArgs;
use crate::error::{CliError, Result};
use oadkit::core::config::{ConfigFormat, sample_document};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn run(args: GenConfArgs) -> Result<()> {
    let format = args
        .format
        .or_else(|| ConfigFormat::from_path(&args.path))
        .unwrap_or(ConfigFormat::Toml);
    write_sample(&args.path, format, args.force)?;
    println!(
        "✓ Sample {} process description written to: {}",
        format,
        args.path.display()
    );
    Ok(())
}

pub fn write_sample(path: &Path, format: ConfigFormat, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::FileExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    info!("Writing {} sample configuration to {:?}", format, path);
    fs::write(path, sample_document(format))?;
    Ok(())
}
