use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io;

pub fn cmd_init(args: InitArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Check for an enclosing vault and warn
    if let Some(parent) = root.parent()
        && let Some(outer) = config_io::discover_vault(parent)
    {
        eprintln!("Note: enclosing vault found at {}/", outer.display());
    }

    let path = config_io::write_default_config(root, args.force)?;
    println!("Initialized tickmark config: {}", path.display());
    Ok(())
}
