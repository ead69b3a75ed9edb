use anyhow::Result;
use cascade_core::config::CONFIG_FILE;
use cascade_core::Config;

use crate::formatting::{print_key_value, print_success, print_warning};

pub fn cmd_init() -> Result<()> {
    let cwd = std::env::current_dir()?;

    if Config::init(&cwd)? {
        print_success("Marked as workspace root");
    } else {
        print_warning(&format!("{} already exists, leaving it untouched", CONFIG_FILE));
    }
    print_key_value("Root", &cwd.display().to_string());
    println!();

    Ok(())
}
