use crate::cli::open_db;
use crate::error::Result;
use crate::settings::{expand_path, load_settings, save_settings};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = expand_path(&dir);
    }
    save_settings(&settings)?;
    open_db()?;

    println!("Initialized tally at {}", settings.data_dir);
    Ok(())
}
