//! `silvercare onboard` — write a default config file.

use silvercare_config::AppConfig;
use std::path::Path;

pub fn run() -> anyhow::Result<()> {
    let path = Path::new("silvercare.toml");
    if path.exists() {
        println!("silvercare.toml already exists, leaving it in place");
        return Ok(());
    }

    std::fs::write(path, AppConfig::default_toml())?;
    println!("Wrote silvercare.toml");
    println!("Add provider keys there, or set DASHSCOPE_API_KEY / OPENROUTER_API_KEY / TAVILY_API_KEY in the environment.");
    Ok(())
}
