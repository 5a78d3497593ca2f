use anyhow::Result;
use owo_colors::OwoColorize;
use tzplan_core::ClientConfig;

pub fn run() -> Result<()> {
    let config_path = ClientConfig::config_path()?;
    let config = ClientConfig::load()?;

    println!("{}", "Paths".bold());
    println!("  Config:    {}", config_path.display());
    println!();
    println!("{}", "Settings".bold());
    println!("  API URL:   {}", config.api_url);
    println!("  Timezone:  {}", config.default_timezone);
    println!("  Timeout:   {}s", config.request_timeout_secs);
    println!(
        "  Profile:   {}",
        config.default_profile.as_deref().unwrap_or("(first available)")
    );

    Ok(())
}
