use anyhow::Result;
use owo_colors::OwoColorize;
use tzplan_core::timezone::{self, SUPPORTED_TIMEZONES};

pub fn run() -> Result<()> {
    let width = SUPPORTED_TIMEZONES.iter().map(|z| z.len()).max().unwrap_or(0);

    for zone in SUPPORTED_TIMEZONES {
        let now = timezone::current_time(zone)?;
        println!("  {:<width$}  {}", zone, now.dimmed());
    }

    Ok(())
}

pub fn convert(date: &str, time: &str, from: &str, to: &str) -> Result<()> {
    let wall = timezone::convert_to_zone(date, time, from, to)?;

    println!(
        "{} {} {}  →  {} {} {}",
        date,
        time,
        from.dimmed(),
        wall.date_string().bold(),
        wall.time_string().bold(),
        to.dimmed()
    );

    Ok(())
}
