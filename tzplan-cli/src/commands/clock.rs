use std::time::Duration;

use anyhow::Result;
use owo_colors::OwoColorize;
use tzplan_core::{App, Gateway};

const REFRESH: Duration = Duration::from_secs(60);

pub async fn run<G: Gateway>(app: &App<G>, watch: bool) -> Result<()> {
    let zone = app.viewing_zone();

    if !watch {
        println!("{} {}", app.clock()?, zone.dimmed());
        return Ok(());
    }

    let mut ticker = tokio::time::interval(REFRESH);
    loop {
        tokio::select! {
            _ = ticker.tick() => println!("{} {}", app.clock()?, zone.dimmed()),
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
