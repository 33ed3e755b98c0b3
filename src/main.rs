mod artifact;
mod config;
mod database;
mod dates;
mod error;
mod events;
mod fetch;
mod limiter;
mod loader;
mod model;
mod mtgtop8;
mod paginate;
mod pipeline;
mod publish;
mod schema;
mod staging;
#[cfg(test)]
mod testing;
mod tui;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--load") {
        // Load the existing data tree into the database, no scraping
        pipeline::load_only(&config::Config::default_pauper())
    } else if args.iter().any(|a| a == "--headless") {
        // Headless mode: use default config and console output
        let config = config::Config::default_pauper();
        pipeline::run(&config)
    } else {
        // TUI mode: interactive config + dashboard
        tui::run()
    }
}
