use anyhow::Context;
use term_snake::app::App;
use term_snake::config::{Settings, CONFIG_FILE};
use term_snake::logging;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(CONFIG_FILE).with_context(|| format!("loading {CONFIG_FILE}"))?;
    logging::init(&settings)?;

    let mut game = App::new(settings)?;
    game.initialize().context("setting up the terminal")?;

    // The terminal has to come back even when the game fails
    let result = game.run();
    game.restore().context("restoring the terminal")?;

    if let Err(err) = &result {
        tracing::error!("{err:#}");
    }
    result
}
