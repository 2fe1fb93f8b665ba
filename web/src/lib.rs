use clap::Parser;
use concentration_core::SessionConfig;
use core::time::Duration;
use wasm_bindgen::prelude::*;

mod game;
mod highscores;
mod theme;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// How long a flipped pair stays face up, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RESOLVE_DELAY_MS)]
    resolve_delay_ms: u64,
}

const DEFAULT_RESOLVE_DELAY_MS: u64 = SessionConfig::DEFAULT_RESOLVE_DELAY.as_millis() as u64;

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Default::default(),
            seed: None,
            resolve_delay_ms: DEFAULT_RESOLVE_DELAY_MS,
        }
    }
}

impl Args {
    /// Parses `#--flag=value&--other` style arguments, keeping the defaults when they don't parse.
    fn from_location_hash(hash: &str) -> (Self, Option<clap::Error>) {
        match Self::try_parse_from(hash.split(['#', '&'])) {
            Ok(args) => (args, None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            resolve_delay: Duration::from_millis(self.resolve_delay_ms),
            ..SessionConfig::default()
        }
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let (args, parse_error) = Args::from_location_hash(&location_hash);
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }
    if let Some(err) = parse_error {
        log::warn!("ignoring location hash {:?}: {}", location_hash, err);
    }
    let seed = args.seed.unwrap_or_else(utils::js_random_seed);
    log::debug!("seed: {}", seed);

    let root = document()
        .get_element_by_id("game")
        .expect("Could not find id=\"game\" element");

    log::debug!("App started");
    yew::Renderer::<game::GameView>::with_root_and_props(
        root,
        game::GameProps {
            config: args.session_config(),
            seed,
        },
    )
    .render();
}
