//! Arcade Sim entry point
//!
//! Native builds run one game headless on its autopilot and report the
//! result. The browser build is driven from `arcade_sim::web` instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use arcade_sim::consts::SIM_DT;
    use arcade_sim::engine::{ManualScheduler, SessionPhase, Timing};
    use arcade_sim::games::{self, Hookup};
    use arcade_sim::{Settings, platform};

    /// Stop demo runs that never end on their own (Pong between two perfect paddles)
    const DEFAULT_MAX_TICKS: u64 = 60 * 60 * 10;

    platform::init_logging();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "breakout".to_string());
    let max_ticks = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_TICKS);

    let store = platform::default_store();
    let settings = Settings::load(store.as_ref());
    let seed = settings.seed_or(platform::clock_seed());
    log::info!("Arcade Sim (native) starting {name}, seed {seed}");

    let hookup = Hookup {
        store: Some(store),
        ui: None,
    };
    let mut arcade = match games::build_with(&name, &settings, ManualScheduler::new(), seed, hookup) {
        Ok(arcade) => arcade,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("available: {}", games::GAME_NAMES.join(", "));
            std::process::exit(2);
        }
    };

    arcade.start();
    let mut ticks = 0u64;
    while ticks < max_ticks {
        let Some((generation, timing)) = arcade.scheduler_mut().take() else {
            break;
        };
        let dt = match timing {
            Timing::Fixed { interval_ms } => interval_ms / 1000.0,
            Timing::Variable => SIM_DT,
        };
        let input = arcade.autopilot();
        arcade.on_tick(generation, &input, dt);
        ticks += 1;
    }

    let stats = arcade.stats();
    match arcade.outcome() {
        Some(outcome) => println!(
            "{name}: {:?} with score {} after {} ticks",
            outcome.verdict, outcome.score, stats.ticks
        ),
        None if arcade.phase() == SessionPhase::Running => println!(
            "{name}: stopped after {} ticks, score {}, level {}",
            stats.ticks, stats.score, stats.level
        ),
        None => println!("{name}: {:?}", arcade.phase()),
    }
    if let Some(best) = arcade.best() {
        println!("best: {best}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `arcade_sim::web::WebArcade`
}
