pub mod api;
pub mod generate;
pub mod model;
pub mod montecarlo;
pub mod net;

/// dimensional analysis types
pub type Days = f64;
pub type Rate = f64;
pub type Probability = f64;

// quantile search parameters
const FIRST_PROBE: Days = 10.0;
const DOUBLING_LIMIT: usize = 100;
const HUNT_LIMIT: usize = 1000;
const HUNT_DEPTH: usize = 5;
const HUNT_GROWTH: f64 = 1.2;

// mean campaign parameters
const RESOLUTION: usize = 100;
const CAMPAIGN_LIMIT: usize = 10_000;

/// initialize logging
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
