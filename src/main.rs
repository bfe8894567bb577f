#![forbid(unsafe_code)]

use conway_life::config::Settings;

fn main() {
    env_logger::init();
    if let Err(err) = conway_life::run(Settings::from_cli()) {
        conway_life::log_error("run", &err);
        std::process::exit(1);
    }
}
