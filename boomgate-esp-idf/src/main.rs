use std::time::Instant;

use esp_idf_sys as _;
use boomgate::app::App;
use boomgate::config::Config;

use boomgate_esp_idf::platform::{BoardType, PlatformImpl};

fn main() -> anyhow::Result<()> {
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = match Config::from_env_var() {
        Some(config) => config?,
        None => Config::default(),
    };

    #[cfg(feature = "m5stampc3")]
    let board_type = BoardType::M5StampC3;
    #[cfg(not(feature = "m5stampc3"))]
    let board_type = BoardType::RustDevKit;

    log::info!("Create platform");
    let p = PlatformImpl::new(board_type, &config)?;

    log::info!("Create app");
    let mut app = App::new(&p, &config);

    let period = config.tick_period();

    log::info!("Start loop, period {}ms", period.as_millis());

    loop {
        let next_wakeup = Instant::now() + period;

        {
            let start = Instant::now();
            app.update();

            log::trace!("app update took {}ms", (Instant::now() - start).as_millis());
        }

        if let Some(delay) = next_wakeup.checked_duration_since(Instant::now()) {
            std::thread::sleep(delay);
        } else {
            log::error!("no delay");
        }
    }
}
