//! Masa print bridge
//!
//! Long-running process on the restaurant LAN that turns placed orders into
//! kitchen tickets:
//!
//! - **Routing** (`printing::router`, `printing::zone`): which station gets
//!   which items, table zones and takeaway packet numbers
//! - **Resolution** (`printing::resolver`): finds a working address for each
//!   station printer among several candidate forms
//! - **Composition** (`printing::composer`): ticket layout, ESC/POS encoding
//! - **Dispatch** (`printing::dispatcher`): per-station FIFO transmission with
//!   bounded retries, concurrent across stations
//! - **HTTP API** (`api`): status, probing, test prints, jobs, printer config
//!
//! ```text
//! print-bridge/src/
//! ├── core/          # config, state, server
//! ├── settings/      # persisted restaurant settings
//! ├── printing/      # routing, resolution, composition, dispatch
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, error re-exports
//! ```

pub mod api;
pub mod core;
pub mod printing;
pub mod settings;
pub mod utils;

pub use core::{Config, Server, ServerError, ServerState};
pub use settings::{SettingsError, SettingsStore};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger_with_file;

/// Load `.env`, read configuration and install the logger
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        config.log_dir.as_deref(),
    );
    config
}

pub fn print_banner() {
    println!(
        r#"
    __  ___
   /  |/  /___ __________ _
  / /|_/ / __ `/ ___/ __ `/
 / /  / / /_/ (__  ) /_/ /
/_/  /_/\__,_/____/\__,_/   print bridge v{}
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
