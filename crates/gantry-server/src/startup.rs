//! Start-up console output.

use gantry_config::AppConfig;
use tracing::info;

const BANNER: &str = r#"
   ______            __
  / ____/___ _____  / /________  __
 / / __/ __ `/ __ \/ __/ ___/ / / /
/ /_/ / /_/ / / / / /_/ /  / /_/ /
\____/\__,_/_/ /_/\__/_/   \__, /
                          /____/
"#;

pub fn print_banner() {
    info!("{}", BANNER);
}

/// Logs where each enabled listener can be reached.
pub fn print_startup_info(config: &AppConfig) {
    for (label, url) in endpoints(config) {
        info!("{:<9} {}", label, url);
    }
}

fn endpoints(config: &AppConfig) -> Vec<(&'static str, String)> {
    let rest = config.server.addr();
    let mut endpoints = vec![
        ("REST API", format!("http://{}/v1", rest)),
        ("API Docs", format!("http://{}/swagger-ui", rest)),
    ];
    if config.server.diagnostics_enabled {
        endpoints.push(("Health", format!("http://{}/_/health", rest)));
    }
    if config.metrics.enabled {
        endpoints.push(("Metrics", format!("http://{}{}", config.metrics.addr(), config.metrics.path)));
    }
    endpoints
}
