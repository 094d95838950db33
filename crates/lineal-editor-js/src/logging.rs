//! Console logging.

use std::sync::Once;

use tracing::Level;
use tracing::subscriber::set_global_default;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::prelude::*;

static INIT: Once = Once::new();

/// Parse a level name, falling back to `info` in release builds and `debug`
/// otherwise.
pub(crate) fn parse_level(level: Option<&str>) -> Level {
    let default = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    level.and_then(|l| l.parse().ok()).unwrap_or(default)
}

/// Route `tracing` output to the browser console.
///
/// Only the first call installs the subscriber; later calls are no-ops.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) {
    INIT.call_once(|| {
        let level = parse_level(level.as_deref());
        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(level)
                .build(),
        );
        let reg = Registry::default().with(wasm_layer);
        let _ = set_global_default(reg);
        tracing::debug!(target: "lineal::js", %level, "logging initialised");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("trace")), Level::TRACE);
        assert_eq!(parse_level(Some("WARN")), Level::WARN);
        let fallback = parse_level(Some("loud"));
        assert!(fallback == Level::DEBUG || fallback == Level::INFO);
        assert_eq!(parse_level(None), fallback);
    }
}
