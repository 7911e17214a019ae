//! Browser console logging.
//!
//! Engine code logs through `tracing`. No tracing subscriber is installed in
//! the browser, so tracing's `log` feature forwards every event as a `log`
//! record, and `console_log` prints those records to the devtools console
//! (`console.error` / `warn` / `info` / `debug` by level).

use log::Level;

/// Install the console logger. Calling it twice is harmless.
pub fn init(max_level: Level) {
    if console_log::init_with_level(max_level).is_err() {
        log::debug!("console logger already installed");
    }
}
