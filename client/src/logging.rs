//! Browser console logging.

/// Route `log` records, and through tracing's `log` feature every
/// `tracing` event from `authsync`, to the browser console. Also installs
/// the panic hook. Safe to call more than once.
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("console logger already installed");
    }
}
