use slog::{o, Drain, Logger};

pub use slog_async::Async;
pub use slog_term::TermDecorator;

/// The root [`Logger`] of a process: compact terminal output behind an async drain.
///
/// Every record carries the `service` key set to `service`.
pub fn new_logger(service: &'static str) -> Logger {
    let decorator = TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = Async::new(drain).build().fuse();

    Logger::root(drain, o!("service" => service))
}

/// A [`Logger`] dropping every record.
pub fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}
