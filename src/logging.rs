use std::io::Write;

use flexi_logger::{DeferredNow, Logger, LoggerHandle, Record};

/// Install the stderr logger; level comes from `RUST_LOG`, `warn` otherwise.
///
/// The returned handle must stay alive for the rest of the process.
pub fn init() -> Option<LoggerHandle> {
	let started = Logger::try_with_env_or_str("warn").and_then(|logger| logger.log_to_stderr().format(format_line).start());

	match started {
		Ok(handle) => Some(handle),
		Err(err) => {
			eprintln!("warning: logging disabled: {err}");
			None
		}
	}
}

fn format_line(write: &mut dyn Write, _now: &mut DeferredNow, record: &Record) -> std::io::Result<()> {
	write!(
		write,
		"{:5} [{}] {}",
		record.level(),
		record.module_path().unwrap_or("<unknown>"),
		record.args()
	)
}
