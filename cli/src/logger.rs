use console::style;
use std::io::Write;

/// Installs the process logger.
///
/// `atspi` crates log at `info` unless `RUST_LOG` or `maybe_level` says otherwise.
pub(crate) fn init(maybe_level: Option<log::LevelFilter>) {
	let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
	builder.filter_module("atspi", maybe_level.unwrap_or(log::LevelFilter::Info));

	let logger = builder
		.format(|buf, record| {
			let mut target = record.target().to_string();

			if let Some(line_no) = record.line() {
				target.push(':');
				target.push_str(&line_no.to_string());
			}
			if record.level() <= log::Level::Info {
				// Print ERROR, WARN and INFO logs as they are
				match core_label(&target) {
					Some(label) => writeln!(buf, "[{}]: {}", style(label).bold(), record.args()),
					None => writeln!(buf, "{}", record.args()),
				}
			} else {
				// Add prefix to DEBUG or TRACE logs
				writeln!(buf, "{} RS - {} - {}", record.level(), target, record.args())
			}
		})
		.build();

	let max_level = logger.filter();
	if log::set_boxed_logger(Box::new(logger)).is_ok() {
		log::set_max_level(max_level);
	}
}

/// Short label for records of the loader crate, `None` for everything else.
fn core_label(target: &str) -> Option<String> {
	target.strip_prefix("atspi::core").map(|rest| format!("core{rest}"))
}
