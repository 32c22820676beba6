use anyhow::Result;
use std::io::Write;

pub fn write_to_stdout_ignore_sigpipe(bytes: &[u8]) -> Result<(), std::io::Error> {
	use std::io::ErrorKind;

	match std::io::stdout().write_all(bytes) {
		Ok(()) => Ok(()),
		Err(e) => match e.kind() {
			ErrorKind::BrokenPipe => Ok(()),
			_ => Err(e),
		},
	}
}

/// Writes `value` as a single JSON line, the format `run` streams frames in.
pub fn write_json_line<T>(value: &T) -> Result<()>
where
	T: ?Sized + serde::ser::Serialize,
{
	let mut line = serde_json::to_vec(value)?;
	line.push(b'\n');
	write_to_stdout_ignore_sigpipe(&line)?;
	Ok(())
}

pub fn write_json_pretty<T>(value: &T) -> Result<()>
where
	T: ?Sized + serde::ser::Serialize,
{
	let mut out = serde_json::to_vec_pretty(value)?;
	out.push(b'\n');
	write_to_stdout_ignore_sigpipe(&out)?;
	Ok(())
}
