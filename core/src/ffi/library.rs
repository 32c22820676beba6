use crate::{log, Error, Result};
use dlopen::raw::Library;
use std::{
	ffi::c_void,
	path::{Path, PathBuf},
	ptr::NonNull,
};

/// Address resolution against a loaded native module.
///
/// Implemented by [`DynamicLibrary`] for real shared objects. The plugin facade is
/// generic over this trait so it can be bound against in-process symbol tables.
///
/// # Safety
///
/// The facade calls whatever [`resolve`](Module::resolve) returns. For every name in
/// the plugin catalogue the address must be a function with the catalogue signature
/// and `extern "system"` calling convention, and every address handed out must stay
/// callable until [`release`](Module::release) runs. Once released, `resolve` must
/// return `None`.
pub unsafe trait Module {
	/// Address of the exported symbol `name`, `None` when the module does not export
	/// it or has already been released.
	fn resolve(&self, name: &str) -> Option<NonNull<c_void>>;

	/// Drops the OS module reference. Must be idempotent.
	fn release(&mut self);

	fn is_released(&self) -> bool;
}

/// Exclusive owner of one OS module handle.
///
/// The handle is closed exactly once: either by an explicit [`Module::release`] or
/// when the value is dropped, whichever comes first.
pub struct DynamicLibrary {
	path: PathBuf,
	lib: Option<Library>,
}

impl DynamicLibrary {
	/// Maps the library at `path` into the process.
	///
	/// Relative paths are made absolute against the working directory first, so the
	/// OS loader never falls back to its own search path. A path that does not name
	/// an existing file fails with [`Error::NotFound`] before any load attempt.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

		if !path.is_file() {
			return Err(Error::NotFound(path))
		}

		let lib = Library::open(&path).map_err(|err| Error::Load {
			message: format_error(err, &path),
			path: path.clone(),
		})?;

		log!(trace, "Loaded `{}`", path.display());

		Ok(Self { path, lib: Some(lib) })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

// SAFETY: addresses come from the loaded object and stay mapped until `release`
// closes the handle. Their signatures are whatever the plugin exports, which is the
// contract of loading a plugin at all.
unsafe impl Module for DynamicLibrary {
	fn resolve(&self, name: &str) -> Option<NonNull<c_void>> {
		let Some(lib) = self.lib.as_ref() else {
			log!(warn, "Symbol `{}` requested from released module `{}`", name, self.path.display());
			return None
		};

		// SAFETY: a raw pointer is always a valid symbol type, it is never dereferenced here.
		match unsafe { lib.symbol::<*mut c_void>(name) } {
			Ok(ptr) => NonNull::new(ptr),
			Err(dlopen::Error::NullCharacter(_)) => {
				log!(warn, "Symbol name {:?} contains a NUL byte", name);
				None
			},
			Err(err) => {
				log!(trace, "Symbol `{}` not exported by `{}`: {}", name, self.path.display(), err);
				None
			},
		}
	}

	fn release(&mut self) {
		if let Some(lib) = self.lib.take() {
			log!(trace, "Release `{}`", self.path.display());
			drop(lib);
		}
	}

	fn is_released(&self) -> bool {
		self.lib.is_none()
	}
}

impl Drop for DynamicLibrary {
	fn drop(&mut self) {
		self.release();
	}
}

/// Message for a failed load, naming the module. The OS message is kept as is when
/// it already mentions the file.
pub(crate) fn format_error(e: dlopen::Error, path: &Path) -> String {
	let message = e.to_string();
	let name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();

	if name.is_empty() || message.contains(&*name) {
		message
	} else {
		format!("{name}: {message}")
	}
}
