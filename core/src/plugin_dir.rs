/* -------------------------------------------------------- *\
 *                                                          *
 *      atspi - native ATS plugin bindings                  *
 *                                                          *
 * -------------------------------------------------------- *
 *                                                          *
 *   This file is dual-licensed as Apache-2.0 or GPL-3.0.   *
 *   see LICENSE for license details.                       *
 *                                                          *
\* ---------------------------------------------------------*/

use crate::{Error, Result};
use once_cell::sync::OnceCell;
use std::{
	env::current_exe,
	path::{Path, PathBuf},
};

static HOST_DIR: OnceCell<PluginDir> = OnceCell::new();

/// Directory relative plugin paths are resolved against.
#[derive(Debug, Clone)]
pub struct PluginDir {
	root: PathBuf,
}

impl PluginDir {
	pub fn new(root: PathBuf) -> Self {
		Self { root }
	}

	/// The directory containing the running executable.
	pub fn host() -> Result<&'static Self> {
		HOST_DIR.get_or_try_init(|| {
			let exe = current_exe().map_err(Error::HostPath)?;
			let root = exe.parent().map(Path::to_path_buf).unwrap_or_default();
			Ok(Self::new(root))
		})
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// `path` itself when absolute, `path` under this directory otherwise.
	pub fn join(&self, path: &Path) -> PathBuf {
		resolve_against(&self.root, path)
	}
}

/// Resolves a plugin path: absolute paths are kept unmodified, relative paths are
/// taken relative to the host executable directory, not the working directory.
pub fn resolve(path: &Path) -> Result<PathBuf> {
	if path.is_absolute() {
		return Ok(path.to_path_buf())
	}
	Ok(PluginDir::host()?.join(path))
}

pub fn resolve_against(base_dir: &Path, path: &Path) -> PathBuf {
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		base_dir.join(path)
	}
}
