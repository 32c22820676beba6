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

use crate::ffi::NativeType;
use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while loading a plugin module.
///
/// A missing capability is *not* an error: the facade answers it with a no-op or a
/// default value. Only construction and the dynamic call escape hatch can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The plugin path does not point to an existing file. Raised before the OS
	/// loader is touched.
	#[error("plugin module `{}` does not exist", .0.display())]
	NotFound(PathBuf),

	/// The file exists but the OS loader refused it (corrupt binary, wrong
	/// architecture, missing dependency...).
	#[error("unable to load plugin module `{}`: {message}", .path.display())]
	Load { path: PathBuf, message: String },

	/// The directory of the running executable could not be determined, so a
	/// relative plugin path cannot be resolved.
	#[error("unable to locate the host executable directory")]
	HostPath(#[source] io::Error),

	/// Arguments given to a dynamic call do not match its declared parameters.
	#[error("foreign function expects {expected:?}, got {actual:?}")]
	Signature { expected: Vec<NativeType>, actual: Vec<NativeType> },
}
