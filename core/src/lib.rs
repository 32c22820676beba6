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

//! Loads native ATS plugins at runtime and exposes their entry points as a typed,
//! null-safe call surface.
//!
//! - [`DynamicLibrary`] owns the OS handle of one shared object, resolves symbols by
//!   name and closes the handle exactly once.
//! - [`NativeAtsPlugin`] binds the fixed set of ATS plugin entry points against a
//!   loaded module. Entry points the plugin does not export turn into no-ops or
//!   default values, never into errors.
//!
//! # Example
//! ```no_run
//! use atspi_core::{NativeAtsPlugin, primitives::{State, PANEL_SIZE, SOUND_SIZE}};
//!
//! let mut plugin = NativeAtsPlugin::new("plugins/ats.so")?;
//! plugin.load();
//! plugin.initialize(atspi_core::primitives::init::SERVICE_BRAKE);
//!
//! let (mut panel, mut sound) = ([0; PANEL_SIZE], [0; SOUND_SIZE]);
//! let hand = plugin.elapse(State::default(), &mut panel, &mut sound);
//! println!("plugin requests brake notch {}", hand.brake);
//!
//! plugin.dispose();
//! # Ok::<(), atspi_core::Error>(())
//! ```

mod errors;
pub mod ffi;
mod plugin;
pub mod plugin_dir;

pub use atspi_primitives as primitives;
pub use errors::{Error, Result};
pub use ffi::{DynamicLibrary, Module};
pub use plugin::{Capability, NativeAtsPlugin};

#[macro_export]
macro_rules! log {
	($level:tt, $patter:expr $(, $values:expr)* $(,)?) => {
		log::$level!(
			target: "atspi::core",
			$patter $(, $values)*
		)
	};
}
