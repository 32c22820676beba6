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

//! Payload types exchanged with native ATS plugins.
//!
//! Every type in this crate is `#[repr(C)]` and passed **by value** across the
//! plugin boundary. Field order and primitive widths are part of the external
//! interface: a plugin compiled against the classic `atsplugin.h` header reads
//! these structures with exactly this layout, so fields must never be reordered,
//! widened or wrapped.
//!
//! The layout is asserted at compile time at the bottom of this file.

use serde::{Deserialize, Serialize};
use std::mem::{align_of, size_of};

/// Interface version reported for plugins that do not export `GetPluginVersion`.
pub const PLUGIN_VERSION: u32 = 0x0002_0000;

/// Length of the panel array hosts conventionally hand to `Elapse`.
pub const PANEL_SIZE: usize = 256;
/// Length of the sound array hosts conventionally hand to `Elapse`.
pub const SOUND_SIZE: usize = 256;

/// Initial handle position passed to `Initialize`.
pub mod init {
	/// Service brake applied
	pub const SERVICE_BRAKE: i32 = 0;
	/// Emergency brake applied
	pub const EMERGENCY_BRAKE: i32 = 1;
	/// Brake released
	pub const REMOVED: i32 = 2;
}

/// Reverser handle positions.
pub mod reverser {
	pub const BACKWARD: i32 = -1;
	pub const NEUTRAL: i32 = 0;
	pub const FORWARD: i32 = 1;
}

/// Horn kinds passed to `HornBlow`.
pub mod horn {
	pub const PRIMARY: i32 = 0;
	pub const SECONDARY: i32 = 1;
	pub const MUSIC: i32 = 2;
}

/// Vehicle specification, sent once through `SetVehicleSpec`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Spec {
	/// Number of brake notches
	pub brake_notches: i32,
	/// Number of power notches
	pub power_notches: i32,
	/// Brake notch required to confirm the ATS
	pub ats_notch: i32,
	/// Maximum service brake notch
	pub b67_notch: i32,
	/// Number of cars in the train
	pub cars: i32,
}

/// Vehicle state, sent every frame through `Elapse`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct State {
	/// Train location [m]
	pub location: f64,
	/// Train speed [km/h]
	pub speed: f32,
	/// Time of day [ms since midnight]
	pub time: i32,
	/// Brake cylinder pressure [kPa]
	pub bc_pressure: f32,
	/// Main reservoir pressure [kPa]
	pub mr_pressure: f32,
	/// Equalizing reservoir pressure [kPa]
	pub er_pressure: f32,
	/// Brake pipe pressure [kPa]
	pub bp_pressure: f32,
	/// Straight air pipe pressure [kPa]
	pub sap_pressure: f32,
	/// Traction current [A]
	pub current: f32,
}

/// Handle positions requested by the plugin, returned from `Elapse`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hand {
	/// Brake notch
	pub brake: i32,
	/// Power notch
	pub power: i32,
	/// Reverser position
	pub reverser: i32,
	/// Constant speed control request, see [`ConstantSpeed`]
	pub constant_speed: i32,
}

impl Hand {
	/// Interprets [`Hand::constant_speed`], `None` for values outside the known range.
	pub fn constant_speed(&self) -> Option<ConstantSpeed> {
		ConstantSpeed::from_raw(self.constant_speed)
	}
}

/// Data of a beacon the train just passed, sent through `SetBeaconData`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Beacon {
	/// Beacon type
	pub kind: i32,
	/// Aspect of the section the beacon refers to
	pub signal: i32,
	/// Distance to that section [m]
	pub distance: f32,
	/// Optional data attached to the beacon
	pub optional: i32,
}

/// Constant speed control states carried by [`Hand::constant_speed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(i32)]
pub enum ConstantSpeed {
	/// Keep the current state
	Continue = 0,
	Enable = 1,
	Disable = 2,
}

impl ConstantSpeed {
	pub fn from_raw(value: i32) -> Option<Self> {
		match value {
			0 => Some(Self::Continue),
			1 => Some(Self::Enable),
			2 => Some(Self::Disable),
			_ => None,
		}
	}
}

impl From<ConstantSpeed> for i32 {
	fn from(value: ConstantSpeed) -> Self {
		value as i32
	}
}

const _: () = {
	assert!(size_of::<Spec>() == 20 && align_of::<Spec>() == 4);
	assert!(size_of::<State>() == 40 && align_of::<State>() == 8);
	assert!(size_of::<Hand>() == 16 && align_of::<Hand>() == 4);
	assert!(size_of::<Beacon>() == 16 && align_of::<Beacon>() == 4);
};
