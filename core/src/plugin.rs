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

use crate::{
	ffi::{DynamicLibrary, DynamicSymbol, ForeignFunction, Module},
	log, plugin_dir, Result,
};
use atspi_primitives::{Beacon, Hand, Spec, State, PANEL_SIZE, PLUGIN_VERSION, SOUND_SIZE};
use std::{
	cell::Cell,
	ffi::c_void,
	fmt,
	marker::PhantomData,
	mem::{self, size_of},
	path::Path,
	ptr::NonNull,
};

type VoidFn = unsafe extern "system" fn();
type IntFn = unsafe extern "system" fn(i32);
type VersionFn = unsafe extern "system" fn() -> u32;
type SpecFn = unsafe extern "system" fn(Spec);
type ElapseFn = unsafe extern "system" fn(State, *mut i32, *mut i32) -> Hand;
type BeaconFn = unsafe extern "system" fn(Beacon);

/// Entry points a native ATS plugin may export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
	GetPluginVersion,
	Initialize,
	SetVehicleSpec,
	Elapse,
	SetPower,
	SetBrake,
	SetReverser,
	KeyDown,
	KeyUp,
	HornBlow,
	DoorOpen,
	DoorClose,
	SetSignal,
	SetBeaconData,
	Load,
	Dispose,
}

impl Capability {
	pub const ALL: [Capability; 16] = [
		Capability::GetPluginVersion,
		Capability::Initialize,
		Capability::SetVehicleSpec,
		Capability::Elapse,
		Capability::SetPower,
		Capability::SetBrake,
		Capability::SetReverser,
		Capability::KeyDown,
		Capability::KeyUp,
		Capability::HornBlow,
		Capability::DoorOpen,
		Capability::DoorClose,
		Capability::SetSignal,
		Capability::SetBeaconData,
		Capability::Load,
		Capability::Dispose,
	];

	/// Exact name of the exported symbol.
	pub const fn symbol_name(self) -> &'static str {
		match self {
			Capability::GetPluginVersion => "GetPluginVersion",
			Capability::Initialize => "Initialize",
			Capability::SetVehicleSpec => "SetVehicleSpec",
			Capability::Elapse => "Elapse",
			Capability::SetPower => "SetPower",
			Capability::SetBrake => "SetBrake",
			Capability::SetReverser => "SetReverser",
			Capability::KeyDown => "KeyDown",
			Capability::KeyUp => "KeyUp",
			Capability::HornBlow => "HornBlow",
			Capability::DoorOpen => "DoorOpen",
			Capability::DoorClose => "DoorClose",
			Capability::SetSignal => "SetSignal",
			Capability::SetBeaconData => "SetBeaconData",
			Capability::Load => "Load",
			Capability::Dispose => "Dispose",
		}
	}
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.symbol_name())
	}
}

/// Function pointers resolved from the module, `None` for every entry point the
/// module does not export.
///
/// Every `Some` holds an export with the declared signature, as promised by the
/// [`Module`] contract, and is callable for as long as the module is not released.
/// [`NativeAtsPlugin`] clears its bindings before releasing the module, so a stored
/// pointer is never called after unload.
#[derive(Default, Clone, Copy)]
struct Bindings {
	get_plugin_version: Option<VersionFn>,
	initialize: Option<IntFn>,
	set_vehicle_spec: Option<SpecFn>,
	elapse: Option<ElapseFn>,
	set_power: Option<IntFn>,
	set_brake: Option<IntFn>,
	set_reverser: Option<IntFn>,
	key_down: Option<IntFn>,
	key_up: Option<IntFn>,
	horn_blow: Option<IntFn>,
	door_open: Option<VoidFn>,
	door_close: Option<VoidFn>,
	set_signal: Option<IntFn>,
	set_beacon_data: Option<BeaconFn>,
	load: Option<VoidFn>,
	dispose: Option<VoidFn>,
}

impl Bindings {
	fn resolve<M: Module>(module: &M) -> Self {
		// SAFETY: `Module` implementors guarantee that catalogue names resolve to
		// functions with the catalogue signatures bound here.
		unsafe {
			Self {
				get_plugin_version: bind(module, Capability::GetPluginVersion),
				initialize: bind(module, Capability::Initialize),
				set_vehicle_spec: bind(module, Capability::SetVehicleSpec),
				elapse: bind(module, Capability::Elapse),
				set_power: bind(module, Capability::SetPower),
				set_brake: bind(module, Capability::SetBrake),
				set_reverser: bind(module, Capability::SetReverser),
				key_down: bind(module, Capability::KeyDown),
				key_up: bind(module, Capability::KeyUp),
				horn_blow: bind(module, Capability::HornBlow),
				door_open: bind(module, Capability::DoorOpen),
				door_close: bind(module, Capability::DoorClose),
				set_signal: bind(module, Capability::SetSignal),
				set_beacon_data: bind(module, Capability::SetBeaconData),
				load: bind(module, Capability::Load),
				dispose: bind(module, Capability::Dispose),
			}
		}
	}

	fn has(&self, capability: Capability) -> bool {
		match capability {
			Capability::GetPluginVersion => self.get_plugin_version.is_some(),
			Capability::Initialize => self.initialize.is_some(),
			Capability::SetVehicleSpec => self.set_vehicle_spec.is_some(),
			Capability::Elapse => self.elapse.is_some(),
			Capability::SetPower => self.set_power.is_some(),
			Capability::SetBrake => self.set_brake.is_some(),
			Capability::SetReverser => self.set_reverser.is_some(),
			Capability::KeyDown => self.key_down.is_some(),
			Capability::KeyUp => self.key_up.is_some(),
			Capability::HornBlow => self.horn_blow.is_some(),
			Capability::DoorOpen => self.door_open.is_some(),
			Capability::DoorClose => self.door_close.is_some(),
			Capability::SetSignal => self.set_signal.is_some(),
			Capability::SetBeaconData => self.set_beacon_data.is_some(),
			Capability::Load => self.load.is_some(),
			Capability::Dispose => self.dispose.is_some(),
		}
	}
}

/// # Safety
///
/// `F` must be the function pointer type matching the native export.
unsafe fn bind<M: Module, F: Copy>(module: &M, capability: Capability) -> Option<F> {
	let ptr = module.resolve(capability.symbol_name());
	if ptr.is_none() {
		log!(debug, "Plugin does not implement `{}`", capability);
	}
	ptr.and_then(|ptr| cast_fn(ptr))
}

/// # Safety
///
/// `F` must be a function pointer type valid for `ptr`.
unsafe fn cast_fn<F: Copy>(ptr: NonNull<c_void>) -> Option<F> {
	if size_of::<F>() != size_of::<*mut c_void>() {
		log!(warn, "Cannot bind a symbol to a {} byte type", size_of::<F>());
		return None
	}
	Some(mem::transmute_copy::<*mut c_void, F>(&ptr.as_ptr()))
}

/// Typed call surface over one loaded native ATS plugin.
///
/// Every entry point is resolved once, at construction. Calling one the module does
/// not export is a no-op, and value returning calls fall back to a default:
/// [`PLUGIN_VERSION`] for [`version`](Self::version) and a zeroed [`Hand`] for
/// [`elapse`](Self::elapse). After [`dispose`](Self::dispose) every entry point
/// behaves as absent.
///
/// Calls are forwarded synchronously, in order, on the caller's thread. The facade
/// can be moved to another thread (and dropped there) but is not `Sync`; hosts
/// sharing it between threads must provide their own locking.
///
/// Dropping the facade without disposing it releases the module but does **not**
/// call the plugin's `Dispose`.
pub struct NativeAtsPlugin<M: Module = DynamicLibrary> {
	module: M,
	bindings: Bindings,
	_not_sync: PhantomData<Cell<()>>,
}

impl NativeAtsPlugin<DynamicLibrary> {
	/// Loads the plugin at `path`.
	///
	/// Absolute paths are used as is, relative ones are resolved against the
	/// directory of the running executable (see [`plugin_dir::resolve`]).
	pub fn new(path: impl AsRef<Path>) -> Result<Self> {
		let path = plugin_dir::resolve(path.as_ref())?;
		let module = DynamicLibrary::open(path)?;
		Ok(Self::from_module(module))
	}
}

impl<M: Module> NativeAtsPlugin<M> {
	/// Binds the plugin entry points exported by an already loaded module.
	pub fn from_module(module: M) -> Self {
		let bindings = if module.is_released() { Bindings::default() } else { Bindings::resolve(&module) };
		let plugin = Self { module, bindings, _not_sync: PhantomData };

		log!(
			trace,
			"Bound plugin capabilities: {}",
			plugin.capabilities().map(Capability::symbol_name).collect::<Vec<_>>().join(", ")
		);

		plugin
	}

	pub fn module(&self) -> &M {
		&self.module
	}

	pub fn has(&self, capability: Capability) -> bool {
		self.bindings.has(capability)
	}

	/// Capabilities exported by the module, in catalogue order.
	pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
		Capability::ALL.into_iter().filter(|capability| self.has(*capability))
	}

	pub fn is_disposed(&self) -> bool {
		self.module.is_released()
	}

	/// Calls the plugin's `Dispose`, if any, then releases the module.
	///
	/// Calling it again is a no-op.
	pub fn dispose(&mut self) {
		if self.module.is_released() {
			return
		}

		let bindings = mem::take(&mut self.bindings);
		if let Some(dispose) = bindings.dispose {
			// SAFETY: see `Bindings`, the module is released only below.
			unsafe { dispose() };
		}

		self.module.release();
	}

	/// Looks up an export outside the plugin catalogue with a caller chosen
	/// function pointer type. Returns `None` when the symbol does not exist, the
	/// plugin is disposed, or `F` is not pointer sized.
	///
	/// # Safety
	///
	/// `F` must match the real signature of the export, and the returned value must
	/// not be called after the plugin is disposed or dropped.
	pub unsafe fn symbol<F: Copy>(&self, name: &str) -> Option<F> {
		self.module.resolve(name).and_then(|ptr| cast_fn(ptr))
	}

	/// Looks up an export outside the plugin catalogue and binds it to a signature
	/// described at runtime. `signature.name`, when set, overrides `name` as the
	/// exported symbol.
	///
	/// `Ok(None)` when the module does not export the symbol.
	pub fn foreign_function(
		&self,
		name: &str,
		signature: &ForeignFunction,
	) -> Result<Option<DynamicSymbol<'_>>> {
		let symbol = signature.name.as_deref().unwrap_or(name);
		match self.module.resolve(symbol) {
			Some(ptr) => DynamicSymbol::new(symbol, ptr, signature).map(Some),
			None => Ok(None),
		}
	}

	/// Interface version of the plugin.
	pub fn version(&self) -> u32 {
		match self.bindings.get_plugin_version {
			// SAFETY: see `Bindings`.
			Some(get_plugin_version) => unsafe { get_plugin_version() },
			None => PLUGIN_VERSION,
		}
	}

	/// Called once the train is placed, with the initial handle position.
	pub fn initialize(&self, position: i32) {
		if let Some(initialize) = self.bindings.initialize {
			// SAFETY: see `Bindings`.
			unsafe { initialize(position) }
		}
	}

	pub fn set_vehicle_spec(&self, spec: Spec) {
		if let Some(set_vehicle_spec) = self.bindings.set_vehicle_spec {
			// SAFETY: see `Bindings`.
			unsafe { set_vehicle_spec(spec) }
		}
	}

	/// Runs one frame. The plugin may write any entry of `panel` and `sound`.
	pub fn elapse(
		&self,
		state: State,
		panel: &mut [i32; PANEL_SIZE],
		sound: &mut [i32; SOUND_SIZE],
	) -> Hand {
		// SAFETY: see `Bindings`. Both arrays have the full length a plugin may write.
		unsafe { self.elapse_raw(state, panel.as_mut_ptr(), sound.as_mut_ptr()) }
	}

	/// Runs one frame, forwarding `panel` and `sound` untouched.
	///
	/// # Safety
	///
	/// Both pointers must be valid for whatever the plugin does with them, which for
	/// a conforming plugin means [`PANEL_SIZE`] and [`SOUND_SIZE`] writable integers.
	pub unsafe fn elapse_raw(&self, state: State, panel: *mut i32, sound: *mut i32) -> Hand {
		match self.bindings.elapse {
			// SAFETY: see `Bindings`, the caller vouches for both pointers.
			Some(elapse) => elapse(state, panel, sound),
			None => Hand::default(),
		}
	}

	pub fn set_power(&self, notch: i32) {
		if let Some(set_power) = self.bindings.set_power {
			// SAFETY: see `Bindings`.
			unsafe { set_power(notch) }
		}
	}

	pub fn set_brake(&self, notch: i32) {
		if let Some(set_brake) = self.bindings.set_brake {
			// SAFETY: see `Bindings`.
			unsafe { set_brake(notch) }
		}
	}

	pub fn set_reverser(&self, position: i32) {
		if let Some(set_reverser) = self.bindings.set_reverser {
			// SAFETY: see `Bindings`.
			unsafe { set_reverser(position) }
		}
	}

	pub fn key_down(&self, key: i32) {
		if let Some(key_down) = self.bindings.key_down {
			// SAFETY: see `Bindings`.
			unsafe { key_down(key) }
		}
	}

	pub fn key_up(&self, key: i32) {
		if let Some(key_up) = self.bindings.key_up {
			// SAFETY: see `Bindings`.
			unsafe { key_up(key) }
		}
	}

	pub fn horn_blow(&self, horn: i32) {
		if let Some(horn_blow) = self.bindings.horn_blow {
			// SAFETY: see `Bindings`.
			unsafe { horn_blow(horn) }
		}
	}

	pub fn door_open(&self) {
		if let Some(door_open) = self.bindings.door_open {
			// SAFETY: see `Bindings`.
			unsafe { door_open() }
		}
	}

	pub fn door_close(&self) {
		if let Some(door_close) = self.bindings.door_close {
			// SAFETY: see `Bindings`.
			unsafe { door_close() }
		}
	}

	/// Called when the aspect of the signal ahead changes.
	pub fn set_signal(&self, signal: i32) {
		if let Some(set_signal) = self.bindings.set_signal {
			// SAFETY: see `Bindings`.
			unsafe { set_signal(signal) }
		}
	}

	pub fn set_beacon_data(&self, beacon: Beacon) {
		if let Some(set_beacon_data) = self.bindings.set_beacon_data {
			// SAFETY: see `Bindings`.
			unsafe { set_beacon_data(beacon) }
		}
	}

	pub fn load(&self) {
		if let Some(load) = self.bindings.load {
			// SAFETY: see `Bindings`.
			unsafe { load() }
		}
	}
}

impl<M: Module> Drop for NativeAtsPlugin<M> {
	fn drop(&mut self) {
		if self.module.is_released() {
			return
		}

		log!(trace, "Drop undisposed `NativeAtsPlugin`, releasing module");
		self.bindings = Bindings::default();
		self.module.release();
	}
}

impl<M: Module> fmt::Debug for NativeAtsPlugin<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NativeAtsPlugin")
			.field("capabilities", &self.capabilities().collect::<Vec<_>>())
			.field("disposed", &self.is_disposed())
			.finish()
	}
}
