//! Stub ATS plugin.
//!
//! Exports the whole plugin catalogue and records every call it receives, so test
//! suites can load it as a real shared object and read back what crossed the
//! boundary through the extra `Last*` / `Call*` exports.
//!
//! State is kept per calling thread, so concurrently running tests that load the
//! same file do not observe each other.

#![allow(non_snake_case)]

use atspi_primitives::{Beacon, Hand, Spec, State};
use std::cell::{Cell, RefCell};

/// Version reported by `GetPluginVersion`.
pub const VERSION: u32 = 0x0002_0001;

const LOG_CAPACITY: usize = 256;

/// Codes stored in the call log, one per exported entry point.
pub mod calls {
	pub const GET_PLUGIN_VERSION: i32 = 0;
	pub const INITIALIZE: i32 = 1;
	pub const SET_VEHICLE_SPEC: i32 = 2;
	pub const ELAPSE: i32 = 3;
	pub const SET_POWER: i32 = 4;
	pub const SET_BRAKE: i32 = 5;
	pub const SET_REVERSER: i32 = 6;
	pub const KEY_DOWN: i32 = 7;
	pub const KEY_UP: i32 = 8;
	pub const HORN_BLOW: i32 = 9;
	pub const DOOR_OPEN: i32 = 10;
	pub const DOOR_CLOSE: i32 = 11;
	pub const SET_SIGNAL: i32 = 12;
	pub const SET_BEACON_DATA: i32 = 13;
	pub const LOAD: i32 = 14;
	pub const DISPOSE: i32 = 15;
}

const ZERO_STATE: State = State {
	location: 0.0,
	speed: 0.0,
	time: 0,
	bc_pressure: 0.0,
	mr_pressure: 0.0,
	er_pressure: 0.0,
	bp_pressure: 0.0,
	sap_pressure: 0.0,
	current: 0.0,
};

thread_local! {
	static LOG: RefCell<[i32; LOG_CAPACITY]> = const { RefCell::new([0; LOG_CAPACITY]) };
	static LOG_LEN: Cell<usize> = const { Cell::new(0) };
	static LAST_VALUE: Cell<i32> = const { Cell::new(0) };
	static LAST_SPEC: Cell<Spec> = const {
		Cell::new(Spec { brake_notches: 0, power_notches: 0, ats_notch: 0, b67_notch: 0, cars: 0 })
	};
	static LAST_STATE: Cell<State> = const { Cell::new(ZERO_STATE) };
	static LAST_BEACON: Cell<Beacon> = const {
		Cell::new(Beacon { kind: 0, signal: 0, distance: 0.0, optional: 0 })
	};
	static ELAPSE_COUNT: Cell<u32> = const { Cell::new(0) };
	static POWER: Cell<i32> = const { Cell::new(0) };
	static BRAKE: Cell<i32> = const { Cell::new(0) };
	static REVERSER: Cell<i32> = const { Cell::new(0) };
}

fn record(call: i32) {
	let len = LOG_LEN.get();
	if len < LOG_CAPACITY {
		LOG.with(|log| log.borrow_mut()[len] = call);
		LOG_LEN.set(len + 1);
	}
}

fn record_value(call: i32, value: i32) {
	record(call);
	LAST_VALUE.set(value);
}

#[no_mangle]
pub extern "system" fn GetPluginVersion() -> u32 {
	record(calls::GET_PLUGIN_VERSION);
	VERSION
}

#[no_mangle]
pub extern "system" fn Initialize(position: i32) {
	record_value(calls::INITIALIZE, position);
}

#[no_mangle]
pub extern "system" fn SetVehicleSpec(spec: Spec) {
	record(calls::SET_VEHICLE_SPEC);
	LAST_SPEC.set(spec);
}

/// Echoes the frame: brake notch is the state time, power and reverser are the last
/// positions set. The elapse count is written to `panel[0]` when `panel` is not null.
///
/// # Safety
///
/// `panel` must be null or valid for one `i32` write.
#[no_mangle]
pub unsafe extern "system" fn Elapse(state: State, panel: *mut i32, _sound: *mut i32) -> Hand {
	record(calls::ELAPSE);
	LAST_STATE.set(state);
	let count = ELAPSE_COUNT.get() + 1;
	ELAPSE_COUNT.set(count);

	if !panel.is_null() {
		*panel = count as i32;
	}

	Hand { brake: state.time, power: POWER.get(), reverser: REVERSER.get(), constant_speed: 0 }
}

#[no_mangle]
pub extern "system" fn SetPower(notch: i32) {
	record_value(calls::SET_POWER, notch);
	POWER.set(notch);
}

#[no_mangle]
pub extern "system" fn SetBrake(notch: i32) {
	record_value(calls::SET_BRAKE, notch);
	BRAKE.set(notch);
}

#[no_mangle]
pub extern "system" fn SetReverser(position: i32) {
	record_value(calls::SET_REVERSER, position);
	REVERSER.set(position);
}

#[no_mangle]
pub extern "system" fn KeyDown(key: i32) {
	record_value(calls::KEY_DOWN, key);
}

#[no_mangle]
pub extern "system" fn KeyUp(key: i32) {
	record_value(calls::KEY_UP, key);
}

#[no_mangle]
pub extern "system" fn HornBlow(horn: i32) {
	record_value(calls::HORN_BLOW, horn);
}

#[no_mangle]
pub extern "system" fn DoorOpen() {
	record(calls::DOOR_OPEN);
}

#[no_mangle]
pub extern "system" fn DoorClose() {
	record(calls::DOOR_CLOSE);
}

#[no_mangle]
pub extern "system" fn SetSignal(signal: i32) {
	record_value(calls::SET_SIGNAL, signal);
}

#[no_mangle]
pub extern "system" fn SetBeaconData(beacon: Beacon) {
	record(calls::SET_BEACON_DATA);
	LAST_BEACON.set(beacon);
}

#[no_mangle]
pub extern "system" fn Load() {
	record(calls::LOAD);
}

#[no_mangle]
pub extern "system" fn Dispose() {
	record(calls::DISPOSE);
}

// Inspection exports, not part of the plugin interface.

#[no_mangle]
pub extern "system" fn LastVehicleSpec() -> Spec {
	LAST_SPEC.get()
}

#[no_mangle]
pub extern "system" fn LastState() -> State {
	LAST_STATE.get()
}

#[no_mangle]
pub extern "system" fn LastBeacon() -> Beacon {
	LAST_BEACON.get()
}

#[no_mangle]
pub extern "system" fn LastValue() -> i32 {
	LAST_VALUE.get()
}

#[no_mangle]
pub extern "system" fn ElapseCount() -> u32 {
	ELAPSE_COUNT.get()
}

#[no_mangle]
pub extern "system" fn CallCount() -> u32 {
	LOG_LEN.get() as u32
}

/// Code of the `index`th recorded call, `-1` past the end of the log.
#[no_mangle]
pub extern "system" fn CallAt(index: u32) -> i32 {
	let index = index as usize;
	if index >= LOG_LEN.get() {
		return -1
	}
	LOG.with(|log| log.borrow()[index])
}

/// Clears the call log and every recorded value for the calling thread.
#[no_mangle]
pub extern "system" fn ResetCalls() {
	LOG_LEN.set(0);
	LAST_VALUE.set(0);
	LAST_STATE.set(ZERO_STATE);
	LAST_SPEC.set(Spec::default());
	LAST_BEACON.set(Beacon::default());
	ELAPSE_COUNT.set(0);
	POWER.set(0);
	BRAKE.set(0);
	REVERSER.set(0);
}
