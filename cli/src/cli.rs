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
	log,
	util::display::{write_json_line, write_json_pretty, write_to_stdout_ignore_sigpipe},
	version,
};
use anyhow::{bail, Context, Result};
use atspi_core::{
	ffi::{ForeignFunction, NativeType, NativeValue},
	primitives::{init, reverser, Hand, Spec, State, PANEL_SIZE, SOUND_SIZE},
	Capability, NativeAtsPlugin,
};
use clap::Parser;
use console::style;
use serde::{de::DeserializeOwned, Serialize};
use std::{
	ffi::c_void,
	fs,
	path::{Path, PathBuf},
};

const MS_PER_DAY: i32 = 86_400_000;

const DEFAULT_SPEC: Spec =
	Spec { brake_notches: 8, power_notches: 5, ats_notch: 1, b67_notch: 6, cars: 10 };

#[derive(Debug, Parser)]
#[command(name = "atspi", version = version::atspi(), about = "Host for native ATS plugins")]
pub struct Cli {
	/// Log level of the atspi crates, takes precedence over `RUST_LOG`
	#[arg(long, global = true)]
	pub log_level: Option<log::LevelFilter>,
	#[clap(subcommand)]
	pub subcommand: Subcommand,
}

#[derive(Debug, Parser)]
pub enum Subcommand {
	/// Print the interface version and the entry points a plugin exports.
	Inspect(InspectCmd),
	/// Drive a plugin through a short session and print the handles it requests.
	Run(RunCmd),
	/// Call any export of a plugin with a signature given as JSON.
	Call(CallCmd),
}

#[derive(Debug, Parser)]
pub struct InspectCmd {
	/// Plugin path, relative paths are resolved against the atspi executable
	pub plugin: PathBuf,
	/// Print the report as JSON
	#[arg(long, default_value_t = false)]
	pub json: bool,
}

#[derive(Debug, Parser)]
pub struct RunCmd {
	pub plugin: PathBuf,
	/// JSON file holding the vehicle spec
	#[arg(long)]
	pub spec: Option<PathBuf>,
	/// JSON file holding the initial vehicle state
	#[arg(long)]
	pub state: Option<PathBuf>,
	#[arg(long, default_value_t = 10)]
	pub frames: u32,
	/// Simulated time between two frames
	#[arg(long, default_value_t = 16)]
	pub step_ms: i32,
	/// Initial handle position passed to `Initialize`
	#[arg(long, default_value_t = init::SERVICE_BRAKE, allow_hyphen_values = true)]
	pub init: i32,
	#[arg(long, default_value_t = reverser::NEUTRAL, allow_hyphen_values = true)]
	pub reverser: i32,
	#[arg(long, default_value_t = 0)]
	pub power: i32,
	#[arg(long, default_value_t = 0)]
	pub brake: i32,
}

#[derive(Debug, Parser)]
pub struct CallCmd {
	pub plugin: PathBuf,
	/// Exported symbol name
	pub symbol: String,
	/// Signature, e.g. `{"parameters": ["i32"], "result": "u32"}`
	#[arg(long)]
	pub signature: String,
	/// Arguments, one per parameter
	#[arg(allow_hyphen_values = true)]
	pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport {
	path: PathBuf,
	version: u32,
	capabilities: Vec<CapabilityReport>,
}

#[derive(Debug, Serialize)]
struct CapabilityReport {
	name: &'static str,
	exported: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Frame {
	frame: u32,
	time: i32,
	hand: Hand,
}

fn load(path: &Path) -> Result<NativeAtsPlugin> {
	NativeAtsPlugin::new(path).with_context(|| format!("unable to load plugin `{}`", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
	let raw = fs::read_to_string(path).with_context(|| format!("unable to read `{}`", path.display()))?;
	serde_json::from_str(&raw).with_context(|| format!("invalid JSON in `{}`", path.display()))
}

impl InspectCmd {
	pub fn run(&self) -> Result<()> {
		let plugin = load(&self.plugin)?;
		let report = InspectReport {
			path: self.plugin.clone(),
			version: plugin.version(),
			capabilities: Capability::ALL
				.into_iter()
				.map(|capability| CapabilityReport {
					name: capability.symbol_name(),
					exported: plugin.has(capability),
				})
				.collect(),
		};

		if self.json {
			return write_json_pretty(&report)
		}

		let mut out = format!(
			"{}\ninterface version {:#010x}\n",
			style(report.path.display()).bold(),
			report.version
		);
		for capability in &report.capabilities {
			let line = if capability.exported {
				format!("  {} {}\n", style("+").green().bold(), capability.name)
			} else {
				format!("  {} {}\n", style("-").red(), style(capability.name).dim())
			};
			out.push_str(&line);
		}
		write_to_stdout_ignore_sigpipe(out.as_bytes())?;
		Ok(())
	}
}

impl RunCmd {
	pub fn run(&self) -> Result<()> {
		let spec = match &self.spec {
			Some(path) => read_json(path)?,
			None => DEFAULT_SPEC,
		};
		let mut state: State = match &self.state {
			Some(path) => read_json(path)?,
			None => State::default(),
		};

		let mut plugin = load(&self.plugin)?;
		log!(
			info,
			"Running `{}` (interface version {:#010x}) for {} frames",
			self.plugin.display(),
			plugin.version(),
			self.frames
		);

		plugin.load();
		plugin.set_vehicle_spec(spec);
		plugin.initialize(self.init);
		plugin.set_reverser(self.reverser);
		plugin.set_power(self.power);
		plugin.set_brake(self.brake);

		let (mut panel, mut sound) = ([0; PANEL_SIZE], [0; SOUND_SIZE]);
		let result = (0..self.frames).try_for_each(|frame| {
			state.time = advance_time(state.time, self.step_ms);
			let hand = plugin.elapse(state, &mut panel, &mut sound);
			write_json_line(&Frame { frame, time: state.time, hand })
		});

		plugin.dispose();
		result
	}
}

impl CallCmd {
	pub fn run(&self) -> Result<()> {
		let signature: ForeignFunction =
			serde_json::from_str(&self.signature).context("invalid signature")?;
		let args = parse_args(&signature.parameters, &self.args)?;

		let plugin = load(&self.plugin)?;
		let Some(symbol) = plugin.foreign_function(&self.symbol, &signature)? else {
			bail!("`{}` is not exported by `{}`", self.symbol, self.plugin.display())
		};

		log!(debug, "Calling {:?}", symbol);
		// SAFETY: the caller vouches for the signature, see `atspi call --help`.
		let value = unsafe { symbol.call(&args)? };

		if let Some(formatted) = format_value(&value) {
			write_to_stdout_ignore_sigpipe(format!("{formatted}\n").as_bytes())?;
		}
		Ok(())
	}
}

fn parse_args(parameters: &[NativeType], raw: &[String]) -> Result<Vec<NativeValue>> {
	if parameters.len() != raw.len() {
		bail!("expected {} arguments, got {}", parameters.len(), raw.len())
	}

	parameters
		.iter()
		.zip(raw)
		.map(|(native_type, raw)| {
			parse_value(*native_type, raw)
				.with_context(|| format!("invalid {native_type:?} argument `{raw}`"))
		})
		.collect()
}

fn parse_value(native_type: NativeType, raw: &str) -> Result<NativeValue> {
	let value = match native_type {
		NativeType::Void => bail!("`void` cannot be passed as an argument"),
		NativeType::Bool => NativeValue::Bool(raw.parse()?),
		NativeType::U8 => NativeValue::U8(raw.parse()?),
		NativeType::I8 => NativeValue::I8(raw.parse()?),
		NativeType::U16 => NativeValue::U16(raw.parse()?),
		NativeType::I16 => NativeValue::I16(raw.parse()?),
		NativeType::U32 => NativeValue::U32(raw.parse()?),
		NativeType::I32 => NativeValue::I32(raw.parse()?),
		NativeType::U64 => NativeValue::U64(raw.parse()?),
		NativeType::I64 => NativeValue::I64(raw.parse()?),
		NativeType::USize => NativeValue::USize(raw.parse()?),
		NativeType::ISize => NativeValue::ISize(raw.parse()?),
		NativeType::F32 => NativeValue::F32(raw.parse()?),
		NativeType::F64 => NativeValue::F64(raw.parse()?),
		NativeType::Pointer => NativeValue::Pointer(parse_address(raw)? as *mut c_void),
		NativeType::Function => NativeValue::Function(parse_address(raw)? as *mut c_void),
	};
	Ok(value)
}

fn parse_address(raw: &str) -> Result<usize> {
	if raw == "null" {
		return Ok(0)
	}
	match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
		Some(hex) => Ok(usize::from_str_radix(hex, 16)?),
		None => Ok(raw.parse()?),
	}
}

/// Simulation clock after one frame, wrapped into a single day. Any `time` a state
/// file carries is accepted.
fn advance_time(time: i32, step_ms: i32) -> i32 {
	let next = (i64::from(time) + i64::from(step_ms)).rem_euclid(i64::from(MS_PER_DAY));
	// `next` is below `MS_PER_DAY`, which fits an `i32`.
	next as i32
}

/// `None` for `void` results, which print nothing.
fn format_value(value: &NativeValue) -> Option<String> {
	let formatted = match value {
		NativeValue::Void => return None,
		NativeValue::Bool(value) => value.to_string(),
		NativeValue::U8(value) => value.to_string(),
		NativeValue::I8(value) => value.to_string(),
		NativeValue::U16(value) => value.to_string(),
		NativeValue::I16(value) => value.to_string(),
		NativeValue::U32(value) => value.to_string(),
		NativeValue::I32(value) => value.to_string(),
		NativeValue::U64(value) => value.to_string(),
		NativeValue::I64(value) => value.to_string(),
		NativeValue::USize(value) => value.to_string(),
		NativeValue::ISize(value) => value.to_string(),
		NativeValue::F32(value) => value.to_string(),
		NativeValue::F64(value) => value.to_string(),
		NativeValue::Pointer(value) | NativeValue::Function(value) => format!("{value:p}"),
	};
	Some(formatted)
}
