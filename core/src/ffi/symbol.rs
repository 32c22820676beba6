use super::{NativeType, NativeValue};
use crate::{Error, Result};
use libffi::middle::{Arg, Cif, CodePtr, Type};
use serde::Deserialize;
use std::{ffi::c_void, marker::PhantomData, ptr::NonNull};

/// Runtime description of a foreign function signature.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForeignFunction {
	/// Exported name, when it differs from the name used for lookup.
	pub name: Option<String>,
	#[serde(default)]
	pub parameters: Vec<NativeType>,
	#[serde(default = "void")]
	pub result: NativeType,
}

fn void() -> NativeType {
	NativeType::Void
}

/// A symbol bound to a runtime-described signature, callable through libffi.
///
/// Borrows the module it was resolved from, so it cannot be used once the module
/// has been released.
pub struct DynamicSymbol<'m> {
	name: String,
	cif: Cif,
	ptr: CodePtr,
	parameter_types: Vec<NativeType>,
	result_type: NativeType,
	_module: PhantomData<&'m ()>,
}

impl std::fmt::Debug for DynamicSymbol<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DynamicSymbol")
			.field("name", &self.name)
			.field("parameters", &self.parameter_types)
			.field("result", &self.result_type)
			.finish()
	}
}

impl<'m> DynamicSymbol<'m> {
	pub(crate) fn new(name: &str, ptr: NonNull<c_void>, signature: &ForeignFunction) -> Result<Self> {
		if signature.parameters.contains(&NativeType::Void) {
			return Err(Error::Signature {
				expected: signature.parameters.iter().copied().filter(|t| *t != NativeType::Void).collect(),
				actual: signature.parameters.clone(),
			})
		}

		let cif = Cif::new(
			signature.parameters.iter().copied().map(Type::from).collect::<Vec<_>>(),
			signature.result.into(),
		);

		Ok(Self {
			name: name.to_string(),
			cif,
			ptr: CodePtr::from_ptr(ptr.as_ptr() as *const c_void),
			parameter_types: signature.parameters.clone(),
			result_type: signature.result,
			_module: PhantomData,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn parameters(&self) -> &[NativeType] {
		&self.parameter_types
	}

	pub fn result(&self) -> NativeType {
		self.result_type
	}

	/// Calls the symbol with `args`, which must match the declared parameters one
	/// for one.
	///
	/// # Safety
	///
	/// The declared signature must be the real signature of the native function, and
	/// any pointer passed must be valid for whatever the function does with it.
	pub unsafe fn call(&self, args: &[NativeValue]) -> Result<NativeValue> {
		let actual = args.iter().map(NativeValue::native_type).collect::<Vec<_>>();
		if actual != self.parameter_types {
			return Err(Error::Signature { expected: self.parameter_types.clone(), actual })
		}

		let call_args = args.iter().map(NativeValue::as_arg).collect::<Vec<Arg>>();
		let (cif, ptr) = (&self.cif, self.ptr);

		// Integral results narrower than a register are written as a full `ffi_arg`,
		// read them through a word-sized slot.
		let value = match self.result_type {
			NativeType::Void => {
				cif.call::<()>(ptr, &call_args);
				NativeValue::Void
			},
			NativeType::Bool => NativeValue::Bool(cif.call::<usize>(ptr, &call_args) as u8 != 0),
			NativeType::U8 => NativeValue::U8(cif.call::<usize>(ptr, &call_args) as u8),
			NativeType::I8 => NativeValue::I8(cif.call::<usize>(ptr, &call_args) as i8),
			NativeType::U16 => NativeValue::U16(cif.call::<usize>(ptr, &call_args) as u16),
			NativeType::I16 => NativeValue::I16(cif.call::<usize>(ptr, &call_args) as i16),
			NativeType::U32 => NativeValue::U32(cif.call::<usize>(ptr, &call_args) as u32),
			NativeType::I32 => NativeValue::I32(cif.call::<usize>(ptr, &call_args) as i32),
			NativeType::U64 => NativeValue::U64(cif.call::<u64>(ptr, &call_args)),
			NativeType::I64 => NativeValue::I64(cif.call::<i64>(ptr, &call_args)),
			NativeType::USize => NativeValue::USize(cif.call::<usize>(ptr, &call_args)),
			NativeType::ISize => NativeValue::ISize(cif.call::<isize>(ptr, &call_args)),
			NativeType::F32 => NativeValue::F32(cif.call::<f32>(ptr, &call_args)),
			NativeType::F64 => NativeValue::F64(cif.call::<f64>(ptr, &call_args)),
			NativeType::Pointer => NativeValue::Pointer(cif.call::<*mut c_void>(ptr, &call_args)),
			NativeType::Function => NativeValue::Function(cif.call::<*mut c_void>(ptr, &call_args)),
		};

		Ok(value)
	}
}
