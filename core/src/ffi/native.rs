use libffi::middle::{Arg, Type};
use serde::Deserialize;
use std::ffi::c_void;

/// Primitive types a dynamically described foreign function may take or return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeType {
	Void,
	Bool,
	U8,
	I8,
	U16,
	I16,
	U32,
	I32,
	U64,
	I64,
	USize,
	ISize,
	F32,
	F64,
	Pointer,
	Function,
}

impl From<NativeType> for Type {
	fn from(native_type: NativeType) -> Self {
		match native_type {
			NativeType::Void => Type::void(),
			NativeType::U8 | NativeType::Bool => Type::u8(),
			NativeType::I8 => Type::i8(),
			NativeType::U16 => Type::u16(),
			NativeType::I16 => Type::i16(),
			NativeType::U32 => Type::u32(),
			NativeType::I32 => Type::i32(),
			NativeType::U64 => Type::u64(),
			NativeType::I64 => Type::i64(),
			NativeType::USize => Type::usize(),
			NativeType::ISize => Type::isize(),
			NativeType::F32 => Type::f32(),
			NativeType::F64 => Type::f64(),
			NativeType::Pointer | NativeType::Function => Type::pointer(),
		}
	}
}

/// A typed value crossing a dynamic call, either as argument or result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeValue {
	Void,
	Bool(bool),
	U8(u8),
	I8(i8),
	U16(u16),
	I16(i16),
	U32(u32),
	I32(i32),
	U64(u64),
	I64(i64),
	USize(usize),
	ISize(isize),
	F32(f32),
	F64(f64),
	Pointer(*mut c_void),
	Function(*mut c_void),
}

impl NativeValue {
	pub fn native_type(&self) -> NativeType {
		match self {
			NativeValue::Void => NativeType::Void,
			NativeValue::Bool(_) => NativeType::Bool,
			NativeValue::U8(_) => NativeType::U8,
			NativeValue::I8(_) => NativeType::I8,
			NativeValue::U16(_) => NativeType::U16,
			NativeValue::I16(_) => NativeType::I16,
			NativeValue::U32(_) => NativeType::U32,
			NativeValue::I32(_) => NativeType::I32,
			NativeValue::U64(_) => NativeType::U64,
			NativeValue::I64(_) => NativeType::I64,
			NativeValue::USize(_) => NativeType::USize,
			NativeValue::ISize(_) => NativeType::ISize,
			NativeValue::F32(_) => NativeType::F32,
			NativeValue::F64(_) => NativeType::F64,
			NativeValue::Pointer(_) => NativeType::Pointer,
			NativeValue::Function(_) => NativeType::Function,
		}
	}

	/// Borrows the payload as a libffi argument. The returned `Arg` points into
	/// `self` and must not outlive it.
	pub(crate) fn as_arg(&self) -> Arg {
		match self {
			NativeValue::Void => unreachable!("void is not a valid argument"),
			NativeValue::Bool(value) => Arg::new(value),
			NativeValue::U8(value) => Arg::new(value),
			NativeValue::I8(value) => Arg::new(value),
			NativeValue::U16(value) => Arg::new(value),
			NativeValue::I16(value) => Arg::new(value),
			NativeValue::U32(value) => Arg::new(value),
			NativeValue::I32(value) => Arg::new(value),
			NativeValue::U64(value) => Arg::new(value),
			NativeValue::I64(value) => Arg::new(value),
			NativeValue::USize(value) => Arg::new(value),
			NativeValue::ISize(value) => Arg::new(value),
			NativeValue::F32(value) => Arg::new(value),
			NativeValue::F64(value) => Arg::new(value),
			NativeValue::Pointer(value) | NativeValue::Function(value) => Arg::new(value),
		}
	}
}
