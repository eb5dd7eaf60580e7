//! Error types for container parsing and resource decoding.

use thiserror::Error;

use crate::fourcc::fourcc_display;

/// Errors that can occur when parsing containers or decoding resources.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// A codec or parser reached end of input before a complete opcode or payload
	#[error("unexpected end of input at offset {offset}: needed {needed} more bytes")]
	UnexpectedEof {
		/// Read position where the shortfall was detected
		offset: usize,
		/// Number of bytes that could not be read
		needed: usize,
	},

	/// A signature field did not match its expected value
	#[error("bad magic: expected {:?}, found {:?}", fourcc_display(*.expected), fourcc_display(*.actual))]
	BadMagic {
		/// Expected signature value
		expected: u32,
		/// Signature value actually present
		actual: u32,
	},

	/// A recognized but unimplemented variant (e.g. PE32+, PICT without a delegate)
	#[error("unsupported feature: {0}")]
	Unsupported(String),

	/// Unknown value in an opcode-dispatched stream
	#[error("bad opcode {opcode:#04X} at offset {offset}")]
	BadOpcode {
		/// The offending opcode byte
		opcode: u8,
		/// Offset of the opcode in the input stream
		offset: usize,
	},

	/// Decoded coordinates or backreference offsets exceed the buffer
	#[error("out of bounds: {0}")]
	OutOfBounds(String),

	/// A length field disagrees with the observed data
	#[error("corrupt size: {0}")]
	CorruptSize(String),

	/// A required cross-referenced resource is absent
	#[error("missing resource {}:{id}", fourcc_display(*.type_tag))]
	MissingResource {
		/// Four-byte type of the missing resource
		type_tag: u32,
		/// Id of the missing resource
		id: i16,
	},

	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// WAV emission error
	#[error(transparent)]
	Wav(#[from] hound::Error),
}

impl DecodeError {
	/// Shorthand for an [`DecodeError::Unsupported`] with a formatted message.
	pub fn unsupported(message: impl Into<String>) -> Self {
		DecodeError::Unsupported(message.into())
	}

	/// Shorthand for an [`DecodeError::OutOfBounds`] with a formatted message.
	pub fn out_of_bounds(message: impl Into<String>) -> Self {
		DecodeError::OutOfBounds(message.into())
	}

	/// Shorthand for a [`DecodeError::CorruptSize`] with a formatted message.
	pub fn corrupt_size(message: impl Into<String>) -> Self {
		DecodeError::CorruptSize(message.into())
	}
}
