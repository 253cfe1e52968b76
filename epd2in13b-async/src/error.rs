use core::fmt;

use thiserror::Error as ThisError;

use crate::epd2in13b::Command;

/// The driver operation that was in progress when an error occurred.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    Paint,
    Clear,
    Window,
    Cursor,
    Sleep,
    LoadLut,
    Send,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Paint => "paint",
            Operation::Clear => "clear",
            Operation::Window => "window",
            Operation::Cursor => "cursor",
            Operation::Sleep => "sleep",
            Operation::LoadLut => "lut",
            Operation::Send => "send",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two 1-bit layers composited by the controller.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Black,
    Red,
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::Black => f.write_str("black"),
            Plane::Red => f.write_str("red"),
        }
    }
}

/// Errors returned by the display driver.
///
/// `E` is the error type of the underlying [crate::hw::Transport]. The transport error is kept
/// unchanged, only annotated with the operation in progress.
#[derive(Debug, ThisError)]
pub enum Error<E> {
    /// The transport failed to move bytes or drive a pin. The controller's state afterwards is
    /// unknown, so the display must be re-initialised.
    #[error("{op} failed sending {command:?}: {cause:?}")]
    Transport {
        op: Operation,
        /// The command being sent, or `None` for the reset pulse and busy line reads.
        command: Option<Command>,
        cause: E,
    },
    /// The controller did not report idle in time.
    #[error("{op} timed out after {waited_ms} ms waiting for the display to become idle")]
    Timeout { op: Operation, waited_ms: u32 },
    /// A framebuffer plane had the wrong length. Nothing was sent to the display.
    #[error("{plane} plane is {actual} bytes, expected {expected}")]
    InvalidSize {
        plane: Plane,
        expected: usize,
        actual: usize,
    },
}

impl<E> Error<E> {
    /// The operation this error was raised from, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Error::Transport { op, .. } | Error::Timeout { op, .. } => Some(*op),
            Error::InvalidSize { .. } => None,
        }
    }
}

/// Errors converting a bitmap into the controller's RAM format.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ConvertError {
    /// The bitmap is neither the panel's native size nor its rotated size.
    #[error("bitmap is {width}x{height} pixels, which matches neither orientation of the panel")]
    SizeMismatch { width: u32, height: u32 },
}
