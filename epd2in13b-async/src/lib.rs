//! This crate provides an `async`/`await` driver for the 2.13" black/white/red e-paper display
//! (104x212 pixels, SSD1675B-style command set).
//!
//! It is built on top of `embedded-hal-async` and `embedded-graphics`, making it compatible with a
//! wide range of embedded platforms.
//!
//! ## Layers
//!
//! - [`hw::Transport`]: raw command/data transfer, the reset pulse and the busy line. It is
//!   implemented automatically for any type that hands out the SPI device, pins and delay through
//!   the [`hw::SpiHw`], [`hw::DcHw`], [`hw::ResetHw`], [`hw::BusyHw`], [`hw::DelayHw`] and
//!   [`hw::ErrorHw`] traits.
//! - [`buffer::BinaryBuffer`]: a compact 1-bit bitmap implementing `DrawTarget`, for rendering
//!   the black and red layers with `embedded-graphics`.
//! - [`ram::to_ram_format`]: converts a bitmap, portrait or landscape, into the controller's RAM
//!   layout.
//! - [`epd2in13b::Epd2In13b`]: the protocol driver. It initialises the controller, streams both
//!   planes into RAM, refreshes the panel and puts it into deep sleep.
//!
//! ```rust,ignore
//! let epd = Epd2In13b::new(hw, Delay).init().await?;
//! let black = to_ram_format(&black_layer)?;
//! let red = to_ram_format(&red_layer)?;
//! if let Painted::Asleep(epd) = epd.paint(&black, &red).await? {
//!     // `epd.init()` wakes the display for the next frame.
//! }
//! ```
#![cfg_attr(not(test), no_std)]

pub mod buffer;
pub mod epd2in13b;
pub mod error;
pub mod hw;
pub mod ram;

mod log;

pub use epd2in13b::{Config, Epd2In13b, Failed, PaintFailed, Painted};
pub use error::{ConvertError, Error, Operation, Plane};
pub use hw::Transport;
pub use ram::to_ram_format;
