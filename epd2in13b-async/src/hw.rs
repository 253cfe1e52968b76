use core::fmt::Debug;

use embedded_hal::{
    digital::{ErrorType as PinErrorType, InputPin, OutputPin, PinState},
    spi::ErrorType as SpiErrorType,
};
use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};

use crate::log::trace;

/// How long each step of the reset pulse is held.
pub const RESET_SETTLE_MS: u32 = 200;

/// Provides access to a shared error type.
///
/// Drivers rely on this trait to provide a single Error type that supports [From] conversions
/// from all the hardware-specific error types.
pub trait ErrorHw {
    type Error;
}

/// Provides access to the SPI device connected to the EPD.
pub trait SpiHw {
    type Spi: SpiDevice;

    fn spi(&mut self) -> &mut Self::Spi;
}

/// Provides access to the Data/Command pin for EPD control.
pub trait DcHw {
    type Dc: OutputPin;

    fn dc(&mut self) -> &mut Self::Dc;
}

/// Provides access to the Reset pin for EPD control.
pub trait ResetHw {
    type Reset: OutputPin;

    fn reset(&mut self) -> &mut Self::Reset;
}

/// Provides access to the Busy pin for EPD status monitoring.
pub trait BusyHw {
    type Busy: InputPin;

    fn busy(&mut self) -> &mut Self::Busy;

    /// Indicates which state of the busy pin indicates that it's busy.
    ///
    /// This is user-configurable, rather than enforced by the display driver, to allow the user to
    /// use more unexpected wiring configurations.
    fn busy_when(&self) -> PinState;
}

/// Provides access to delay functionality for EPD timing control.
pub trait DelayHw {
    type Delay: DelayNs;

    fn delay(&mut self) -> &mut Self::Delay;
}

/// The raw byte and pin operations the display driver is built on.
///
/// This has no knowledge of the controller's protocol. It is implemented automatically for any
/// type providing [SpiHw], [DcHw], [ResetHw], [BusyHw], [DelayHw] and [ErrorHw], but can also be
/// implemented directly, e.g. to record traffic in tests.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Error: Debug;

    /// Selects command mode and writes `command`. If `data` is non-empty, then selects data mode
    /// and writes `data`.
    async fn send(&mut self, command: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Pulses the reset line high, low, high, waiting [RESET_SETTLE_MS] after each step.
    async fn reset(&mut self) -> Result<(), Self::Error>;

    /// Non-blocking read of the busy line. `true` means the controller can accept the next
    /// command sequence.
    fn is_idle(&mut self) -> Result<bool, Self::Error>;
}

impl<HW> Transport for HW
where
    HW: SpiHw + DcHw + ResetHw + BusyHw + DelayHw + ErrorHw,
    <HW as ErrorHw>::Error: Debug
        + From<<HW::Spi as SpiErrorType>::Error>
        + From<<HW::Dc as PinErrorType>::Error>
        + From<<HW::Reset as PinErrorType>::Error>
        + From<<HW::Busy as PinErrorType>::Error>,
{
    type Error = <HW as ErrorHw>::Error;

    async fn send(&mut self, command: u8, data: &[u8]) -> Result<(), <HW as ErrorHw>::Error> {
        trace!("Sending EPD command: {:?}", command);

        self.dc().set_low()?;
        self.spi().write(&[command]).await?;

        if !data.is_empty() {
            self.dc().set_high()?;
            self.spi().write(data).await?;
        }

        Ok(())
    }

    async fn reset(&mut self) -> Result<(), <HW as ErrorHw>::Error> {
        trace!("Pulsing EPD reset line");
        ResetHw::reset(self).set_high()?;
        self.delay().delay_ms(RESET_SETTLE_MS).await;
        ResetHw::reset(self).set_low()?;
        self.delay().delay_ms(RESET_SETTLE_MS).await;
        ResetHw::reset(self).set_high()?;
        self.delay().delay_ms(RESET_SETTLE_MS).await;
        Ok(())
    }

    fn is_idle(&mut self) -> Result<bool, <HW as ErrorHw>::Error> {
        let busy_when = self.busy_when();
        let busy = self.busy();
        let is_busy = match busy_when {
            PinState::High => busy.is_high()?,
            PinState::Low => busy.is_low()?,
        };
        Ok(!is_busy)
    }
}
