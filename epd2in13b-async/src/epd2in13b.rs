use core::{fmt, iter, time::Duration};

use bitflags::bitflags;
use embedded_graphics::prelude::Size;
use embedded_hal::{
    digital::PinState,
    spi::{Phase, Polarity},
};
use embedded_hal_async::delay::DelayNs;

use crate::{
    buffer::{binary_buffer_length, split_low_and_high},
    error::{Error, Operation, Plane},
    hw::Transport,
    log::{debug, trace, warn_log},
};

/// The width of the controller's RAM in pixels. The panel is portrait in RAM; renderers
/// usually draw landscape (see [crate::ram::Orientation]).
pub const DISPLAY_WIDTH: u16 = 104;
/// The height of the controller's RAM in pixels.
pub const DISPLAY_HEIGHT: u16 = 212;
/// Bytes per RAM row.
pub const ROW_BYTES: usize = (DISPLAY_WIDTH as usize).div_ceil(8);
/// The length of a full plane (black or red) in RAM format.
pub const FRAME_LENGTH: usize =
    binary_buffer_length(Size::new(DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32));

pub const RECOMMENDED_SPI_HZ: u32 = 1_000_000; // 1 MHz
/// Use this phase in conjunction with [RECOMMENDED_SPI_POLARITY] (SPI mode 0).
pub const RECOMMENDED_SPI_PHASE: Phase = Phase::CaptureOnFirstTransition;
/// Use this polarity in conjunction with [RECOMMENDED_SPI_PHASE] (SPI mode 0).
pub const RECOMMENDED_SPI_POLARITY: Polarity = Polarity::IdleLow;
/// The default pin state that indicates the display is busy.
pub const DEFAULT_BUSY_WHEN: PinState = PinState::High;
/// How often the busy line is polled while waiting for the display.
pub const DEFAULT_BUSY_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long to wait for the display to become idle after an activation.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(60);

/// Custom waveform timing, loaded with [Epd2In13b::load_lut]. The default refresh uses the
/// controller's built-in waveform instead.
pub const LUT: [u8; 70] = [
    0xAA, 0x99, 0x10, 0x00, 0x00, 0x00, 0x00, 0x55, 0x99, 0x80, 0x00, 0x00, 0x00, 0x00, 0x8A, 0xA8,
    0x9B, 0x00, 0x00, 0x00, 0x00, 0x8A, 0xA8, 0x9B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x0F, 0x0F, 0x0F, 0x0F, 0x02, 0x14, 0x14, 0x14, 0x14, 0x06, 0x14, 0x14, 0x0C,
    0x82, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Low-level commands for the Epd2In13b. You probably want to use the other methods exposed on
/// the [Epd2In13b] for most operations, but can send commands directly with [Epd2In13b::send]
/// for low-level control or experimentation.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Sets the number of gate lines and the scan order.
    DriverOutputControl = 0x01,
    /// Used to configure the on chip voltage booster and regulator.
    BoosterSoftStartControl = 0x0C,
    /// Sets the first gate line to scan.
    GateScanStartPosition = 0x0F,
    /// Used to enter deep sleep mode. Requires a hardware reset and reinitialisation to wake up.
    DeepSleepMode = 0x10,
    /// Changes the auto-increment behaviour of the address counter.
    DataEntryModeSetting = 0x11,
    /// Resets all commands and parameters to default values (except deep sleep mode).
    SwReset = 0x12,
    /// Selects the temperature sensor. Used by current controller revisions.
    TemperatureSensorSelection = 0x18,
    /// Writes to the temperature register. Used by older controller revisions.
    TemperatureSensorControl = 0x1A,
    /// Activates the display update sequence. This must be set beforehand using
    /// [Command::DisplayUpdateControl2]. This operation must not be interrupted.
    MasterActivation = 0x20,
    /// RAM content options. The second byte controls how red RAM is interpreted.
    DisplayUpdateControl1 = 0x21,
    /// Configures the display update sequence for use with [Command::MasterActivation].
    /// See [UpdateSequence].
    DisplayUpdateControl2 = 0x22,
    /// Writes data to the black/white RAM, auto-incrementing the address counter.
    WriteRam = 0x24,
    /// Writes data to the red RAM, auto-incrementing the address counter.
    WriteRamRed = 0x26,
    /// Writes to the VCOM register.
    WriteVcom = 0x2C,
    /// Writes the waveform LUT register.
    WriteLut = 0x32,
    /// ? Part of magic config.
    SetDummyLinePeriod = 0x3A,
    /// ? Part of magic config.
    SetGateTime = 0x3B,
    /// Register to configure the behaviour of the border.
    BorderWaveformControl = 0x3C,
    /// Sets the start and end positions of the X axis for the auto-incrementing address counter.
    ///
    /// The x position can only be written on a whole byte basis, so values are sent right
    /// shifted by 3.
    SetRamXStartEnd = 0x44,
    /// Sets the start and end positions of the Y axis for the auto-incrementing address counter.
    SetRamYStartEnd = 0x45,
    /// Sets the current x coordinate (in bytes) of the address counter.
    SetRamX = 0x4E,
    /// Sets the current y coordinate of the address counter.
    SetRamY = 0x4F,
}

impl Command {
    /// Returns the register address for this command.
    pub fn register(&self) -> u8 {
        *self as u8
    }
}

bitflags! {
    /// Steps run by [Command::MasterActivation], configured through
    /// [Command::DisplayUpdateControl2].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UpdateSequence: u8 {
        const ENABLE_CLOCK = 0b1000_0000;
        const ENABLE_ANALOG = 0b0100_0000;
        const LOAD_TEMPERATURE = 0b0010_0000;
        const LOAD_LUT = 0b0001_0000;
        const DISPLAY = 0b0000_0100;
        const DISABLE_ANALOG = 0b0000_0010;
        const DISABLE_CLOCK = 0b0000_0001;

        /// Reads the temperature and loads the matching waveform. Run once at init.
        const LOAD_WAVEFORM = Self::ENABLE_CLOCK.bits()
            | Self::LOAD_TEMPERATURE.bits()
            | Self::LOAD_LUT.bits()
            | Self::DISABLE_CLOCK.bits();
        /// Drives the panel from the RAM contents.
        const FULL_REFRESH = Self::ENABLE_CLOCK.bits()
            | Self::ENABLE_ANALOG.bits()
            | Self::DISPLAY.bits();
    }
}

/// Which of the two temperature sensor opcodes the controller understands.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureSensorCommand {
    /// [Command::TemperatureSensorSelection] (0x18).
    #[default]
    Selection,
    /// [Command::TemperatureSensorControl] (0x1A).
    Control,
}

impl TemperatureSensorCommand {
    pub fn command(&self) -> Command {
        match self {
            TemperatureSensorCommand::Selection => Command::TemperatureSensorSelection,
            TemperatureSensorCommand::Control => Command::TemperatureSensorControl,
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// The opcode used to select the internal temperature sensor during init.
    pub temperature_sensor: TemperatureSensorCommand,
    /// How often to poll the busy line.
    pub busy_poll_interval: Duration,
    /// How long to wait for the display to become idle before giving up.
    pub busy_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            temperature_sensor: TemperatureSensorCommand::default(),
            busy_poll_interval: DEFAULT_BUSY_POLL_INTERVAL,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// A rectangular region of controller RAM, in pixels. X values are truncated to whole bytes.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamWindow {
    pub x_start: u16,
    pub y_start: u16,
    pub x_end: u16,
    pub y_end: u16,
}

impl RamWindow {
    /// The window used for full frame writes.
    pub const fn full() -> Self {
        Self {
            x_start: 0,
            y_start: 0,
            x_end: DISPLAY_WIDTH,
            y_end: DISPLAY_HEIGHT,
        }
    }
}

const LAST_GATE: (u8, u8) = split_low_and_high(DISPLAY_HEIGHT - 1);
/// Gate lines (low, high), then GD = 0, SM = 0, TB = 0.
const DRIVER_OUTPUT_INIT_DATA: [u8; 3] = [LAST_GATE.0, LAST_GATE.1, 0x00];
/// Auto-increment X and Y, moving in the X direction first.
const DATA_ENTRY_INIT_DATA: [u8; 1] = [0b11];
const RAM_X_INIT_DATA: [u8; 2] = [0x00, ((DISPLAY_WIDTH - 1) >> 3) as u8];
const RAM_Y_INIT_DATA: [u8; 4] = [LAST_GATE.0, LAST_GATE.1, 0x00, 0x00];
/// Border follows VBD with high impedance.
const BORDER_WAVEFORM_INIT_DATA: [u8; 1] = [0x05];
/// Normal black RAM, inverted red RAM, so a 0 bit marks red like it marks black.
const DISPLAY_UPDATE_CONTROL_1_INIT_DATA: [u8; 2] = [0x80, 0x80];
/// Use the internal temperature sensor.
const TEMPERATURE_SENSOR_INIT_DATA: [u8; 1] = [0x80];
const DEEP_SLEEP_DATA: [u8; 1] = [0x01];

/// A row with no marks in either plane.
static NO_MARK_ROW: [u8; ROW_BYTES] = [0xFF; ROW_BYTES];

trait StateInternal {}
pub trait State: StateInternal {}
/// States from which the display can be (re)initialised.
pub trait StateDormant: State {}

macro_rules! impl_base_state {
    ($state:ident) => {
        impl StateInternal for $state {}
        impl State for $state {}
    };
}

/// The display has not been initialised in this session.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateUninitialized;
impl_base_state!(StateUninitialized);
impl StateDormant for StateUninitialized {}

/// The display is initialised and can be painted.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateReady;
impl_base_state!(StateReady);

/// The display is in deep sleep and must be re-initialised.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateAsleep;
impl_base_state!(StateAsleep);
impl StateDormant for StateAsleep {}

/// Controls the 2.13" black/white/red e-paper display (104x212).
///
/// The driver is a typestate machine: [Epd2In13b::init] moves it to [StateReady],
/// [Epd2In13b::sleep] to [StateAsleep], and [Epd2In13b::paint] to either (see [Painted]). A
/// failed transfer returns a [Failed] holding the error and the driver in
/// [StateUninitialized], ready for a fresh [Epd2In13b::init].
///
/// Time is spent in two places. The reset pulse is timed by the [Transport] itself. Busy polling
/// is paced by the `delay` given at construction, which is the only clock the driver reads, so a
/// virtual delay makes idle-waits deterministic. With the blanket hardware adapter this is usually
/// a second handle to the same delay provider.
pub struct Epd2In13b<T, D, S = StateUninitialized>
where
    T: Transport,
    D: DelayNs,
    S: State,
{
    transport: T,
    delay: D,
    config: Config,
    _state: S,
}

/// A failed state transition, holding the error and the driver in state `S`.
///
/// After a transport failure `S` is [StateUninitialized]: the controller's state is unknown and
/// the display must be initialised again.
pub struct Failed<T, D, S = StateUninitialized>
where
    T: Transport,
    D: DelayNs,
    S: State,
{
    error: Error<T::Error>,
    display: Epd2In13b<T, D, S>,
}

impl<T: Transport, D: DelayNs, S: State> Failed<T, D, S> {
    pub fn error(&self) -> &Error<T::Error> {
        &self.error
    }

    /// Recovers the driver.
    pub fn into_display(self) -> Epd2In13b<T, D, S> {
        self.display
    }

    pub fn into_parts(self) -> (Error<T::Error>, Epd2In13b<T, D, S>) {
        (self.error, self.display)
    }
}

impl<T: Transport, D: DelayNs, S: State> fmt::Debug for Failed<T, D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failed")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T: Transport, D: DelayNs, S: State> From<Failed<T, D, S>> for Error<T::Error> {
    fn from(failed: Failed<T, D, S>) -> Self {
        failed.error
    }
}

/// The driver after a successful [Epd2In13b::paint].
pub enum Painted<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// At least one plane was written and refreshed, and the display is in deep sleep.
    Asleep(Epd2In13b<T, D, StateAsleep>),
    /// Both planes were empty, so the display was cleared. It is still awake.
    Cleared(Epd2In13b<T, D, StateReady>),
}

/// A failed [Epd2In13b::paint].
pub enum PaintFailed<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// A plane had the wrong length. Nothing was sent and the display is still ready.
    Rejected(Failed<T, D, StateReady>),
    /// A transfer failed part way through.
    Aborted(Failed<T, D>),
}

impl<T: Transport, D: DelayNs> PaintFailed<T, D> {
    pub fn error(&self) -> &Error<T::Error> {
        match self {
            PaintFailed::Rejected(failed) => failed.error(),
            PaintFailed::Aborted(failed) => failed.error(),
        }
    }
}

impl<T: Transport, D: DelayNs> fmt::Debug for PaintFailed<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaintFailed::Rejected(failed) => f.debug_tuple("Rejected").field(failed).finish(),
            PaintFailed::Aborted(failed) => f.debug_tuple("Aborted").field(failed).finish(),
        }
    }
}

impl<T: Transport, D: DelayNs> From<PaintFailed<T, D>> for Error<T::Error> {
    fn from(failed: PaintFailed<T, D>) -> Self {
        match failed {
            PaintFailed::Rejected(failed) => failed.error,
            PaintFailed::Aborted(failed) => failed.error,
        }
    }
}

fn validate_plane<E>(plane: Plane, data: &[u8]) -> Result<(), Error<E>> {
    if data.is_empty() || data.len() == FRAME_LENGTH {
        Ok(())
    } else {
        Err(Error::InvalidSize {
            plane,
            expected: FRAME_LENGTH,
            actual: data.len(),
        })
    }
}

impl<T, D> Epd2In13b<T, D, StateUninitialized>
where
    T: Transport,
    D: DelayNs,
{
    pub fn new(transport: T, delay: D) -> Self {
        Self::with_config(transport, delay, Config::default())
    }

    pub fn with_config(transport: T, delay: D, config: Config) -> Self {
        Epd2In13b {
            transport,
            delay,
            config,
            _state: StateUninitialized,
        }
    }
}

impl<T, D, S> Epd2In13b<T, D, S>
where
    T: Transport,
    D: DelayNs,
    S: State,
{
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives back the transport and delay.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    fn into_state<N: State>(self, state: N) -> Epd2In13b<T, D, N> {
        Epd2In13b {
            transport: self.transport,
            delay: self.delay,
            config: self.config,
            _state: state,
        }
    }

    fn fail(self, error: Error<T::Error>) -> Failed<T, D> {
        Failed {
            error,
            display: self.into_state(StateUninitialized),
        }
    }

    async fn command(
        &mut self,
        op: Operation,
        command: Command,
        data: &[u8],
    ) -> Result<(), Error<T::Error>> {
        self.transport
            .send(command.register(), data)
            .await
            .map_err(|cause| Error::Transport {
                op,
                command: Some(command),
                cause,
            })
    }

    /// Polls the busy line until the display reports idle or the configured timeout elapses.
    ///
    /// Elapsed time is the sum of the poll delays, so no clock is needed.
    async fn wait_until_idle(&mut self, op: Operation) -> Result<(), Error<T::Error>> {
        let interval_us = u32::try_from(self.config.busy_poll_interval.as_micros())
            .unwrap_or(u32::MAX)
            .max(1);
        let interval = Duration::from_micros(u64::from(interval_us));
        let mut waited = Duration::ZERO;
        // The line is always read at least once, even with a zero timeout.
        loop {
            let idle = self
                .transport
                .is_idle()
                .map_err(|cause| Error::Transport {
                    op,
                    command: None,
                    cause,
                })?;
            if idle {
                return Ok(());
            }
            trace!("Waiting for busy EPD");
            self.delay.delay_us(interval_us).await;
            waited += interval;
            if waited >= self.config.busy_timeout {
                break;
            }
        }

        let waited_ms = u32::try_from(waited.as_millis()).unwrap_or(u32::MAX);
        warn_log!("{} timed out after {} ms waiting for busy EPD", op, waited_ms);
        Err(Error::Timeout { op, waited_ms })
    }

    async fn activate(
        &mut self,
        op: Operation,
        sequence: UpdateSequence,
    ) -> Result<(), Error<T::Error>> {
        self.command(op, Command::DisplayUpdateControl2, &[sequence.bits()])
            .await?;
        self.command(op, Command::MasterActivation, &[]).await?;
        self.wait_until_idle(op).await
    }

    async fn set_window_impl(
        &mut self,
        op: Operation,
        window: RamWindow,
    ) -> Result<(), Error<T::Error>> {
        let x_start_byte = ((window.x_start >> 3) & 0xFF) as u8;
        let x_end_byte = ((window.x_end >> 3) & 0xFF) as u8;
        self.command(op, Command::SetRamXStartEnd, &[x_start_byte, x_end_byte])
            .await?;

        let (y_start_low, y_start_high) = split_low_and_high(window.y_start);
        let (y_end_low, y_end_high) = split_low_and_high(window.y_end);
        self.command(
            op,
            Command::SetRamYStartEnd,
            &[y_start_low, y_start_high, y_end_low, y_end_high],
        )
        .await
    }

    async fn set_cursor_impl(
        &mut self,
        op: Operation,
        x: u16,
        y: u16,
    ) -> Result<(), Error<T::Error>> {
        self.command(op, Command::SetRamX, &[((x >> 3) & 0xFF) as u8])
            .await?;
        let (y_low, y_high) = split_low_and_high(y);
        self.command(op, Command::SetRamY, &[y_low, y_high]).await
    }

    /// Writes one plane row by row, moving the cursor to the start of each row first.
    async fn write_plane<'a>(
        &mut self,
        op: Operation,
        command: Command,
        rows: impl Iterator<Item = &'a [u8]>,
    ) -> Result<(), Error<T::Error>> {
        for (y, row) in rows.enumerate() {
            self.set_cursor_impl(op, 0, y as u16).await?;
            self.command(op, command, row).await?;
        }
        Ok(())
    }

    async fn clear_impl(&mut self) -> Result<(), Error<T::Error>> {
        let op = Operation::Clear;
        debug!("Clearing EPD");
        self.set_window_impl(op, RamWindow::full()).await?;
        for command in [Command::WriteRam, Command::WriteRamRed] {
            let rows = iter::repeat(&NO_MARK_ROW[..]).take(DISPLAY_HEIGHT as usize);
            self.write_plane(op, command, rows).await?;
        }
        self.activate(op, UpdateSequence::FULL_REFRESH).await
    }

    async fn paint_impl(&mut self, black: &[u8], red: &[u8]) -> Result<(), Error<T::Error>> {
        let op = Operation::Paint;
        debug!(
            "Painting EPD: {} black bytes, {} red bytes",
            black.len(),
            red.len()
        );
        self.set_window_impl(op, RamWindow::full()).await?;
        if !black.is_empty() {
            self.write_plane(op, Command::WriteRam, black.chunks(ROW_BYTES))
                .await?;
        }
        if !red.is_empty() {
            self.write_plane(op, Command::WriteRamRed, red.chunks(ROW_BYTES))
                .await?;
        }
        self.activate(op, UpdateSequence::FULL_REFRESH).await
    }
}

impl<T, D, S> Epd2In13b<T, D, S>
where
    T: Transport,
    D: DelayNs,
    S: StateDormant,
{
    /// Resets and initialises the display. Works from power-on and from deep sleep.
    pub async fn init(mut self) -> Result<Epd2In13b<T, D, StateReady>, Failed<T, D>> {
        match self.init_impl().await {
            Ok(()) => Ok(self.into_state(StateReady)),
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn init_impl(&mut self) -> Result<(), Error<T::Error>> {
        let op = Operation::Init;
        debug!("Initialising EPD");
        self.transport
            .reset()
            .await
            .map_err(|cause| Error::Transport {
                op,
                command: None,
                cause,
            })?;

        self.command(op, Command::DriverOutputControl, &DRIVER_OUTPUT_INIT_DATA)
            .await?;
        self.command(op, Command::DataEntryModeSetting, &DATA_ENTRY_INIT_DATA)
            .await?;
        self.command(op, Command::SetRamXStartEnd, &RAM_X_INIT_DATA)
            .await?;
        self.command(op, Command::SetRamYStartEnd, &RAM_Y_INIT_DATA)
            .await?;
        self.command(op, Command::BorderWaveformControl, &BORDER_WAVEFORM_INIT_DATA)
            .await?;
        self.command(
            op,
            Command::DisplayUpdateControl1,
            &DISPLAY_UPDATE_CONTROL_1_INIT_DATA,
        )
        .await?;
        let temperature_sensor = self.config.temperature_sensor.command();
        self.command(op, temperature_sensor, &TEMPERATURE_SENSOR_INIT_DATA)
            .await?;
        self.activate(op, UpdateSequence::LOAD_WAVEFORM).await
    }
}

impl<T, D> Epd2In13b<T, D, StateReady>
where
    T: Transport,
    D: DelayNs,
{
    /// Writes both planes and refreshes the display, then puts it to sleep.
    ///
    /// Each plane is either empty, to leave that RAM untouched, or exactly [FRAME_LENGTH] bytes
    /// in RAM format (see [crate::ram::to_ram_format]). Sizes are checked before anything is
    /// sent, and a rejected plane gives back the driver still in [StateReady].
    ///
    /// If both planes are empty the display is cleared instead, exactly as [Epd2In13b::clear]
    /// does, and stays awake ([Painted::Cleared]). Otherwise it ends in deep sleep
    /// ([Painted::Asleep]) and must be initialised again before the next paint.
    pub async fn paint(
        mut self,
        black: &[u8],
        red: &[u8],
    ) -> Result<Painted<T, D>, PaintFailed<T, D>> {
        if let Err(error) = validate_plane(Plane::Black, black)
            .and_then(|()| validate_plane(Plane::Red, red))
        {
            return Err(PaintFailed::Rejected(Failed {
                error,
                display: self,
            }));
        }

        if black.is_empty() && red.is_empty() {
            return match self.clear_impl().await {
                Ok(()) => Ok(Painted::Cleared(self)),
                Err(e) => Err(PaintFailed::Aborted(self.fail(e))),
            };
        }

        match self.paint_impl(black, red).await {
            Ok(()) => self
                .sleep()
                .await
                .map(Painted::Asleep)
                .map_err(PaintFailed::Aborted),
            Err(e) => Err(PaintFailed::Aborted(self.fail(e))),
        }
    }

    /// Fills both planes with "no mark" and refreshes the display.
    pub async fn clear(&mut self) -> Result<(), Error<T::Error>> {
        self.clear_impl().await
    }

    /// Puts the display into deep sleep. It must be initialised again to wake it.
    pub async fn sleep(mut self) -> Result<Epd2In13b<T, D, StateAsleep>, Failed<T, D>> {
        debug!("Sleeping EPD");
        match self
            .command(Operation::Sleep, Command::DeepSleepMode, &DEEP_SLEEP_DATA)
            .await
        {
            Ok(()) => Ok(self.into_state(StateAsleep)),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Loads the custom waveform [LUT].
    pub async fn load_lut(&mut self) -> Result<(), Error<T::Error>> {
        debug!("Loading EPD waveform LUT");
        self.command(Operation::LoadLut, Command::WriteLut, &LUT).await
    }

    /// Sets the RAM window that subsequent writes are confined to.
    pub async fn set_window(&mut self, window: RamWindow) -> Result<(), Error<T::Error>> {
        self.set_window_impl(Operation::Window, window).await
    }

    /// Moves the RAM cursor. `x` is in pixels and truncated to a whole byte.
    pub async fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), Error<T::Error>> {
        debug_assert_eq!(x % 8, 0, "x must be 8-bit aligned");
        self.set_cursor_impl(Operation::Cursor, x, y).await
    }

    /// Send the following command and data to the display.
    pub async fn send(&mut self, command: Command, data: &[u8]) -> Result<(), Error<T::Error>> {
        self.command(Operation::Send, command, data).await
    }
}
