//! Generic driver for HX8717-class dual-scan panels.
//!
//! One driver type serves every supported panel model; the differences
//! (geometry, capabilities, timings, init commands, master/slave split) live
//! in a [`PanelSpec`] chosen at construction time.

pub use display_interface::DisplayError;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use log::{debug, warn};

use crate::cmd::Cmd;
use crate::flag::Flag;
use crate::geometry::{clip_and_align, split, AlignedWindow, ChipSelect, HalfWindow};
use crate::image::{extract_row, BitmapRegion};
use crate::interface::{NoPin, SpiDisplayInterface};
use crate::MAX_WIDTH;

const MAX_LINE_BYTES: usize = (MAX_WIDTH as usize) / 8;

/// Steps that a panel-specific init sequence can contain.
/// Keep variants minimal and serializable as static arrays in panel modules.
#[derive(Clone, Copy, Debug)]
pub enum InitStep {
    /// Send the software reset command
    SWReset,
    /// Fixed delay in milliseconds
    DelayMs(u8),
    /// Wait until the busy line releases
    WaitUntilIdle,
    /// Send a bare command byte
    Cmd(u8),
    /// Send a command with a static data slice
    CmdData(u8, &'static [u8]),
}

/// Everything that distinguishes one panel model from another.
///
/// Descriptors are `'static` consts defined in the panel modules under
/// [`crate::displays`]; custom panels of the same controller family can be
/// described by building one by hand.
#[derive(Clone, Copy, Debug)]
pub struct PanelSpec {
    /// Panel model name, for logging
    pub name: &'static str,
    /// Addressable width in pixels, must be a multiple of 8
    pub width: u16,
    /// Visible width in pixels (<= `width`)
    pub width_visible: u16,
    /// Height in pixels
    pub height: u16,
    /// First column driven by the slave controller half, byte aligned.
    /// `None` for single-scan panels.
    pub split_col: Option<u16>,
    /// A second (chromatic) plane exists in controller RAM
    pub has_color: bool,
    /// The panel supports refreshing a sub-rectangle
    pub has_partial_update: bool,
    /// A faster, lower-quality waveform is available for partial refreshes
    pub has_fast_partial_update: bool,
    /// Busy-wait ceiling for power-up, milliseconds
    pub power_on_time_ms: u32,
    /// Busy-wait ceiling for power-down, milliseconds
    pub power_off_time_ms: u32,
    /// Busy-wait ceiling for a full refresh, milliseconds
    pub full_refresh_time_ms: u32,
    /// Busy-wait ceiling for a partial refresh, milliseconds
    pub partial_refresh_time_ms: u32,
    /// Controller configuration commands issued on (re-)initialization
    pub init_sequence: &'static [InitStep],
}

impl PanelSpec {
    /// Width in pixels of the given controller half
    fn half_width(&self, chip: ChipSelect) -> u16 {
        match (self.split_col, chip) {
            (Some(split), ChipSelect::Master) => split,
            (Some(split), ChipSelect::Slave) => self.width - split,
            (None, _) => self.width,
        }
    }
}

/// Panel power/refresh state as tracked by the driver.
///
/// `Initializing` and `Refreshing` are only observable while a call is in
/// flight; between calls the panel is either `PoweredOff` (driving voltages
/// disabled) or `Ready` (energized, refresh possible).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PowerState {
    /// Panel driving voltages are off
    #[default]
    PoweredOff,
    /// Controller configuration in progress
    Initializing,
    /// Energized and idle
    Ready,
    /// A refresh waveform is running
    Refreshing,
}

/// Mutable per-instance flags. Owned by the driver; no globals, so separate
/// instances stay independently testable.
#[derive(Clone, Copy, Debug, Default)]
pub struct DriverState {
    pub(crate) power: PowerState,
    pub(crate) hibernating: bool,
    pub(crate) needs_re_init: bool,
    pub(crate) paged: bool,
}

/// A configured panel with a hardware interface.
pub struct Hx8717<SPI, BSY, DC, RST, PWR> {
    interface: SpiDisplayInterface<SPI, BSY, DC, RST, PWR>,
    panel: &'static PanelSpec,
    state: DriverState,
}

impl<SPI, BSY, DC, RST> Hx8717<SPI, BSY, DC, RST, NoPin>
where
    SPI: SpiDevice,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Create a driver for `panel` from an SPI device and the busy/DC/reset
    /// lines, with the panel supply hard-wired on.
    pub fn new(panel: &'static PanelSpec, spi: SPI, busy: BSY, dc: DC, rst: RST) -> Self {
        Self::with_pins(panel, spi, busy, dc, Some(rst), None)
    }
}

impl<SPI, BSY, DC, RST, PWR> Hx8717<SPI, BSY, DC, RST, PWR>
where
    SPI: SpiDevice,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
{
    /// Create a driver with explicit optional reset and power-enable lines.
    ///
    /// Without a reset line [`hibernate`](Self::hibernate) degrades to a
    /// plain power-off, since deep sleep is only wakeable through reset.
    pub fn with_pins(
        panel: &'static PanelSpec,
        spi: SPI,
        busy: BSY,
        dc: DC,
        rst: Option<RST>,
        pwr: Option<PWR>,
    ) -> Self {
        debug_assert!(panel.width % 8 == 0);
        debug_assert!(panel.width_visible <= panel.width);
        debug_assert!(panel.width <= MAX_WIDTH);
        if let Some(split) = panel.split_col {
            debug_assert!(split % 8 == 0 && split > 0 && split < panel.width);
        }
        debug!("creating Hx8717 driver for {}", panel.name);
        Self {
            interface: SpiDisplayInterface::new(spi, busy, dc, rst, pwr),
            panel,
            state: DriverState {
                needs_re_init: true,
                ..DriverState::default()
            },
        }
    }

    /// The panel descriptor this driver was built for
    pub fn panel(&self) -> &'static PanelSpec {
        self.panel
    }

    /// Current power/refresh state
    pub fn power_state(&self) -> PowerState {
        self.state.power
    }

    /// Whether the next operation will run the full init sequence
    pub fn needs_re_init(&self) -> bool {
        self.state.needs_re_init
    }

    /// Whether the controller is in deep sleep (wakeable only via reset)
    pub fn is_hibernating(&self) -> bool {
        self.state.hibernating
    }

    /// Whether the buffered write strategy is active
    pub fn is_paged(&self) -> bool {
        self.state.paged
    }

    /// Switch to the buffered write strategy: RAM windows are programmed
    /// once per write and rows stream through a single bulk data transfer.
    /// For panel variants whose controller cannot take scattered per-row
    /// writes. No immediate I/O.
    pub fn set_paged(&mut self) {
        self.state.paged = true;
    }

    // ------------------------------------------------------------------
    // uniform fills
    // ------------------------------------------------------------------

    /// Fill controller memory with a uniform value (0xFF = white). The
    /// chromatic plane, when present, is cleared. No refresh is issued.
    pub fn clear_screen(&mut self, value: u8, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        self.write_screen_buffer(value, delay)
    }

    /// Fill both planes of controller memory with uniform values. No refresh.
    pub fn clear_screen_planes(
        &mut self,
        black_value: u8,
        color_value: u8,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_screen_buffer_planes(black_value, color_value, delay)
    }

    /// Initialize controller memory to a uniform value (0xFF = white)
    pub fn write_screen_buffer(
        &mut self,
        value: u8,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_screen_buffer_planes(value, 0x00, delay)
    }

    /// Initialize both planes of controller memory to uniform values
    pub fn write_screen_buffer_planes(
        &mut self,
        black_value: u8,
        color_value: u8,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.ensure_controller(delay)?;
        debug!(
            "write_screen_buffer: black {:#04x} color {:#04x}",
            black_value, color_value
        );
        for chip in self.chips().into_iter().flatten() {
            self.fill_half(chip, Cmd::WRITE_BW_DATA, black_value)?;
            if self.panel.has_color {
                self.fill_half(chip, Cmd::WRITE_COLOR_DATA, color_value)?;
            }
        }
        Ok(())
    }

    fn fill_half(&mut self, chip: ChipSelect, write_cmd: u8, value: u8) -> Result<(), DisplayError> {
        let sel = chip.cmd_offset();
        let hw = self.panel.half_width(chip);
        self.set_ram_area(sel, 0, 0, hw, self.panel.height)?;
        self.set_ram_counter(sel, 0, 0)?;
        self.interface.cmd(write_cmd | sel)?;
        let bytes = u32::from(hw / 8) * u32::from(self.panel.height);
        self.interface.data_x_times(value, bytes)
    }

    // ------------------------------------------------------------------
    // image writes (controller memory only, no refresh)
    // ------------------------------------------------------------------

    /// Write a single bitmap to the black plane; x and w should be
    /// multiples of 8 (widened to byte columns otherwise)
    #[allow(clippy::too_many_arguments)]
    pub fn write_image(
        &mut self,
        bitmap: &[u8],
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_image_planes(Some(bitmap), None, x, y, w, h, invert, mirror_y, delay)
    }

    /// Write a sub-rectangle of a larger bitmap to the black plane
    #[allow(clippy::too_many_arguments)]
    pub fn write_image_part(
        &mut self,
        bitmap: &[u8],
        x_part: u16,
        y_part: u16,
        w_bitmap: u16,
        h_bitmap: u16,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_planes(
            Some(bitmap),
            None,
            x_part,
            y_part,
            w_bitmap,
            h_bitmap,
            x,
            y,
            w,
            h,
            invert,
            mirror_y,
            false,
            delay,
        )
    }

    /// Write independent black and chromatic bitmaps in lock-step. `None`
    /// leaves that plane's memory untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn write_image_planes(
        &mut self,
        black: Option<&[u8]>,
        color: Option<&[u8]>,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_planes(
            black, color, 0, 0, w, h, x, y, w, h, invert, mirror_y, false, delay,
        )
    }

    /// Write sub-rectangles of larger black and chromatic bitmaps
    #[allow(clippy::too_many_arguments)]
    pub fn write_image_planes_part(
        &mut self,
        black: Option<&[u8]>,
        color: Option<&[u8]>,
        x_part: u16,
        y_part: u16,
        w_bitmap: u16,
        h_bitmap: u16,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_planes(
            black, color, x_part, y_part, w_bitmap, h_bitmap, x, y, w, h, invert, mirror_y, false,
            delay,
        )
    }

    /// Write plane data already in controller bit order; no plane
    /// complementing is applied
    #[allow(clippy::too_many_arguments)]
    pub fn write_native(
        &mut self,
        plane1: Option<&[u8]>,
        plane2: Option<&[u8]>,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_planes(
            plane1, plane2, 0, 0, w, h, x, y, w, h, invert, mirror_y, true, delay,
        )
    }

    /// Write sub-rectangles of larger native plane data
    #[allow(clippy::too_many_arguments)]
    pub fn write_native_part(
        &mut self,
        plane1: Option<&[u8]>,
        plane2: Option<&[u8]>,
        x_part: u16,
        y_part: u16,
        w_bitmap: u16,
        h_bitmap: u16,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_planes(
            plane1,
            plane2,
            x_part,
            y_part,
            w_bitmap,
            h_bitmap,
            x,
            y,
            w,
            h,
            invert,
            mirror_y,
            true,
            delay,
        )
    }

    // ------------------------------------------------------------------
    // draw = write + refresh
    // ------------------------------------------------------------------

    /// Write a bitmap and refresh the written area
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image(
        &mut self,
        bitmap: &[u8],
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_image(bitmap, x, y, w, h, invert, mirror_y, delay)?;
        self.refresh_area(x, y, w, h, delay)
    }

    /// Write part of a bitmap and refresh the written area
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_part(
        &mut self,
        bitmap: &[u8],
        x_part: u16,
        y_part: u16,
        w_bitmap: u16,
        h_bitmap: u16,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_image_part(
            bitmap, x_part, y_part, w_bitmap, h_bitmap, x, y, w, h, invert, mirror_y, delay,
        )?;
        self.refresh_area(x, y, w, h, delay)
    }

    /// Write both planes and refresh the written area
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_planes(
        &mut self,
        black: Option<&[u8]>,
        color: Option<&[u8]>,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_image_planes(black, color, x, y, w, h, invert, mirror_y, delay)?;
        self.refresh_area(x, y, w, h, delay)
    }

    /// Write parts of both planes and refresh the written area
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_planes_part(
        &mut self,
        black: Option<&[u8]>,
        color: Option<&[u8]>,
        x_part: u16,
        y_part: u16,
        w_bitmap: u16,
        h_bitmap: u16,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_image_planes_part(
            black, color, x_part, y_part, w_bitmap, h_bitmap, x, y, w, h, invert, mirror_y, delay,
        )?;
        self.refresh_area(x, y, w, h, delay)
    }

    /// Write native plane data and refresh the written area
    #[allow(clippy::too_many_arguments)]
    pub fn draw_native(
        &mut self,
        plane1: Option<&[u8]>,
        plane2: Option<&[u8]>,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.write_native(plane1, plane2, x, y, w, h, invert, mirror_y, delay)?;
        self.refresh_area(x, y, w, h, delay)
    }

    // ------------------------------------------------------------------
    // refresh and power
    // ------------------------------------------------------------------

    /// Refresh the whole panel from controller memory. `partial_update_mode`
    /// selects the partial (or fast, when available) waveform and is ignored
    /// on panels without partial update support.
    pub fn refresh(
        &mut self,
        partial_update_mode: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        let partial = partial_update_mode && self.panel.has_partial_update;
        self.ensure_ready(delay)?;
        self.set_full_ram_area()?;
        self.trigger_refresh(partial, delay)
    }

    /// Refresh only the given rectangle. Behaves exactly like a full
    /// refresh on panels without partial update support.
    pub fn refresh_area(
        &mut self,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        if !self.panel.has_partial_update {
            return self.refresh(false, delay);
        }
        let Some(win) = clip_and_align(x, y, w, h, self.panel.width_visible, self.panel.height)
        else {
            return Ok(());
        };
        if win.x == 0 && win.y == 0 && win.w >= self.panel.width_visible && win.h == self.panel.height
        {
            return self.refresh(false, delay);
        }
        self.ensure_ready(delay)?;
        self.set_partial_ram_area(win)?;
        self.trigger_refresh(true, delay)?;
        // restore the full window so later writes start from a known state
        self.set_full_ram_area()
    }

    /// Turn off generation of the panel driving voltages. Leaving them
    /// enabled indefinitely ages the panel. Idempotent.
    pub fn power_off(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        if self.state.power == PowerState::PoweredOff {
            return Ok(());
        }
        debug!("{}: power off", self.panel.name);
        self.interface
            .cmd_with_data(Cmd::DISPLAY_UPDATE_CTRL2, &[Flag::UPDATE_POWER_OFF])?;
        self.interface.cmd(Cmd::MASTER_ACTIVATE)?;
        self.interface
            .wait_until_idle(delay, self.panel.power_off_time_ms);
        self.state.power = PowerState::PoweredOff;
        Ok(())
    }

    /// Power off and put the controller into deep sleep for minimum power
    /// use. Only effective with a reset line, the sole wake path; the next
    /// operation then runs the full init sequence.
    pub fn hibernate(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        self.power_off(delay)?;
        if !self.interface.has_reset() {
            warn!(
                "{}: no reset line, deep sleep not wakeable; staying powered off",
                self.panel.name
            );
            return Ok(());
        }
        debug!("{}: hibernate", self.panel.name);
        self.interface
            .cmd_with_data(Cmd::DEEP_SLEEP, &[Flag::DEEP_SLEEP_MODE_1])?;
        self.interface.power_enable(false)?;
        self.state.hibernating = true;
        self.state.needs_re_init = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    fn chips(&self) -> [Option<ChipSelect>; 2] {
        [
            Some(ChipSelect::Master),
            self.panel.split_col.map(|_| ChipSelect::Slave),
        ]
    }

    /// Make sure the controller accepts RAM writes: run the full init
    /// sequence when required (first use, or after hibernate).
    fn ensure_controller(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        if self.state.needs_re_init {
            self.init_display(delay)?;
        }
        Ok(())
    }

    /// Make sure a refresh can be triggered: initialized and energized.
    fn ensure_ready(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        if self.state.needs_re_init {
            self.init_display(delay)?;
        } else {
            self.re_init_display()?;
        }
        self.power_on(delay)
    }

    /// Full controller configuration: hard reset, the descriptor's init
    /// sequence, then RAM window selection.
    fn init_display(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        debug!("{}: init", self.panel.name);
        self.state.power = PowerState::Initializing;
        self.interface.power_enable(true)?;
        self.interface.hard_reset(delay)?;
        self.interface
            .wait_until_idle(delay, self.panel.power_on_time_ms);
        for step in self.panel.init_sequence {
            debug!("init step: {:?}", step);
            match *step {
                InitStep::SWReset => {
                    self.interface.cmd(Cmd::SW_RESET)?;
                }
                InitStep::DelayMs(ms) => {
                    delay.delay_ms(u32::from(ms));
                }
                InitStep::WaitUntilIdle => {
                    self.interface
                        .wait_until_idle(delay, self.panel.power_on_time_ms);
                }
                InitStep::Cmd(c) => {
                    self.interface.cmd(c)?;
                }
                InitStep::CmdData(c, d) => {
                    self.interface.cmd_with_data(c, d)?;
                }
            }
        }
        self.re_init_display()?;
        self.state.needs_re_init = false;
        self.state.hibernating = false;
        self.state.power = PowerState::PoweredOff;
        Ok(())
    }

    /// Cheap re-initialization: data entry mode and the full RAM window.
    /// Enough when the controller configuration itself is still valid.
    fn re_init_display(&mut self) -> Result<(), DisplayError> {
        for chip in self.chips().into_iter().flatten() {
            let sel = chip.cmd_offset();
            self.interface
                .cmd_with_data(Cmd::DATA_ENTRY_MODE | sel, &[Flag::DATA_ENTRY_INCRY_INCRX])?;
        }
        self.set_full_ram_area()
    }

    fn power_on(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        if matches!(self.state.power, PowerState::Ready | PowerState::Refreshing) {
            return Ok(());
        }
        debug!("{}: power on", self.panel.name);
        self.interface
            .cmd_with_data(Cmd::DISPLAY_UPDATE_CTRL2, &[Flag::UPDATE_POWER_ON])?;
        self.interface.cmd(Cmd::MASTER_ACTIVATE)?;
        self.interface
            .wait_until_idle(delay, self.panel.power_on_time_ms);
        self.state.power = PowerState::Ready;
        Ok(())
    }

    /// Issue the refresh trigger and block until the controller reports
    /// done or the advisory ceiling elapses.
    fn trigger_refresh(
        &mut self,
        partial: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        let (mode, ceiling) = if partial {
            let mode = if self.panel.has_fast_partial_update {
                Flag::UPDATE_FAST
            } else {
                Flag::UPDATE_PARTIAL
            };
            (mode, self.panel.partial_refresh_time_ms)
        } else {
            (Flag::UPDATE_FULL, self.panel.full_refresh_time_ms)
        };
        debug!("{}: refresh, mode {:#04x}", self.panel.name, mode);
        self.state.power = PowerState::Refreshing;
        self.interface
            .cmd_with_data(Cmd::DISPLAY_UPDATE_CTRL2, &[mode])?;
        self.interface.cmd(Cmd::MASTER_ACTIVATE)?;
        self.interface.wait_until_idle(delay, ceiling);
        self.state.power = PowerState::Ready;
        Ok(())
    }

    /// Select the full RAM window on every controller half.
    fn set_full_ram_area(&mut self) -> Result<(), DisplayError> {
        for chip in self.chips().into_iter().flatten() {
            let sel = chip.cmd_offset();
            let hw = self.panel.half_width(chip);
            self.set_ram_area(sel, 0, 0, hw, self.panel.height)?;
            self.set_ram_counter(sel, 0, 0)?;
        }
        Ok(())
    }

    /// Select a partial RAM window: the involved half(s) get the window,
    /// an uninvolved half is parked on a minimal window at its origin so
    /// the refresh barely touches it.
    fn set_partial_ram_area(&mut self, win: AlignedWindow) -> Result<(), DisplayError> {
        let halves = split(win, self.panel.split_col);
        for chip in self.chips().into_iter().flatten() {
            let half = halves
                .iter()
                .flatten()
                .find(|half_win| half_win.chip == chip);
            let sel = chip.cmd_offset();
            match half {
                Some(hw) => {
                    self.set_ram_area(sel, hw.x, hw.y, hw.w, hw.h)?;
                    self.set_ram_counter(sel, hw.x, hw.y)?;
                }
                None => {
                    self.set_ram_area(sel, 0, 0, 8, 1)?;
                    self.set_ram_counter(sel, 0, 0)?;
                }
            }
        }
        Ok(())
    }

    fn set_ram_area(
        &mut self,
        sel: u8,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
    ) -> Result<(), DisplayError> {
        let end_x = x + w - 1;
        let end_y = y + h - 1;
        // x is positioned in bytes; the low 3 bits are not relevant
        self.interface.cmd_with_data(
            Cmd::SET_RAMXPOS | sel,
            &[(x >> 3) as u8, (end_x >> 3) as u8],
        )?;
        self.interface.cmd_with_data(
            Cmd::SET_RAMYPOS | sel,
            &[
                (y & 0xFF) as u8,
                ((y >> 8) & 0x01) as u8,
                (end_y & 0xFF) as u8,
                ((end_y >> 8) & 0x01) as u8,
            ],
        )?;
        Ok(())
    }

    fn set_ram_counter(&mut self, sel: u8, x: u16, y: u16) -> Result<(), DisplayError> {
        self.interface
            .cmd_with_data(Cmd::SET_RAMX_COUNTER | sel, &[(x >> 3) as u8])?;
        self.interface.cmd_with_data(
            Cmd::SET_RAMY_COUNTER | sel,
            &[(y & 0xFF) as u8, ((y >> 8) & 0x01) as u8],
        )?;
        Ok(())
    }

    /// Common path for every image/native write: clip and align the
    /// destination, split it across controller halves, then composite and
    /// stream each plane.
    #[allow(clippy::too_many_arguments)]
    fn write_planes(
        &mut self,
        black: Option<&[u8]>,
        color: Option<&[u8]>,
        x_part: u16,
        y_part: u16,
        w_bitmap: u16,
        h_bitmap: u16,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        native: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.ensure_controller(delay)?;
        let Some(win) = clip_and_align(x, y, w, h, self.panel.width_visible, self.panel.height)
        else {
            return Ok(());
        };
        let halves = split(win, self.panel.split_col);

        let planes = [
            (black, Cmd::WRITE_BW_DATA, false),
            // image color bitmaps use cleared-bit-is-inked convention; the
            // controller wants set-bit-is-inked, so complement unless native
            (color, Cmd::WRITE_COLOR_DATA, !native),
        ];
        for (data, write_cmd, complement) in planes {
            let Some(data) = data else {
                continue;
            };
            if write_cmd == Cmd::WRITE_COLOR_DATA && !self.panel.has_color {
                continue;
            }
            let region = BitmapRegion::new(data, w_bitmap, h_bitmap);
            for hw in halves.iter().flatten() {
                self.write_plane_window(
                    &region,
                    hw,
                    x_part,
                    y_part,
                    x,
                    y,
                    h,
                    invert ^ complement,
                    mirror_y,
                    write_cmd,
                )?;
            }
        }
        Ok(())
    }

    /// Stream one plane's rows into one controller half.
    #[allow(clippy::too_many_arguments)]
    fn write_plane_window(
        &mut self,
        region: &BitmapRegion<'_>,
        hw: &HalfWindow,
        x_part: u16,
        y_part: u16,
        x: i16,
        y: i16,
        h: u16,
        invert: bool,
        mirror_y: bool,
        write_cmd: u8,
    ) -> Result<(), DisplayError> {
        let wb = usize::from(hw.w / 8);
        let mut line = [0u8; MAX_LINE_BYTES];
        let line = &mut line[..wb];
        let sel = hw.chip.cmd_offset();
        // source column where this half's stripe begins
        let x_src = i32::from(x_part) + i32::from(hw.panel_x) - i32::from(x);

        if self.state.paged {
            // one RAM window, one bulk write
            self.set_ram_area(sel, hw.x, hw.y, hw.w, hw.h)?;
            self.set_ram_counter(sel, hw.x, hw.y)?;
            self.interface.cmd(write_cmd | sel)?;
            for row in 0..hw.h {
                compose_line(region, hw, row, x_src, y_part, y, h, invert, mirror_y, line);
                self.interface.data(line)?;
            }
        } else {
            // row-at-a-time addressed writes
            for row in 0..hw.h {
                let y_row = hw.y + row;
                self.set_ram_area(sel, hw.x, y_row, hw.w, 1)?;
                self.set_ram_counter(sel, hw.x, y_row)?;
                self.interface.cmd(write_cmd | sel)?;
                compose_line(region, hw, row, x_src, y_part, y, h, invert, mirror_y, line);
                self.interface.data(line)?;
            }
        }
        Ok(())
    }
}

/// Composite one destination row of one half-window from the source bitmap.
#[allow(clippy::too_many_arguments)]
fn compose_line(
    region: &BitmapRegion<'_>,
    hw: &HalfWindow,
    row: u16,
    x_src: i32,
    y_part: u16,
    y: i16,
    h: u16,
    invert: bool,
    mirror_y: bool,
    line: &mut [u8],
) {
    // row index within the requested destination rectangle
    let row_rel = i32::from(hw.y + row) - i32::from(y);
    let y_src = if mirror_y {
        i32::from(y_part) + i32::from(h) - 1 - row_rel
    } else {
        i32::from(y_part) + row_rel
    };
    extract_row(region, x_src, y_src, invert, line);
}
