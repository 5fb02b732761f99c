//! Good Display GDEY0579T93: the monochrome sibling of the 5.79" dual-scan
//! panel. Same geometry and split, no chromatic plane, and a fast partial
//! waveform instead of the 21 s chromatic one.

use crate::cmd::Cmd;
use crate::driver::{InitStep, PanelSpec};
use crate::flag::Flag;

#[cfg(feature = "graphics")]
use super::{buffer_len, Display, DisplayRotation};
#[cfg(feature = "graphics")]
use crate::color::Color;
#[cfg(feature = "graphics")]
use display_interface::DisplayError;
#[cfg(feature = "graphics")]
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

/// Display width for the 5.79in panel
pub const WIDTH: u16 = 792;
/// Display height for the 5.79in panel
pub const HEIGHT: u16 = 272;
/// First column driven by the slave controller half
pub const SPLIT_COL: u16 = 400;

/// Initialization sequence for the 5.79in mono panel
pub const INIT_SEQUENCE: &[InitStep] = &[
    InitStep::SWReset,
    InitStep::WaitUntilIdle,
    InitStep::CmdData(Cmd::BORDER_WAVEFORM_CTRL, &[0x05]),
    InitStep::CmdData(Cmd::TEMP_CONTROL, &[Flag::INTERNAL_TEMP_SENSOR]),
    InitStep::CmdData(Cmd::DISPLAY_UPDATE_CTRL1, &[0x00, 0x80]),
];

/// Panel descriptor for the GDEY0579T93
pub const GDEY0579T93: PanelSpec = PanelSpec {
    name: "GDEY0579T93",
    width: WIDTH,
    width_visible: WIDTH,
    height: HEIGHT,
    split_col: Some(SPLIT_COL),
    has_color: false,
    has_partial_update: true,
    has_fast_partial_update: true,
    power_on_time_ms: 100,
    power_off_time_ms: 100,
    full_refresh_time_ms: 4_500,
    partial_refresh_time_ms: 1_500,
    init_sequence: INIT_SEQUENCE,
};

/// Graphics buffer for the 5.79" mono panel
#[cfg(feature = "graphics")]
pub struct Display5in79 {
    buffer: [u8; buffer_len(WIDTH as usize, HEIGHT as usize)],
    rotation: DisplayRotation,
    is_inverted: bool,
}

#[cfg(feature = "graphics")]
impl Default for Display5in79 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "graphics")]
impl Display5in79 {
    /// Create a graphics buffer cleared to white
    pub fn new() -> Self {
        Self {
            buffer: [Color::White.get_byte_value(); buffer_len(WIDTH as usize, HEIGHT as usize)],
            rotation: DisplayRotation::Rotate0,
            is_inverted: false,
        }
    }
}

#[cfg(feature = "graphics")]
impl DrawTarget for Display5in79 {
    type Color = BinaryColor;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for p in pixels.into_iter() {
            self.draw_helper(WIDTH.into(), HEIGHT.into(), p)?;
        }
        Ok(())
    }
}

#[cfg(feature = "graphics")]
impl OriginDimensions for Display5in79 {
    fn size(&self) -> Size {
        // if display is rotated 90 deg or 270 then swap height and width
        match self.rotation() {
            DisplayRotation::Rotate0 | DisplayRotation::Rotate180 => {
                Size::new(WIDTH.into(), HEIGHT.into())
            }
            DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => {
                Size::new(HEIGHT.into(), WIDTH.into())
            }
        }
    }
}

#[cfg(feature = "graphics")]
impl Display for Display5in79 {
    fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn get_mut_buffer(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    fn set_rotation(&mut self, rotation: DisplayRotation) {
        self.rotation = rotation;
    }

    fn rotation(&self) -> DisplayRotation {
        self.rotation
    }

    fn is_inverted(&self) -> bool {
        self.is_inverted
    }
}
