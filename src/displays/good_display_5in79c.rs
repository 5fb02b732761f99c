//! Good Display GDEY0579F51: 5.79" 792x272, black/white plus a chromatic
//! plane, driven by the controller's master/slave halves split at column 400.

use crate::cmd::Cmd;
use crate::driver::{InitStep, PanelSpec};
use crate::flag::Flag;

#[cfg(feature = "graphics")]
use super::{buffer_len, outside_display, DisplayRotation};
#[cfg(feature = "graphics")]
use crate::color::TriColor;
#[cfg(feature = "graphics")]
use display_interface::DisplayError;
#[cfg(feature = "graphics")]
use embedded_graphics::prelude::*;

/// Display width for the 5.79in panel
pub const WIDTH: u16 = 792;
/// Display height for the 5.79in panel
pub const HEIGHT: u16 = 272;
/// First column driven by the slave controller half
pub const SPLIT_COL: u16 = 400;

/// Initialization sequence for the 5.79in chromatic panel
pub const INIT_SEQUENCE: &[InitStep] = &[
    InitStep::SWReset,
    InitStep::WaitUntilIdle,
    InitStep::CmdData(Cmd::BOOSTER_SOFT_START, &[0x8B, 0x9C, 0xA6, 0x0F]),
    InitStep::CmdData(
        Cmd::BORDER_WAVEFORM_CTRL,
        &[Flag::BORDER_WAVEFORM_FOLLOW_LUT | Flag::BORDER_WAVEFORM_LUT1],
    ),
    InitStep::CmdData(Cmd::TEMP_CONTROL, &[Flag::INTERNAL_TEMP_SENSOR]),
    InitStep::CmdData(Cmd::DISPLAY_UPDATE_CTRL1, &[0x00, 0x80]),
];

/// Panel descriptor for the GDEY0579F51.
///
/// Both refresh ceilings sit at 21 s: the chromatic waveform takes that long
/// even for a partial area, there is no fast variant.
pub const GDEY0579F51: PanelSpec = PanelSpec {
    name: "GDEY0579F51",
    width: WIDTH,
    width_visible: WIDTH,
    height: HEIGHT,
    split_col: Some(SPLIT_COL),
    has_color: true,
    has_partial_update: true,
    has_fast_partial_update: false,
    power_on_time_ms: 100,
    power_off_time_ms: 100,
    full_refresh_time_ms: 21_000,
    partial_refresh_time_ms: 21_000,
    init_sequence: INIT_SEQUENCE,
};

/// Dual-plane framebuffer for the 5.79" chromatic panel.
///
/// Holds an image-convention bitmap per plane, sized for the full panel, to
/// be handed to
/// [`write_image_planes`](crate::driver::Hx8717::write_image_planes). In the
/// black buffer a set bit is white; in the chromatic buffer a cleared bit is
/// inked (the driver complements it into controller polarity).
#[cfg(feature = "graphics")]
pub struct Display5in79c {
    bw_buffer: [u8; buffer_len(WIDTH as usize, HEIGHT as usize)],
    chromatic_buffer: [u8; buffer_len(WIDTH as usize, HEIGHT as usize)],
    rotation: DisplayRotation,
}

#[cfg(feature = "graphics")]
impl Default for Display5in79c {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "graphics")]
impl Display5in79c {
    /// Create a framebuffer cleared to white
    pub fn new() -> Self {
        Self {
            bw_buffer: [0xFF; buffer_len(WIDTH as usize, HEIGHT as usize)],
            chromatic_buffer: [0xFF; buffer_len(WIDTH as usize, HEIGHT as usize)],
            rotation: DisplayRotation::Rotate0,
        }
    }

    /// The black-plane bitmap
    pub fn bw_buffer(&self) -> &[u8] {
        &self.bw_buffer
    }

    /// The chromatic-plane bitmap
    pub fn chromatic_buffer(&self) -> &[u8] {
        &self.chromatic_buffer
    }

    /// Set the rotation used for coordinate transforms
    pub fn set_rotation(&mut self, rotation: DisplayRotation) {
        self.rotation = rotation;
    }

    /// Get the current rotation
    pub fn rotation(&self) -> DisplayRotation {
        self.rotation
    }

    /// Clear both planes to the given color
    pub fn clear_buffer(&mut self, color: TriColor) {
        let bw = if color.bw_bit() { 0xFF } else { 0x00 };
        let chromatic = if color.chromatic_bit() { 0x00 } else { 0xFF };
        self.bw_buffer.fill(bw);
        self.chromatic_buffer.fill(chromatic);
    }

    /// Set a single pixel
    pub fn set_pixel(&mut self, x: i32, y: i32, color: TriColor) {
        if outside_display(
            Point::new(x, y),
            WIDTH.into(),
            HEIGHT.into(),
            self.rotation,
        ) {
            return;
        }
        let (idx, bit) = super::find_position(
            x as u32,
            y as u32,
            WIDTH.into(),
            HEIGHT.into(),
            self.rotation,
        );
        let idx = idx as usize;

        if color.bw_bit() {
            self.bw_buffer[idx] |= bit;
        } else {
            self.bw_buffer[idx] &= !bit;
        }
        // image convention: cleared chromatic bit = inked
        if color.chromatic_bit() {
            self.chromatic_buffer[idx] &= !bit;
        } else {
            self.chromatic_buffer[idx] |= bit;
        }
    }
}

#[cfg(feature = "graphics")]
impl DrawTarget for Display5in79c {
    type Color = TriColor;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }
}

#[cfg(feature = "graphics")]
impl OriginDimensions for Display5in79c {
    fn size(&self) -> Size {
        // if display is rotated 90 deg or 270 then swap height and width
        match self.rotation {
            DisplayRotation::Rotate0 | DisplayRotation::Rotate180 => {
                Size::new(WIDTH.into(), HEIGHT.into())
            }
            DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => {
                Size::new(HEIGHT.into(), WIDTH.into())
            }
        }
    }
}

#[cfg(all(test, feature = "graphics"))]
mod tests {
    use super::*;
    use crate::color::TriColor;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn new_buffer_is_white() {
        let d = Display5in79c::new();
        assert!(d.bw_buffer().iter().all(|&b| b == 0xFF));
        assert!(d.chromatic_buffer().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn chromatic_pixel_clears_chromatic_bit() {
        let mut d = Display5in79c::new();
        d.set_pixel(0, 0, TriColor::Chromatic);
        assert_eq!(d.bw_buffer()[0], 0xFF);
        assert_eq!(d.chromatic_buffer()[0], 0x7F);
    }

    #[test]
    fn black_line_clears_bw_bits() {
        let mut d = Display5in79c::new();
        let _ = Line::new(Point::new(0, 0), Point::new(7, 0))
            .into_styled(PrimitiveStyle::with_stroke(TriColor::Black, 1))
            .draw(&mut d);
        assert_eq!(d.bw_buffer()[0], 0x00);
        assert_eq!(d.chromatic_buffer()[0], 0xFF);
        assert!(d.bw_buffer().iter().skip(1).all(|&b| b == 0xFF));
    }
}
