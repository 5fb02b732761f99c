//! HX8717 ePaper Display Driver
//!
//! Driver for segmented dual-plane ePaper panels built on HX8717-class
//! dual-scan controllers, such as the
//! [Good Display 5.79" GDEY0579F51](https://www.good-display.com/product/570.html)
//! (792x272, black/white + chromatic) and its monochrome sibling GDEY0579T93.
//!
//! This driver is loosely modeled after the
//! [epd-waveshare](https://github.com/caemor/epd-waveshare) drivers but built
//! around one generic driver parameterized by a panel descriptor instead of
//! one driver type per panel model.
//!
//! ## Architecture
//!
//! - **[`Hx8717`](driver::Hx8717)** is the hardware driver: it owns the bus,
//!   streams bit-plane data into controller RAM (addressing the master/slave
//!   halves as the target rectangle requires) and sequences power-up,
//!   refresh and power-down.
//! - **[`PanelSpec`](driver::PanelSpec)** describes a panel model: geometry,
//!   capability flags, advisory timings, init commands and the column where
//!   the slave half begins. Descriptors for known panels live in
//!   [`displays`].
//! - **Framebuffers** (`Display5in79c`, `Display5in79`, feature `graphics`)
//!   integrate with embedded-graphics and hand their bitmaps to the driver's
//!   write methods.
//!
//! Controller memory writes and panel refreshes are decoupled: `write_*`
//! methods only touch RAM, `draw_*` methods write and refresh, and
//! [`refresh`](driver::Hx8717::refresh) /
//! [`refresh_area`](driver::Hx8717::refresh_area) push already-written
//! memory to the glass. A full refresh on the chromatic panel takes around
//! 21 seconds; power transitions take around 100 ms. Call
//! [`power_off`](driver::Hx8717::power_off) or
//! [`hibernate`](driver::Hx8717::hibernate) when done, leaving the driving
//! voltages enabled ages the panel.
//!
//! ## Usage
//!
//! ```rust, ignore
//! use hx8717::displays::good_display_5in79c::{Display5in79c, GDEY0579F51};
//! use hx8717::driver::Hx8717;
//! use hx8717::prelude::*;
//! use embedded_graphics::{prelude::*, primitives::*};
//!
//! // 1. Create the hardware driver for the panel model
//! let mut epd = Hx8717::new(&GDEY0579F51, spi, busy, dc, rst);
//!
//! // 2. Draw into a framebuffer using embedded-graphics
//! let mut display = Display5in79c::new();
//! Rectangle::new(Point::new(16, 16), Size::new(120, 60))
//!     .into_styled(PrimitiveStyle::with_fill(TriColor::Chromatic))
//!     .draw(&mut display)?;
//!
//! // 3. Write both planes and refresh
//! epd.draw_image_planes(
//!     Some(display.bw_buffer()),
//!     Some(display.chromatic_buffer()),
//!     0, 0, 792, 272, false, false, &mut delay,
//! )?;
//!
//! // 4. De-energize the panel
//! epd.power_off(&mut delay)?;
//! ```
//!
//! Partial updates (`refresh_area`, `draw_image_part`) address byte-aligned
//! windows: x and w should be multiples of 8 and are widened to the covering
//! byte columns otherwise.
#![no_std]
#![deny(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

mod cmd;
pub mod color;
pub mod displays;
pub mod driver;
mod geometry;
mod image;
pub mod interface;

mod flag;

/// Maximum display width this driver supports
pub const MAX_WIDTH: u16 = 1024;

/// Maximum display height this driver supports
pub const MAX_HEIGHT: u16 = 512;

/// Useful exports
pub mod prelude {
    pub use crate::color::{Color, TriColor};
    pub use crate::driver::{Hx8717, PanelSpec, PowerState};
    pub use crate::interface::NoPin;

    #[cfg(feature = "graphics")]
    pub use crate::displays::{Display, DisplayRotation};
}
