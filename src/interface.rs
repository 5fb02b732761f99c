//! SPI transport for the controller's command/data bus.

use core::convert::Infallible;

use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use log::warn;

/// Stand-in for an absent control line.
///
/// Used as the type parameter for the reset or power-enable pin when the
/// board wires that line to a fixed level. Setting it does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// The controller bus: SPI device plus busy/DC and the optional reset and
/// power-enable lines.
///
/// Chip select is owned by the [`SpiDevice`] implementation. The busy line is
/// read active-high (high = controller busy).
pub struct SpiDisplayInterface<SPI, BSY, DC, RST, PWR> {
    spi: SPI,
    busy: BSY,
    dc: DC,
    rst: Option<RST>,
    pwr: Option<PWR>,
}

impl<SPI, BSY, DC, RST, PWR> SpiDisplayInterface<SPI, BSY, DC, RST, PWR>
where
    SPI: SpiDevice,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
{
    /// Wrap the bus lines. Pass `None` for reset or power-enable when the
    /// board does not route them.
    pub fn new(spi: SPI, busy: BSY, dc: DC, rst: Option<RST>, pwr: Option<PWR>) -> Self {
        Self {
            spi,
            busy,
            dc,
            rst,
            pwr,
        }
    }

    /// Whether a reset line is available (required to wake from deep sleep)
    pub fn has_reset(&self) -> bool {
        self.rst.is_some()
    }

    /// Send a bare command byte
    pub fn cmd(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        self.spi
            .write(&[cmd])
            .map_err(|_| DisplayError::BusWriteError)
    }

    /// Send data bytes
    pub fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.spi
            .write(data)
            .map_err(|_| DisplayError::BusWriteError)
    }

    /// Send a command followed by its data bytes
    pub fn cmd_with_data(&mut self, cmd: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cmd(cmd)?;
        self.data(data)
    }

    /// Send the same data byte `times` times (uniform RAM fills)
    pub fn data_x_times(&mut self, val: u8, times: u32) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        let chunk = [val; 64];
        let mut remaining = times as usize;
        while remaining > 0 {
            let n = remaining.min(chunk.len());
            self.spi
                .write(&chunk[..n])
                .map_err(|_| DisplayError::BusWriteError)?;
            remaining -= n;
        }
        Ok(())
    }

    /// Toggle the reset line. No-op when the line is absent.
    pub fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        if let Some(rst) = self.rst.as_mut() {
            rst.set_high().map_err(|_| DisplayError::RSError)?;
            delay.delay_ms(10);
            rst.set_low().map_err(|_| DisplayError::RSError)?;
            delay.delay_ms(10);
            rst.set_high().map_err(|_| DisplayError::RSError)?;
            delay.delay_ms(10);
        }
        Ok(())
    }

    /// Drive the panel supply rail. No-op when the line is absent.
    pub fn power_enable(&mut self, on: bool) -> Result<(), DisplayError> {
        if let Some(pwr) = self.pwr.as_mut() {
            if on {
                pwr.set_high().map_err(|_| DisplayError::CSError)?;
            } else {
                pwr.set_low().map_err(|_| DisplayError::CSError)?;
            }
        }
        Ok(())
    }

    /// Poll the busy line until the controller reports ready or `ceiling_ms`
    /// elapses. The ceiling is advisory: on expiry we log and proceed, since
    /// no recovery is possible short of a reset.
    pub fn wait_until_idle(&mut self, delay: &mut impl DelayNs, ceiling_ms: u32) {
        let mut waited_ms: u32 = 0;
        loop {
            // a failed read counts as busy
            match self.busy.is_high() {
                Ok(false) => return,
                Ok(true) | Err(_) => {}
            }
            if waited_ms >= ceiling_ms {
                warn!("busy still asserted after {} ms, proceeding", ceiling_ms);
                return;
            }
            delay.delay_ms(1);
            waited_ms += 1;
        }
    }
}
