//! Simulated bus and controller for driver tests.
//!
//! The pins and SPI device share one `Sim` which decodes the command/data
//! stream the way the controller would: RAM windows and counters per half,
//! auto-incrementing writes into the black and chromatic banks, and a record
//! of every activation (power transitions and refreshes with the RAM windows
//! that were selected at trigger time).

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::spi::{ErrorType as SpiErrorType, Operation, SpiDevice};
use hx8717::driver::PanelSpec;

const SET_RAMXPOS: u8 = 0x44;
const SET_RAMYPOS: u8 = 0x45;
const SET_RAMX_COUNTER: u8 = 0x4E;
const SET_RAMY_COUNTER: u8 = 0x4F;
const WRITE_BW: u8 = 0x24;
const WRITE_COLOR: u8 = 0x26;
const DEEP_SLEEP: u8 = 0x10;
const SW_RESET: u8 = 0x12;
const MASTER_ACTIVATE: u8 = 0x20;
const UPDATE_CTRL2: u8 = 0x22;
const SLAVE_SELECT: u8 = 0x80;

const UPDATE_POWER_ON: u8 = 0xE0;
const UPDATE_POWER_OFF: u8 = 0x83;

/// One controller half: its RAM banks, window and counters (byte units in x).
pub struct Bank {
    pub width_bytes: u16,
    pub height: u16,
    pub bw: Vec<u8>,
    pub color: Vec<u8>,
    xs: u16,
    xe: u16,
    ys: u16,
    ye: u16,
    xc: u16,
    yc: u16,
}

impl Bank {
    fn new(width_bytes: u16, height: u16) -> Self {
        let size = usize::from(width_bytes) * usize::from(height);
        Self {
            width_bytes,
            height,
            bw: vec![0; size],
            color: vec![0; size],
            xs: 0,
            xe: width_bytes.saturating_sub(1),
            ys: 0,
            ye: height.saturating_sub(1),
            xc: 0,
            yc: 0,
        }
    }

    pub fn window(&self) -> (u16, u16, u16, u16) {
        (self.xs, self.xe, self.ys, self.ye)
    }

    fn push(&mut self, chromatic: bool, byte: u8) {
        if self.xc < self.width_bytes && self.yc < self.height {
            let idx = usize::from(self.yc) * usize::from(self.width_bytes) + usize::from(self.xc);
            if chromatic {
                self.color[idx] = byte;
            } else {
                self.bw[idx] = byte;
            }
        }
        // auto-increment within the window, x fastest
        self.xc += 1;
        if self.xc > self.xe {
            self.xc = self.xs;
            self.yc += 1;
            if self.yc > self.ye {
                self.yc = self.ys;
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshRecord {
    pub mode: u8,
    pub master_window: (u16, u16, u16, u16),
    pub slave_window: Option<(u16, u16, u16, u16)>,
}

pub struct Sim {
    pub master: Bank,
    pub slave: Option<Bank>,
    pub refreshes: Vec<RefreshRecord>,
    pub power_on_count: usize,
    pub powered: bool,
    pub deep_sleep: bool,
    pub sw_resets: usize,
    pub hard_resets: usize,
    dc_data: bool,
    cur_cmd: Option<u8>,
    pending: Vec<u8>,
    last_ctrl2: u8,
}

impl Sim {
    fn new(panel: &PanelSpec) -> Self {
        let (master, slave) = match panel.split_col {
            Some(split) => (
                Bank::new(split / 8, panel.height),
                Some(Bank::new((panel.width - split) / 8, panel.height)),
            ),
            None => (Bank::new(panel.width / 8, panel.height), None),
        };
        Self {
            master,
            slave,
            refreshes: Vec::new(),
            power_on_count: 0,
            powered: false,
            deep_sleep: false,
            sw_resets: 0,
            hard_resets: 0,
            dc_data: false,
            cur_cmd: None,
            pending: Vec::new(),
            last_ctrl2: 0,
        }
    }

    /// The black plane across both halves, row-major, master columns first.
    pub fn combined_bw(&self) -> Vec<u8> {
        fn bw(bank: &Bank) -> &[u8] {
            &bank.bw
        }
        self.combined(bw)
    }

    /// The chromatic plane across both halves.
    pub fn combined_color(&self) -> Vec<u8> {
        fn color(bank: &Bank) -> &[u8] {
            &bank.color
        }
        self.combined(color)
    }

    fn combined(&self, plane: fn(&Bank) -> &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for row in 0..usize::from(self.master.height) {
            let mw = usize::from(self.master.width_bytes);
            out.extend_from_slice(&plane(&self.master)[row * mw..(row + 1) * mw]);
            if let Some(slave) = &self.slave {
                let sw = usize::from(slave.width_bytes);
                out.extend_from_slice(&plane(slave)[row * sw..(row + 1) * sw]);
            }
        }
        out
    }

    fn accept(&mut self, byte: u8) {
        if self.dc_data {
            self.data_byte(byte);
        } else {
            self.command_byte(byte);
        }
    }

    fn command_byte(&mut self, cmd: u8) {
        self.cur_cmd = Some(cmd);
        self.pending.clear();
        match cmd {
            SW_RESET => self.sw_resets += 1,
            MASTER_ACTIVATE => match self.last_ctrl2 {
                UPDATE_POWER_ON => {
                    self.powered = true;
                    self.power_on_count += 1;
                }
                UPDATE_POWER_OFF => self.powered = false,
                mode => self.refreshes.push(RefreshRecord {
                    mode,
                    master_window: self.master.window(),
                    slave_window: self.slave.as_ref().map(Bank::window),
                }),
            },
            _ => {}
        }
    }

    fn data_byte(&mut self, byte: u8) {
        let Some(cmd) = self.cur_cmd else {
            return;
        };
        let base = cmd & !SLAVE_SELECT;
        let to_slave = cmd & SLAVE_SELECT != 0 && self.slave.is_some();
        match base {
            WRITE_BW | WRITE_COLOR => {
                let chromatic = base == WRITE_COLOR;
                let bank = if to_slave {
                    self.slave.as_mut().unwrap()
                } else {
                    &mut self.master
                };
                bank.push(chromatic, byte);
            }
            SET_RAMXPOS | SET_RAMYPOS | SET_RAMX_COUNTER | SET_RAMY_COUNTER => {
                self.pending.push(byte);
                let want = match base {
                    SET_RAMXPOS => 2,
                    SET_RAMYPOS => 4,
                    SET_RAMX_COUNTER => 1,
                    _ => 2,
                };
                if self.pending.len() == want {
                    let p = std::mem::take(&mut self.pending);
                    let bank = if to_slave {
                        self.slave.as_mut().unwrap()
                    } else {
                        &mut self.master
                    };
                    match base {
                        SET_RAMXPOS => {
                            bank.xs = u16::from(p[0]);
                            bank.xe = u16::from(p[1]);
                        }
                        SET_RAMYPOS => {
                            bank.ys = u16::from(p[0]) | (u16::from(p[1]) << 8);
                            bank.ye = u16::from(p[2]) | (u16::from(p[3]) << 8);
                        }
                        SET_RAMX_COUNTER => bank.xc = u16::from(p[0]),
                        _ => bank.yc = u16::from(p[0]) | (u16::from(p[1]) << 8),
                    }
                }
            }
            UPDATE_CTRL2 => self.last_ctrl2 = byte,
            DEEP_SLEEP => self.deep_sleep = true,
            _ => {}
        }
    }
}

#[derive(Clone)]
pub struct SimHandle(Rc<RefCell<Sim>>);

impl SimHandle {
    pub fn with<R>(&self, f: impl FnOnce(&Sim) -> R) -> R {
        f(&self.0.borrow())
    }
}

pub struct SimSpi(SimHandle);

impl SpiErrorType for SimSpi {
    type Error = Infallible;
}

impl SpiDevice for SimSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        for op in operations.iter_mut() {
            if let Operation::Write(buf) = op {
                for &b in buf.iter() {
                    self.0 .0.borrow_mut().accept(b);
                }
            }
        }
        Ok(())
    }
}

pub struct SimDc(SimHandle);

impl PinErrorType for SimDc {
    type Error = Infallible;
}

impl OutputPin for SimDc {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0 .0.borrow_mut().dc_data = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0 .0.borrow_mut().dc_data = true;
        Ok(())
    }
}

pub struct SimBusy;

impl PinErrorType for SimBusy {
    type Error = Infallible;
}

impl InputPin for SimBusy {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        // controller reports ready immediately
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }
}

pub struct SimRst(SimHandle);

impl PinErrorType for SimRst {
    type Error = Infallible;
}

impl OutputPin for SimRst {
    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut sim = self.0 .0.borrow_mut();
        sim.hard_resets += 1;
        sim.deep_sleep = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Build a simulated panel and the bus endpoints a driver needs.
pub fn sim_for(panel: &PanelSpec) -> (SimHandle, SimSpi, SimBusy, SimDc, SimRst) {
    let handle = SimHandle(Rc::new(RefCell::new(Sim::new(panel))));
    (
        handle.clone(),
        SimSpi(handle.clone()),
        SimBusy,
        SimDc(handle.clone()),
        SimRst(handle),
    )
}
