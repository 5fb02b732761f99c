//! Window clipping, byte alignment and master/slave splitting.
//!
//! Controller RAM is addressed in byte columns, so every window handed to the
//! memory writer must start and end on a multiple of 8 pixels. Requested
//! rectangles that don't are widened: the start column is rounded down and
//! the end column rounded up to the covering byte boundary. The same policy
//! applies at every entry point.

/// Which half of a dual-scan controller a window addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChipSelect {
    Master,
    Slave,
}

impl ChipSelect {
    /// Command offset for this half (OR onto the base opcode).
    pub(crate) fn cmd_offset(self) -> u8 {
        match self {
            ChipSelect::Master => 0x00,
            ChipSelect::Slave => crate::cmd::Cmd::SLAVE_SELECT,
        }
    }
}

/// A byte-aligned window in panel coordinates. `x` and `w` are multiples
/// of 8.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AlignedWindow {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

/// A window rebased onto one controller half. `x` is local to the half's
/// column origin; `panel_x` remembers where the window starts in panel
/// coordinates so row data can be sliced from the composited stripe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HalfWindow {
    pub chip: ChipSelect,
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
    pub panel_x: u16,
}

/// Clip a requested rectangle against the panel and widen it to byte
/// columns. Returns `None` when nothing remains on the panel; callers treat
/// that as a zero-byte no-op.
pub(crate) fn clip_and_align(
    x: i16,
    y: i16,
    w: u16,
    h: u16,
    width: u16,
    height: u16,
) -> Option<AlignedWindow> {
    let x0 = (i32::from(x) & !7).max(0);
    let x1 = ((i32::from(x) + i32::from(w) + 7) & !7).min(i32::from(width));
    let y0 = i32::from(y).max(0);
    let y1 = (i32::from(y) + i32::from(h)).min(i32::from(height));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some(AlignedWindow {
        x: x0 as u16,
        y: y0 as u16,
        w: (x1 - x0) as u16,
        h: (y1 - y0) as u16,
    })
}

/// Split an aligned window at the controller's half boundary. A window
/// entirely on one side addresses only that half; one spanning the boundary
/// becomes two sub-windows. `split_col` must itself be byte aligned.
pub(crate) fn split(win: AlignedWindow, split_col: Option<u16>) -> [Option<HalfWindow>; 2] {
    let Some(split_col) = split_col else {
        return [
            Some(HalfWindow {
                chip: ChipSelect::Master,
                x: win.x,
                y: win.y,
                w: win.w,
                h: win.h,
                panel_x: win.x,
            }),
            None,
        ];
    };

    let end = win.x + win.w;
    if end <= split_col {
        [
            Some(HalfWindow {
                chip: ChipSelect::Master,
                x: win.x,
                y: win.y,
                w: win.w,
                h: win.h,
                panel_x: win.x,
            }),
            None,
        ]
    } else if win.x >= split_col {
        [
            Some(HalfWindow {
                chip: ChipSelect::Slave,
                x: win.x - split_col,
                y: win.y,
                w: win.w,
                h: win.h,
                panel_x: win.x,
            }),
            None,
        ]
    } else {
        [
            Some(HalfWindow {
                chip: ChipSelect::Master,
                x: win.x,
                y: win.y,
                w: split_col - win.x,
                h: win.h,
                panel_x: win.x,
            }),
            Some(HalfWindow {
                chip: ChipSelect::Slave,
                x: 0,
                y: win.y,
                w: end - split_col,
                h: win.h,
                panel_x: split_col,
            }),
        ]
    }
}
