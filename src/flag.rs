pub struct Flag;
#[allow(dead_code)]
impl Flag {
    pub const DATA_ENTRY_INCRY_INCRX: u8 = 0b11;
    pub const INTERNAL_TEMP_SENSOR: u8 = 0x80;
    pub const BORDER_WAVEFORM_FOLLOW_LUT: u8 = 0b0100;
    pub const BORDER_WAVEFORM_LUT0: u8 = 0b0000;
    pub const BORDER_WAVEFORM_LUT1: u8 = 0b0001;
    // Update sequence options for DISPLAY_UPDATE_CTRL2
    pub const UPDATE_POWER_ON: u8 = 0xE0;
    pub const UPDATE_POWER_OFF: u8 = 0x83;
    pub const UPDATE_FULL: u8 = 0xF7;
    pub const UPDATE_PARTIAL: u8 = 0xFF;
    pub const UPDATE_FAST: u8 = 0xC7;
    /// Deep sleep mode 1 retains controller RAM
    pub const DEEP_SLEEP_MODE_1: u8 = 0x01;
}
