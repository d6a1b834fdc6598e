/// One 24-bit pixel as stored in a [`crate::PixelGrid`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// Luma / blue-difference / red-difference triple, kept in floating point until the
/// transform stage narrows it.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct YCbCr {
    pub y: f64,
    pub cb: f64,
    pub cr: f64,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Channel {
    Y = 0,
    Cb = 1,
    Cr = 2,
}

impl YCbCr {
    pub fn from_rgb(rgb: Rgb) -> Self {
        let (r, g, b) = (rgb.r as f64, rgb.g as f64, rgb.b as f64);

        YCbCr {
            y: 16.0 + (65.738 * r + 129.057 * g + 24.064 * b) / 256.0,
            cb: 128.0 + (-37.945 * r - 74.494 * g + 112.439 * b) / 256.0,
            cr: 128.0 + (112.439 * r - 94.154 * g - 18.285 * b) / 256.0,
        }
    }

    pub fn component(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Y => self.y,
            Channel::Cb => self.cb,
            Channel::Cr => self.cr,
        }
    }

    pub fn to_rgb(&self) -> Rgb {
        let YCbCr { y, cb, cr } = *self;

        Rgb {
            r: to_byte((298.082 * y + 408.583 * cr) / 256.0 - 222.921),
            g: to_byte((298.082 * y - 100.291 * cb - 208.120 * cr) / 256.0 + 135.576),
            b: to_byte((298.082 * y + 516.412 * cb) / 256.0 - 276.836),
        }
    }
}

/// Truncates toward zero, then saturates into the byte range.
pub(crate) fn to_byte(d: f64) -> u8 {
    (d as i32).clamp(u8::MIN as i32, u8::MAX as i32) as u8
}
