//! No-std compatible number formatting for snapshot serialization.
//!
//! These functions write formatted numbers directly to byte buffers without
//! requiring heap allocation or `core::fmt` float machinery.

/// Maximum bytes written by [`write_i32`] ("-2147483648").
pub const MAX_I32_LEN: usize = 11;

/// Maximum bytes written by [`write_tenths`].
pub const MAX_TENTHS_LEN: usize = MAX_I32_LEN + 2;

/// Write an i32 as a signed decimal string.
///
/// Returns the number of bytes written (1-11 bytes).
///
/// # Panics
///
/// Panics if `buf.len() < MAX_I32_LEN`.
#[inline]
pub fn write_i32(buf: &mut [u8], value: i32) -> usize {
    debug_assert!(buf.len() >= MAX_I32_LEN, "buffer too small for i32");

    let mut pos = 0;
    if value < 0 {
        buf[0] = b'-';
        pos = 1;
    }
    pos + write_u32(&mut buf[pos..], value.unsigned_abs())
}

/// Write a u32 as an unsigned decimal string.
#[inline]
fn write_u32(buf: &mut [u8], value: u32) -> usize {
    if value == 0 {
        buf[0] = b'0';
        return 1;
    }

    // Write digits in reverse order to temporary buffer
    let mut temp = [0u8; 10];
    let mut n = value;
    let mut len = 0;
    while n > 0 {
        temp[len] = b'0' + (n % 10) as u8;
        n /= 10;
        len += 1;
    }

    for i in 0..len {
        buf[i] = temp[len - 1 - i];
    }

    len
}

/// Write an f32 with exactly one decimal place (`-12.5`, `0.0`, `180.0`).
///
/// The value is rounded half away from zero to the nearest tenth. Values that
/// would not fit an i32 once scaled are saturated; NaN is written as `0.0`.
///
/// Returns the number of bytes written.
///
/// # Panics
///
/// Panics if `buf.len() < MAX_TENTHS_LEN`.
#[inline]
pub fn write_tenths(buf: &mut [u8], value: f32) -> usize {
    debug_assert!(buf.len() >= MAX_TENTHS_LEN, "buffer too small for tenths");

    // Float-to-int casts saturate and map NaN to 0.
    let tenths = libm::roundf(value * 10.0) as i32;

    let mut pos = 0;
    if tenths < 0 {
        buf[0] = b'-';
        pos = 1;
    }
    let magnitude = tenths.unsigned_abs();
    pos += write_u32(&mut buf[pos..], magnitude / 10);
    buf[pos] = b'.';
    buf[pos + 1] = b'0' + (magnitude % 10) as u8;
    pos + 2
}
