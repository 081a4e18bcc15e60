const CHANNELS: usize = 4;

/// Generates a solid-color RGBA frame.
pub fn solid_rgba(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "frame dimensions must be positive");
    let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
    for _ in 0..width * height {
        data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    data
}

/// Generates a frame split into two horizontal bands at `split_row`: rows
/// above it take `top`, the rest take `bottom`.
pub fn split_rgba(width: u32, height: u32, split_row: u32, top: [u8; 3], bottom: [u8; 3]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "frame dimensions must be positive");
    assert!(split_row <= height, "split row must lie inside the frame");
    let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
    for y in 0..height {
        let rgb = if y < split_row { top } else { bottom };
        for _ in 0..width {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
    }
    data
}

/// Generates a background frame with one filled square of a second color.
pub fn filled_square_rgba(
    width: u32,
    height: u32,
    background: [u8; 3],
    fill: [u8; 3],
    origin: (u32, u32),
    size: u32,
) -> Vec<u8> {
    assert!(width > 0 && height > 0, "frame dimensions must be positive");
    assert!(
        origin.0 + size <= width && origin.1 + size <= height,
        "square must lie inside the frame"
    );
    let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
    for y in 0..height {
        for x in 0..width {
            let inside = x >= origin.0 && x < origin.0 + size && y >= origin.1 && y < origin.1 + size;
            let rgb = if inside { fill } else { background };
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
    }
    data
}
