// pixel.rs - Pixel Channel Normalization
//
// Both backends hand out BGRA pixels. The public frame format is RGBA, which only
// needs the first and third byte of every pixel exchanged. The aligned middle of
// the buffer is processed two pixels at a time as u64 words.

/// Bytes 1, 3, 5 and 7 of a little-endian word stay where they are
const KEEP_MASK: u64 = 0xFF00_FF00_FF00_FF00;
/// Byte 0 of each pixel in a little-endian word
const LOW_MASK: u64 = 0x0000_00FF_0000_00FF;

/// Swap the first and third byte of every 4-byte pixel in place (BGRA <-> RGBA).
///
/// Applying it twice restores the original buffer. A trailing partial pixel is
/// left untouched.
pub fn swap_channel_order(buffer: &mut [u8]) {
    let whole = buffer.len() - buffer.len() % 4;
    let buffer = &mut buffer[..whole];

    // Alignment boundary inside a pixel rules out the wide path
    let misalignment = buffer.as_ptr().align_offset(std::mem::align_of::<u64>());
    if misalignment % 4 != 0 {
        swap_pixels(buffer);
        return;
    }

    let (head, words, tail) = bytemuck::pod_align_to_mut::<u8, u64>(buffer);
    swap_pixels(head);
    for word in words.iter_mut() {
        let value = u64::from_le(*word);
        let swapped = (value & KEEP_MASK) | ((value & LOW_MASK) << 16) | ((value >> 16) & LOW_MASK);
        *word = swapped.to_le();
    }
    swap_pixels(tail);
}

/// Set the alpha byte of every pixel to `alpha`
pub fn fill_alpha(buffer: &mut [u8], alpha: u8) {
    for pixel in buffer.chunks_exact_mut(4) {
        pixel[3] = alpha;
    }
}

fn swap_pixels(bytes: &mut [u8]) {
    for pixel in bytes.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
}
