/// Internet checksum (RFC 1071) over `data`.
///
/// The buffer is summed as big-endian 16-bit words, an odd trailing byte is padded with
/// zero, carries are folded back in and the one's complement of the sum is returned.
/// Compute it with the checksum field zeroed, then store the result in that field.
#[must_use]
pub fn checksum(data: &[u8]) -> u16 {
    !fold(ones_complement_sum(data))
}

/// True if `data` (checksum field included) sums to `0xFFFF`, i.e. carries a valid checksum.
#[must_use]
pub fn verify_checksum(data: &[u8]) -> bool {
    fold(ones_complement_sum(data)) == 0xFFFF
}

fn ones_complement_sum(data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(2);
    let mut sum: u32 = chunks
        .by_ref()
        .map(|word| u32::from(u16::from_be_bytes([word[0], word[1]])))
        .fold(0u32, |acc, word| fold(acc + word).into());
    if let [last] = chunks.remainder() {
        sum = fold(sum + (u32::from(*last) << 8)).into();
    }
    sum
}

fn fold(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    // fits after folding
    #[allow(clippy::cast_possible_truncation)]
    let folded = sum as u16;
    folded
}
