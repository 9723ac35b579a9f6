use std::fmt::Write as _;

const ROW_LEN: usize = 16;

/// Render `bytes` as rows of 16: decimal offset, then the bytes in hex. The last line is the
/// total length.
///
/// ```text
/// 0000000    07 ff c0 00 00 00 00
/// 0000007
/// ```
pub fn hexdump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() / ROW_LEN + 1) * (11 + 3 * ROW_LEN) + 8);

    for (i, row) in bytes.chunks(ROW_LEN).enumerate() {
        let _ = write!(out, "{:07}   ", i * ROW_LEN);

        for b in row {
            let _ = write!(out, " {b:02x}");
        }

        out.push('\n');
    }

    let _ = write!(out, "{:07}", bytes.len());
    out
}
