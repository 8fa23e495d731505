use sha2::{Digest, Sha256};

/// Colour assigned to characters that never picked one
pub const DEFAULT_COLOR: &str = "#ffffff";

/// Speaker palette. Indexed by a digest of the character id, so the same
/// speaker always gets the same colour in every process.
pub const SPEAKER_PALETTE: [&str; 12] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4",
    "#46f0f0", "#f032e6", "#bcf60c", "#fabebe", "#008080", "#e6beff",
];

/// Pick a palette colour for a speaker id
pub fn speaker_color(speaker_id: &str) -> &'static str {
    let digest = Sha256::digest(speaker_id.as_bytes());
    let index = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize;
    SPEAKER_PALETTE[index % SPEAKER_PALETTE.len()]
}

/// Parse a "#rrggbb" (or "rrggbb") colour into normalised RGB components
pub fn parse_hex_color(color: &str) -> Option<[f32; 3]> {
    let digits = color.trim().trim_start_matches('#');
    if digits.len() != 6 {
        return None;
    }
    let bytes = hex::decode(digits).ok()?;
    Some([
        f32::from(bytes[0]) / 255.0,
        f32::from(bytes[1]) / 255.0,
        f32::from(bytes[2]) / 255.0,
    ])
}
