//! Anchor wire-format tags shared by both protocol adapters.

/// Compute an Anchor 8-byte instruction discriminator:
/// `sha256("global:{name}")[..8]`.
pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("global:{name}");
    let hash = solana_program::hash::hash(preimage.as_bytes());
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash.to_bytes()[..8]);
    disc
}

/// Compute an Anchor 8-byte account discriminator:
/// `sha256("account:{name}")[..8]`.
pub fn anchor_account_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("account:{name}");
    let hash = solana_program::hash::hash(preimage.as_bytes());
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash.to_bytes()[..8]);
    disc
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Both supported programs are Anchor programs, so the tag depends only
    /// on the name: `close_position` hashes identically for either. Pinned
    /// against the known on-chain byte values.
    #[test]
    fn discriminators_match_deployed_programs() {
        assert_eq!(
            anchor_discriminator("close_position"),
            [0x7b, 0x86, 0x51, 0x00, 0x31, 0x44, 0x62, 0x62]
        );
        assert_eq!(
            anchor_discriminator("initialize_bin_array"),
            [0x23, 0x56, 0x13, 0xb9, 0x4e, 0xd4, 0x4b, 0xd3]
        );
        assert_eq!(
            anchor_discriminator("add_liquidity_by_strategy2"),
            [0x03, 0xdd, 0x95, 0xda, 0x6f, 0x8d, 0x76, 0xd5]
        );
        assert_eq!(
            anchor_discriminator("claim_fee2"),
            [0x70, 0xbf, 0x65, 0xab, 0x1c, 0x90, 0x7f, 0xbb]
        );
        assert_eq!(
            anchor_account_discriminator("PositionV2"),
            [0x75, 0xb0, 0xd4, 0xc7, 0xf5, 0xb4, 0x85, 0xb6]
        );
    }
}
