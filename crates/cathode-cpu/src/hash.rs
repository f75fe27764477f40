/// Thomas Wang's 32-bit integer hash. The GLSL sources use the same
/// arithmetic so both devices produce identical noise.
pub fn wang_hash(seed: u32) -> u32 {
    let mut h = (seed ^ 61) ^ (seed >> 16);
    h = h.wrapping_mul(9);
    h ^= h >> 4;
    h = h.wrapping_mul(0x27d4_eb2d);
    h ^= h >> 15;
    h
}

/// Hash of a value under a seed.
pub fn hash2(value: u32, seed: u32) -> u32 {
    wang_hash(value ^ wang_hash(seed))
}

/// Map a hash to `[0, 1)`. Only the top 24 bits are kept so the result is
/// exact in `f32`.
pub fn unit(hash: u32) -> f32 {
    (hash >> 8) as f32 / 16_777_216.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_range_is_half_open() {
        assert_eq!(unit(0), 0.0);
        assert!(unit(u32::MAX) < 1.0);
    }

    #[test]
    fn seeds_decorrelate() {
        let a: Vec<u32> = (0..16).map(|i| hash2(i, 1)).collect();
        let b: Vec<u32> = (0..16).map(|i| hash2(i, 2)).collect();
        assert_ne!(a, b);
        assert_eq!(a, (0..16).map(|i| hash2(i, 1)).collect::<Vec<_>>());
    }
}
