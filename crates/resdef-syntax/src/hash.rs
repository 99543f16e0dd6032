//! MurmurHash3 as `const fn`.
//!
//! The definition parser dispatches on hashed identifiers. Because both
//! functions are `const`, keyword constants are derived from their spelling
//! at compile time:
//!
//! ```rust
//! use resdef_syntax::hash::hash32_str;
//!
//! const BLEND: u32 = hash32_str("blend");
//! assert_eq!(BLEND, hash32_str("blend"));
//! ```

/// Seed used when no explicit seed is given.
pub const DEFAULT_SEED: u32 = 0x9E20_30F1;

const fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

const fn block32(data: &[u8], at: usize) -> u32 {
    (data[at] as u32)
        | ((data[at + 1] as u32) << 8)
        | ((data[at + 2] as u32) << 16)
        | ((data[at + 3] as u32) << 24)
}

/// Packs up to four tail bytes starting at `at` into a little-endian word.
const fn tail32(data: &[u8], at: usize, len: usize) -> u32 {
    let mut k = 0u32;
    let mut i = 0;
    while i < len {
        k |= (data[at + i] as u32) << (8 * i);
        i += 1;
    }
    k
}

/// MurmurHash3 x86_32.
pub const fn hash32(data: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    let len = data.len();
    let blocks = len / 4;
    let mut h = seed;

    let mut i = 0;
    while i < blocks {
        let mut k = block32(data, i * 4);
        k = k.wrapping_mul(C1);
        k = k.rotate_left(15);
        k = k.wrapping_mul(C2);

        h ^= k;
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
        i += 1;
    }

    let rem = len & 3;
    if rem > 0 {
        let mut k = tail32(data, blocks * 4, rem);
        k = k.wrapping_mul(C1);
        k = k.rotate_left(15);
        k = k.wrapping_mul(C2);
        h ^= k;
    }

    h ^= len as u32;
    fmix32(h)
}

/// Upper 64 bits of MurmurHash3 x86_128.
pub const fn hash64(data: &[u8], seed: u32) -> u64 {
    const C1: u32 = 0x239b_961b;
    const C2: u32 = 0xab0e_9789;
    const C3: u32 = 0x38b3_4ae5;
    const C4: u32 = 0xa1e3_8b93;

    let len = data.len();
    let blocks = len / 16;

    let mut h1 = seed;
    let mut h2 = seed;
    let mut h3 = seed;
    let mut h4 = seed;

    let mut i = 0;
    while i < blocks {
        let at = i * 16;
        let mut k1 = block32(data, at);
        let mut k2 = block32(data, at + 4);
        let mut k3 = block32(data, at + 8);
        let mut k4 = block32(data, at + 12);

        k1 = k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
        h1 ^= k1;
        h1 = h1.rotate_left(19).wrapping_add(h2).wrapping_mul(5).wrapping_add(0x561c_cd1b);

        k2 = k2.wrapping_mul(C2).rotate_left(16).wrapping_mul(C3);
        h2 ^= k2;
        h2 = h2.rotate_left(17).wrapping_add(h3).wrapping_mul(5).wrapping_add(0x0bca_a747);

        k3 = k3.wrapping_mul(C3).rotate_left(17).wrapping_mul(C4);
        h3 ^= k3;
        h3 = h3.rotate_left(15).wrapping_add(h4).wrapping_mul(5).wrapping_add(0x96cd_1c35);

        k4 = k4.wrapping_mul(C4).rotate_left(18).wrapping_mul(C1);
        h4 ^= k4;
        h4 = h4.rotate_left(13).wrapping_add(h1).wrapping_mul(5).wrapping_add(0x32ac_3b17);

        i += 1;
    }

    let tail = blocks * 16;
    let rem = len & 15;

    if rem > 12 {
        let k4 = tail32(data, tail + 12, rem - 12);
        h4 ^= k4.wrapping_mul(C4).rotate_left(18).wrapping_mul(C1);
    }
    if rem > 8 {
        let n = if rem - 8 > 4 { 4 } else { rem - 8 };
        let k3 = tail32(data, tail + 8, n);
        h3 ^= k3.wrapping_mul(C3).rotate_left(17).wrapping_mul(C4);
    }
    if rem > 4 {
        let n = if rem - 4 > 4 { 4 } else { rem - 4 };
        let k2 = tail32(data, tail + 4, n);
        h2 ^= k2.wrapping_mul(C2).rotate_left(16).wrapping_mul(C3);
    }
    if rem > 0 {
        let n = if rem > 4 { 4 } else { rem };
        let k1 = tail32(data, tail, n);
        h1 ^= k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
    }

    let len = len as u32;
    h1 ^= len;
    h2 ^= len;
    h3 ^= len;
    h4 ^= len;

    h1 = h1.wrapping_add(h2).wrapping_add(h3).wrapping_add(h4);
    h2 = h2.wrapping_add(h1);
    h3 = h3.wrapping_add(h1);
    h4 = h4.wrapping_add(h1);

    h1 = fmix32(h1);
    h2 = fmix32(h2);
    h3 = fmix32(h3);
    h4 = fmix32(h4);

    h1 = h1.wrapping_add(h2).wrapping_add(h3).wrapping_add(h4);
    h3 = h3.wrapping_add(h1);
    h4 = h4.wrapping_add(h1);

    // Bytes 8..16 of the 128-bit digest, read as a little-endian u64.
    (h3 as u64) | ((h4 as u64) << 32)
}

/// [`hash32`] of a string with [`DEFAULT_SEED`].
pub const fn hash32_str(s: &str) -> u32 {
    hash32(s.as_bytes(), DEFAULT_SEED)
}

/// [`hash64`] of a string with [`DEFAULT_SEED`].
pub const fn hash64_str(s: &str) -> u64 {
    hash64(s.as_bytes(), DEFAULT_SEED)
}
