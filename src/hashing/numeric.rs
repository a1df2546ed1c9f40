// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Integer helpers.

/// Smallest power of two that is `>= x`. Returns 1 for `x <= 1`.
pub fn round_up_to_pow2(x: u32) -> u32 {
    let mut rv = 1u32;
    while rv < x {
        rv <<= 1;
    }
    rv
}

/// Largest prime `<= v`, searching downwards over odd candidates.
///
/// Even inputs are first reduced to the odd number below them. Inputs
/// below 3 return 2 or 1 unchanged since there is nothing to search.
pub fn nearest_prime(v: u32) -> u32 {
    if v < 3 {
        return v;
    }
    let mut odd = if v & 1 == 0 { v - 1 } else { v };

    'candidates: loop {
        let mut i = 3u64;
        while i * i <= u64::from(odd) {
            if u64::from(odd) % i == 0 {
                odd -= 2;
                continue 'candidates;
            }
            i += 2;
        }
        return odd;
    }
}
