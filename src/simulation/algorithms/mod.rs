// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bit-selection algorithms.
//!
//! Each algorithm decides which `k` bits of a [`BitTable`] a 64-bit key hash
//! maps to. They are implemented as zero-sized (or nearly so) types behind
//! the [`BitSelector`] trait, and [`Algorithm`] names them at run time.
//! [`Algorithm::dispatch`] picks the concrete type once so the hot loop is
//! monomorphized for each algorithm.
//!
//! # Example
//!
//! ```
//! use bloom_lab_lib::data_structures::BitTable;
//! use bloom_lab_lib::simulation::algorithms::{Algorithm, BitSelector, CacheWorm64};
//! use bloom_lab_lib::simulation::Geometry;
//!
//! let geometry = Geometry::new(1 << 16, 6).unwrap();
//! Algorithm::CacheWorm64.check(&geometry).unwrap();
//!
//! let selector = CacheWorm64::prepare(&geometry);
//! let mut table = BitTable::with_words(geometry.len as usize).unwrap();
//! selector.add(&mut table, &geometry, 0x0123_4567_89ab_cdef);
//! assert!(selector.query(&table, &geometry, 0x0123_4567_89ab_cdef));
//! ```

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data_structures::BitTable;
use crate::error::simulation::SimulationError;
use crate::simulation::fp_model::{CacheLine, FpProfile};
use crate::simulation::geometry::Geometry;

/// Implement [`BitSelector`] for a type with an inherent
/// `probes(&Geometry, u64, impl FnMut(u64) -> bool) -> bool` that yields bit
/// indexes and stops early when the visitor returns false.
macro_rules! selector_from_bit_probes {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::simulation::algorithms::BitSelector for $ty {
            #[inline(always)]
            fn add(
                &self,
                table: &mut $crate::data_structures::BitTable,
                geometry: &$crate::simulation::geometry::Geometry,
                h: u64,
            ) {
                Self::probes(geometry, h, |index| {
                    table.set(index);
                    true
                });
            }

            #[inline(always)]
            fn query(
                &self,
                table: &$crate::data_structures::BitTable,
                geometry: &$crate::simulation::geometry::Geometry,
                h: u64,
            ) -> bool {
                Self::probes(geometry, h, |index| table.test(index))
            }
        }
    )+};
}

/// Like `selector_from_bit_probes!` for probes that yield `(word, mask)`.
macro_rules! selector_from_word_probes {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::simulation::algorithms::BitSelector for $ty {
            #[inline(always)]
            fn add(
                &self,
                table: &mut $crate::data_structures::BitTable,
                geometry: &$crate::simulation::geometry::Geometry,
                h: u64,
            ) {
                Self::probes(geometry, h, |word, mask| {
                    table.or_word(word, mask);
                    true
                });
            }

            #[inline(always)]
            fn query(
                &self,
                table: &$crate::data_structures::BitTable,
                geometry: &$crate::simulation::geometry::Geometry,
                h: u64,
            ) -> bool {
                Self::probes(geometry, h, |word, mask| table.contains_mask(word, mask))
            }
        }
    )+};
}

// Module declarations
mod block;
mod cache;
mod double;
mod plain;
mod rocksdb;
mod sector;

// Re-exports
pub use block::{
    CacheBlock64, CacheDblBlock, CacheEnhdblBlock, CacheMul64Block, CacheMul64BlockFrom32,
    CacheMul64Blockpair, CacheWorm64Block, CacheWorm64BlockAlt, CacheWorm64BlockFrom32,
    CacheWorm64BlockXtra, CacheWorm64Blockpair,
};
pub use cache::{
    CacheDbl, CacheMul64, CacheWorm64, CacheWorm64Alt, CacheWorm64From32, CacheWorm64Xtra,
    LocalMul64, LocalWorm64,
};
pub use double::{
    DblOneFastrange32, DblOneMod, DblPow2, DblPow2SplitCheap, DblPreimageFastrange32, EnhPow2,
};
pub use plain::{Noop, RotPow2, RotPow2Alt, Worm32, Worm64, Worm64AndRotPow2, Xxhash64Pow2};
pub use rocksdb::{
    CacheRocksdbDynamic, CacheRocksdbDynamicFastrange, CacheRocksdbDynamicFastrange2,
    RocksdbDynamic,
};
pub use sector::{CacheSimdFastrange32, CacheSimdFastrange32K8};

/// Maps key hashes to bits in a table.
///
/// `query` after `add` with the same hash, table and geometry must return
/// true. Implementations may assume the geometry passed
/// [`Algorithm::check`] for their algorithm.
pub trait BitSelector: Default + Send + Sync {
    /// Build the selector for a geometry. Most selectors carry no state.
    fn prepare(_geometry: &Geometry) -> Self {
        Self::default()
    }

    /// Set the bits for `h`.
    fn add(&self, table: &mut BitTable, geometry: &Geometry, h: u64);

    /// Returns true if every bit for `h` is set.
    fn query(&self, table: &BitTable, geometry: &Geometry, h: u64) -> bool;
}

/// Receives the concrete selector type chosen by [`Algorithm::dispatch`].
pub trait SelectorVisitor {
    /// Value produced by the visit.
    type Output;

    /// Called with `S` bound to the algorithm's selector.
    fn visit<S: BitSelector>(self) -> Self::Output;
}

/// Single-bit mask from the low six bits of `x`.
#[inline(always)]
pub(crate) fn bit(x: u64) -> u64 {
    1u64 << (x & 63)
}

/// Single-bit mask from the low six bits of a 32-bit `x`.
#[inline(always)]
pub(crate) fn bit32(x: u32) -> u64 {
    1u64 << (x & 63)
}

macro_rules! define_algorithms {
    ($( $(#[$meta:meta])* $variant:ident = $name:literal => $selector:ty ),+ $(,)?) => {
        /// Every simulated bit-selection algorithm.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
        )]
        pub enum Algorithm {
            $(
                $(#[$meta])*
                #[value(name = $name)]
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl Algorithm {
            /// All algorithms in declaration order.
            pub const ALL: &'static [Algorithm] = &[$(Algorithm::$variant),+];

            /// Name as printed in reports and accepted on the command line.
            pub fn name(self) -> &'static str {
                match self {
                    $(Algorithm::$variant => $name,)+
                }
            }

            /// Call `visitor` with this algorithm's selector type.
            pub fn dispatch<V: SelectorVisitor>(self, visitor: V) -> V::Output {
                match self {
                    $(Algorithm::$variant => visitor.visit::<$selector>(),)+
                }
            }
        }
    };
}

define_algorithms! {
    /// Sets a mask derived from the hash in word 0; measures RNG and hash cost
    Noop = "noop" => Noop,
    /// Independent worm64 index for each probe
    Worm64 = "worm64" => Worm64,
    /// Independent worm32 index for each probe, from 32 bits of hash
    Worm32 = "worm32" => Worm32,
    /// Alternates worm64 and rotate-based probes
    Worm64AndRotPow2 = "worm64-and-rot-pow2" => Worm64AndRotPow2,
    /// Rotates the hash between probes
    RotPow2 = "rot-pow2" => RotPow2,
    /// Takes the word and bit from the top of the rotating hash
    RotPow2Alt = "rot-pow2-alt" => RotPow2Alt,
    /// Rehashes the key with a new seed for each probe
    Xxhash64Pow2 = "xxhash64-pow2" => Xxhash64Pow2,
    /// One cache line; worm64 offsets XORed inside the line
    CacheWorm64 = "cache-worm64" => CacheWorm64,
    /// Like cache-worm64, feeding each result back into the hash
    CacheWorm64Xtra = "cache-worm64-xtra" => CacheWorm64Xtra,
    /// One cache line; independent worm64 bit positions within it
    CacheWorm64Alt = "cache-worm64-alt" => CacheWorm64Alt,
    /// Like cache-worm64, from 32 bits of hash
    CacheWorm64From32 = "cache-worm64-from32" => CacheWorm64From32,
    /// Probes within a 234-bit window after a worm64 start
    LocalWorm64 = "local-worm64" => LocalWorm64,
    /// Probes within an eight-word window after a fastrange start
    LocalMul64 = "local-mul64" => LocalMul64,
    /// Double hashing inside one cache line
    CacheDbl = "cache-dbl" => CacheDbl,
    /// Multiplicative probes XORed across one cache line
    CacheMul64 = "cache-mul64" => CacheMul64,
    /// Two double-hashed bits per word inside one line
    CacheDblBlock = "cache-dbl-block" => CacheDblBlock,
    /// Two enhanced-double-hashed bits per word inside one line
    CacheEnhdblBlock = "cache-enhdbl-block" => CacheEnhdblBlock,
    /// Two multiplicative bits per word inside one line
    CacheMul64Block = "cache-mul64-block" => CacheMul64Block,
    /// Like cache-mul64-block, from 32 bits of hash
    CacheMul64BlockFrom32 = "cache-mul64-block-from32" => CacheMul64BlockFrom32,
    /// Two distinct worm64 bits per word inside one line
    CacheWorm64Block = "cache-worm64-block" => CacheWorm64Block,
    /// Like cache-worm64-block, feeding each result back into the hash
    CacheWorm64BlockXtra = "cache-worm64-block-xtra" => CacheWorm64BlockXtra,
    /// Like cache-worm64-block, with the odd bit in its own word
    CacheWorm64BlockAlt = "cache-worm64-block-alt" => CacheWorm64BlockAlt,
    /// Consecutive words, two bits each, worm64 start
    CacheWorm64Blockpair = "cache-worm64-blockpair" => CacheWorm64Blockpair,
    /// Consecutive words, two bits each, fastrange start
    CacheMul64Blockpair = "cache-mul64-blockpair" => CacheMul64Blockpair,
    /// Like cache-worm64-block, from 32 bits of hash
    CacheWorm64BlockFrom32 = "cache-worm64-block-from32" => CacheWorm64BlockFrom32,
    /// All k bits in a single 64-bit word
    CacheBlock64 = "cache-block64" => CacheBlock64,
    /// Double hashing over a power-of-two table
    DblPow2 = "dbl-pow2" => DblPow2,
    /// Double hashing with word and bit taken from different halves
    DblPow2SplitCheap = "dbl-pow2-split-cheap" => DblPow2SplitCheap,
    /// Enhanced double hashing over a power-of-two table
    EnhPow2 = "enh-pow2" => EnhPow2,
    /// Double hashing with one modulo reduction
    DblOneMod = "dbl-one-mod" => DblOneMod,
    /// Double hashing with one fastrange reduction
    DblOneFastrange32 = "dbl-one-fastrange32" => DblOneFastrange32,
    /// Double hashing on the pre-image, fastrange per probe
    DblPreimageFastrange32 = "dbl-preimage-fastrange32" => DblPreimageFastrange32,
    /// RocksDB dynamic (non-local) Bloom filter
    RocksdbDynamic = "rocksdb-dynamic" => RocksdbDynamic,
    /// RocksDB cache-local Bloom filter
    CacheRocksdbDynamic = "cache-rocksdb-dynamic" => CacheRocksdbDynamic,
    /// RocksDB cache-local Bloom filter, fastrange line selection
    CacheRocksdbDynamicFastrange = "cache-rocksdb-dynamic-fastrange" => CacheRocksdbDynamicFastrange,
    /// RocksDB cache-local Bloom filter, fastrange on the unrotated hash
    CacheRocksdbDynamicFastrange2 = "cache-rocksdb-dynamic-fastrange2" => CacheRocksdbDynamicFastrange2,
    /// Eight 32-bit lanes in a 256-bit sector, up to one bit per lane
    CacheSimdFastrange32 = "cache-simd-fastrange32" => CacheSimdFastrange32,
    /// Eight 32-bit lanes in a 256-bit sector, exactly one bit per lane
    CacheSimdFastrange32K8 = "cache-simd-fastrange32-k8" => CacheSimdFastrange32K8,
}

/// Broad grouping used in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    /// Probes anywhere in the table
    Plain,
    /// Bit-addressed probes within one cache line or window
    CacheLocal,
    /// Several bits per word within one cache line
    Blocked,
    /// Double hashing variants
    DoubleHashing,
    /// RocksDB-derived
    Rocksdb,
    /// 256-bit sector with eight lanes
    Sector,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Plain => "plain",
            Family::CacheLocal => "cache-local",
            Family::Blocked => "blocked",
            Family::DoubleHashing => "double-hashing",
            Family::Rocksdb => "rocksdb",
            Family::Sector => "sector",
        };
        f.pad(name)
    }
}

/// Parameter limits an algorithm places on a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Constraints {
    /// `m` must be a power of two no smaller than a cache line
    pub pow2: bool,
    /// Smallest k
    pub min_k: u32,
    /// Largest k, if bounded
    pub max_k: Option<u32>,
    /// The only accepted k, if specialized
    pub exact_k: Option<u32>,
}

impl Constraints {
    const ANY: Self = Self {
        pow2: false,
        min_k: 1,
        max_k: None,
        exact_k: None,
    };

    const POW2: Self = Self {
        pow2: true,
        ..Self::ANY
    };

    // At most eight words, i.e. one cache line.
    const ONE_LINE: Self = Self {
        max_k: Some(17),
        ..Self::ANY
    };
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(k) = self.exact_k {
            write!(f, "k={k}")?;
        } else {
            match self.max_k {
                Some(max) => write!(f, "k={}..={max}", self.min_k)?,
                None => write!(f, "k>={}", self.min_k)?,
            }
        }
        if self.pow2 {
            write!(f, ", m=2^n>=512")?;
        }
        Ok(())
    }
}

impl Algorithm {
    /// Look up an algorithm by its printed name.
    pub fn from_name(name: &str) -> Result<Self, SimulationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name() == name)
            .ok_or_else(|| SimulationError::UnknownAlgorithm(name.to_string()))
    }

    /// Grouping for listings.
    pub fn family(self) -> Family {
        use Algorithm as A;
        match self {
            A::Noop | A::Worm64 | A::Worm32 | A::Worm64AndRotPow2 | A::RotPow2 | A::RotPow2Alt | A::Xxhash64Pow2 => {
                Family::Plain
            }
            A::CacheWorm64 | A::CacheWorm64Xtra | A::CacheWorm64Alt | A::CacheWorm64From32 | A::LocalWorm64
            | A::LocalMul64 | A::CacheDbl | A::CacheMul64 => Family::CacheLocal,
            A::CacheDblBlock | A::CacheEnhdblBlock | A::CacheMul64Block | A::CacheMul64BlockFrom32
            | A::CacheWorm64Block | A::CacheWorm64BlockXtra | A::CacheWorm64BlockAlt
            | A::CacheWorm64Blockpair | A::CacheMul64Blockpair | A::CacheWorm64BlockFrom32
            | A::CacheBlock64 => Family::Blocked,
            A::DblPow2 | A::DblPow2SplitCheap | A::EnhPow2 | A::DblOneMod | A::DblOneFastrange32
            | A::DblPreimageFastrange32 => Family::DoubleHashing,
            A::RocksdbDynamic | A::CacheRocksdbDynamic | A::CacheRocksdbDynamicFastrange
            | A::CacheRocksdbDynamicFastrange2 => Family::Rocksdb,
            A::CacheSimdFastrange32 | A::CacheSimdFastrange32K8 => Family::Sector,
        }
    }

    /// Limits on `m` and `k`.
    pub fn constraints(self) -> Constraints {
        use Algorithm as A;
        match self {
            A::Noop => Constraints {
                min_k: 0,
                ..Constraints::ANY
            },
            A::Worm64AndRotPow2 | A::RotPow2 | A::RotPow2Alt | A::Xxhash64Pow2 | A::DblPow2
            | A::DblPow2SplitCheap | A::EnhPow2 => Constraints::POW2,
            A::CacheDblBlock | A::CacheEnhdblBlock | A::CacheMul64Block | A::CacheMul64BlockFrom32
            | A::CacheWorm64Block | A::CacheWorm64BlockXtra | A::CacheWorm64BlockFrom32 => {
                Constraints::ONE_LINE
            }
            // The odd bit gets a word of its own.
            A::CacheWorm64BlockAlt => Constraints {
                max_k: Some(16),
                ..Constraints::ANY
            },
            A::CacheWorm64Blockpair | A::CacheMul64Blockpair => Constraints {
                min_k: 2,
                ..Constraints::ONE_LINE
            },
            A::CacheSimdFastrange32 => Constraints {
                max_k: Some(8),
                ..Constraints::ANY
            },
            A::CacheSimdFastrange32K8 => Constraints {
                exact_k: Some(8),
                ..Constraints::ANY
            },
            _ => Constraints::ANY,
        }
    }

    /// Which false-positive annotations apply.
    pub fn fp_profile(self) -> FpProfile {
        use Algorithm as A;
        let line = |cache_line| FpProfile {
            cache_line: Some(cache_line),
            ..FpProfile::PLAIN
        };
        let narrow_line = |cache_line| FpProfile {
            cache_line: Some(cache_line),
            narrow_hash: true,
            ..FpProfile::PLAIN
        };
        match self {
            A::Noop | A::Worm64 | A::Worm64AndRotPow2 | A::RotPow2 | A::RotPow2Alt | A::Xxhash64Pow2
            | A::LocalWorm64 | A::LocalMul64 => FpProfile::PLAIN,
            A::Worm32 | A::RocksdbDynamic => FpProfile {
                narrow_hash: true,
                ..FpProfile::PLAIN
            },
            A::CacheWorm64 | A::CacheWorm64Xtra | A::CacheWorm64Alt | A::CacheDbl | A::CacheMul64 => {
                line(CacheLine::Fixed(512))
            }
            A::CacheWorm64From32 | A::CacheRocksdbDynamic | A::CacheRocksdbDynamicFastrange
            | A::CacheRocksdbDynamicFastrange2 => narrow_line(CacheLine::Fixed(512)),
            A::CacheDblBlock | A::CacheEnhdblBlock | A::CacheMul64Block | A::CacheWorm64Block
            | A::CacheWorm64BlockXtra => line(CacheLine::PairedWords),
            A::CacheMul64BlockFrom32 | A::CacheWorm64BlockFrom32 => narrow_line(CacheLine::PairedWords),
            A::CacheWorm64BlockAlt => line(CacheLine::PairedWordsRoundedUp),
            A::CacheWorm64Blockpair | A::CacheMul64Blockpair => line(CacheLine::ConsecutiveWords),
            A::CacheBlock64 => line(CacheLine::Fixed(64)),
            A::DblPow2 | A::DblPow2SplitCheap | A::EnhPow2 | A::DblOneMod | A::DblOneFastrange32
            | A::DblPreimageFastrange32 => FpProfile {
                two_index: true,
                ..FpProfile::PLAIN
            },
            A::CacheSimdFastrange32 | A::CacheSimdFastrange32K8 => narrow_line(CacheLine::Fixed(256)),
        }
    }

    /// Verify the geometry satisfies this algorithm's constraints.
    pub fn check(self, geometry: &Geometry) -> Result<(), SimulationError> {
        let c = self.constraints();
        let k = geometry.k;
        if c.pow2 && (!geometry.is_pow2() || geometry.m < 512) {
            return Err(SimulationError::RequiresPowerOfTwo {
                algorithm: self.name(),
                bits: geometry.m,
                min: 512,
            });
        }
        if let Some(required) = c.exact_k {
            if k != required {
                return Err(SimulationError::WrongProbeCount {
                    algorithm: self.name(),
                    k,
                    required,
                });
            }
        }
        if k < c.min_k {
            return Err(SimulationError::TooFewProbes {
                algorithm: self.name(),
                k,
                min: c.min_k,
            });
        }
        if let Some(max) = c.max_k {
            if k > max {
                return Err(SimulationError::TooManyProbes {
                    algorithm: self.name(),
                    k,
                    max,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
