//! This file contains all of the logic pertaining to branch novelty feedback
//!
//! Every conditional branch the taint-tracked target executes is reported to
//! `CoverageMap::is_interesting_branch` along with its outcome. We answer
//! whether that branch, in its current path and calling context, tells the
//! driver something it hasn't seen before, in which case it's worth handing to
//! the solver.

use std::collections::HashSet;
use std::hash::Hasher;

use twox_hash::XxHash32;

use crate::err::BitmapErr;
use crate::persist;
use crate::prompt_warn;

/// This is the size of coverage map, this *has* to be a power of 2
pub const MAP_SIZE: usize = 65536;

/// Number of addressable bits in the context map
pub const CONTEXT_BITS: usize = MAP_SIZE * 8;

/// Seed used for every hash we compute, changing it invalidates every bitmap
/// already on disk
const HASH_SEED: u32 = 0;

/// Hash a branch location and outcome into an edge id
pub fn hash_pc(pc: usize, taken: bool) -> usize {
    let mut hasher = XxHash32::with_seed(HASH_SEED);
    hasher.write(&pc.to_ne_bytes());
    hasher.write(&[taken as u8]);

    hasher.finish() as usize % MAP_SIZE
}

/// Hash a pair of edge ids into a bit position in the context map
fn hash_context(prev_h: usize, h: usize) -> usize {
    let mut hasher = XxHash32::with_seed(HASH_SEED);
    hasher.write(&prev_h.to_ne_bytes());
    hasher.write(&h.to_ne_bytes());

    hasher.finish() as usize % CONTEXT_BITS
}

/// True for 0 as well, which is what we want: a count of zero is the first
/// hit and the most interesting bucket of all
#[inline]
pub fn is_power_of_two_or_zero(x: usize) -> bool {
    (x & x.wrapping_sub(1)) == 0
}

/// Allocate a zeroed, fixed size map. We'd rather hand an error back than
/// abort or limp along without a map
fn alloc_map(size: usize) -> Result<Vec<u8>, BitmapErr> {
    let mut map = Vec::new();
    map.try_reserve_exact(size).map_err(|e| {
        BitmapErr::from(&format!("Out of memory allocating {} byte map: {}", size, e))
    })?;
    map.resize(size, 0);

    Ok(map)
}

/// All of the information we need to decide whether a branch is novel. The
/// trace_map and context_map are shared with every other process using the
/// same bitmap file, the virgin_map and visited set only live as long as this
/// process does.
pub struct CoverageMap {
    path: String,              // Bitmap file, empty means in-memory only
    prev_edge: usize,          // Edge id of the last branch we were given
    trace_map: Vec<u8>,        // OR of every hit count pattern seen per index
    virgin_map: Vec<u8>,       // Raw hit counts per index for this process
    context_map: Vec<u8>,      // Bitset of (prior edge, edge) pairs seen
    visited: HashSet<usize>,   // Edge ids we've hit at least once
}

impl CoverageMap {
    /// Create a new CoverageMap, loading the shared maps from `path` if we can.
    /// A missing or short file isn't an error, we just start from nothing.
    pub fn new(path: &str) -> Result<Self, BitmapErr> {
        let mut map = CoverageMap {
            path: path.to_string(),
            prev_edge: 0,
            trace_map: alloc_map(MAP_SIZE)?,
            virgin_map: alloc_map(MAP_SIZE)?,
            context_map: alloc_map(CONTEXT_BITS / 8)?,
            visited: HashSet::new(),
        };

        if !path.is_empty() {
            map.import();
        }

        Ok(map)
    }

    /// Pull the shared maps in from disk, falling back to empty maps
    fn import(&mut self) {
        if let Err(e) = persist::import(&self.path, &mut self.trace_map, &mut self.context_map) {
            prompt_warn!("{}, using a default trace map", e);
            self.set_default();
        }
    }

    /// Forget everything in the shared maps
    fn set_default(&mut self) {
        self.trace_map.fill(0);
        self.context_map.fill(0);
    }

    /// Write the shared maps back out. Failing here only means other processes
    /// don't see our progress, our own decisions are unaffected
    fn commit(&self) {
        if self.path.is_empty() {
            return;
        }

        if let Err(e) = persist::commit(&self.path, &self.trace_map, &self.context_map) {
            prompt_warn!("Unable to commit bitmap: {}", e);
        }
    }

    /// Mix the previous edge in so that A->B and B->A land in different spots
    #[inline]
    fn get_index(&self, h: usize) -> usize {
        ((self.prev_edge >> 1) ^ h) % MAP_SIZE
    }

    /// Check whether edge `h` is being reached from a context we haven't seen.
    /// `bits` is the hit count for the edge before this hit, we only bother
    /// when that count sits on a power of two boundary.
    fn is_interesting_context(&mut self, h: usize, bits: usize) -> bool {
        if !is_power_of_two_or_zero(bits) {
            return false;
        }

        let mut interesting = false;

        // Every prior edge gets checked, don't stop at the first new bit
        for &prev_h in self.visited.iter() {
            let hash = hash_context(prev_h, h);
            let idx = hash / 8;
            let mask = 1u8 << (hash % 8);

            if self.context_map[idx] & mask == 0 {
                self.context_map[idx] |= mask;
                interesting = true;
            }
        }

        if bits == 0 {
            self.visited.insert(h);
        }

        interesting
    }

    /// Decide whether the branch at `pc` going `taken` is worth reacting to.
    /// This has to be called for every conditional branch in the order they
    /// execute, the previous edge feeds into the index of the next one.
    pub fn is_interesting_branch(&mut self, pc: usize, taken: bool) -> bool {
        let h = hash_pc(pc, taken);
        let idx = self.get_index(h);
        let new_context = self.is_interesting_context(h, self.virgin_map[idx] as usize);

        self.virgin_map[idx] = self.virgin_map[idx].wrapping_add(1);

        let ret = if (self.virgin_map[idx] | self.trace_map[idx]) != self.trace_map[idx] {
            let inv_h = hash_pc(pc, !taken);
            let inv_idx = self.get_index(inv_h);

            self.trace_map[idx] |= self.virgin_map[idx];

            // The other side of this branch is covered by the same input, so
            // mark it too, then put its hit count back the way it was
            self.virgin_map[inv_idx] = self.virgin_map[inv_idx].wrapping_add(1);
            self.trace_map[inv_idx] |= self.virgin_map[inv_idx];
            self.commit();
            self.virgin_map[inv_idx] = self.virgin_map[inv_idx].wrapping_sub(1);

            true
        } else if new_context {
            self.commit();
            true
        } else {
            false
        };

        self.prev_edge = h;
        ret
    }

    /// Walk the trace map and determine the number of indices that have ever
    /// been hit
    pub fn get_edge_count(&self) -> usize {
        self.trace_map.iter().filter(|&&b| b != 0).count()
    }

    /// Number of context bits set so far
    pub fn get_context_count(&self) -> usize {
        self.context_map
            .iter()
            .map(|b| b.count_ones() as usize)
            .sum()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn trace_map(&self) -> &[u8] {
        &self.trace_map
    }

    pub fn context_map(&self) -> &[u8] {
        &self.context_map
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }
}
