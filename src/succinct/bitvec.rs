//! Static bit vector with rank/select support.
//!
//! The directory follows the Rank9 scheme:
//! - one absolute rank per 512-bit block (ones before the block)
//! - one packed word per block holding seven 9-bit cumulative counts, one for
//!   each 64-bit word boundary inside the block
//! - sampled block indices for every 512th set bit and every 512th unset bit,
//!   which bound the binary search performed by `select1`/`select0`
//!
//! The directory is computed once in [`BitVector::new`] and never updated.

const WORD_BITS: usize = 64;
const WORDS_PER_BLOCK: usize = 8;
const BLOCK_BITS: usize = WORD_BITS * WORDS_PER_BLOCK;
const SELECT_SAMPLE: usize = 512;
const SUB_RANK_MASK: u64 = 0x1FF;

/// Append-only bit sink used while a trie is being encoded.
#[derive(Debug, Default)]
pub struct BitVecBuilder {
    words: Vec<u64>,
    len: usize,
}

impl BitVecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS)),
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        let word = self.len / WORD_BITS;
        if word == self.words.len() {
            self.words.push(0);
        }
        if bit {
            self.words[word] |= 1u64 << (self.len % WORD_BITS);
        }
        self.len += 1;
    }

    pub fn finish(self) -> BitVector {
        BitVector::new(self.words, self.len)
    }
}

/// Immutable bit vector answering `rank` and `select` queries.
pub struct BitVector {
    words: Vec<u64>,
    block_ranks: Vec<u64>,
    sub_ranks: Vec<u64>,
    select1_samples: Vec<u32>,
    select0_samples: Vec<u32>,
    len: usize,
    ones: usize,
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVector")
            .field("len", &self.len)
            .field("ones", &self.ones)
            .finish()
    }
}

impl BitVector {
    /// Build a bit vector over the first `len` bits of `words` (LSB first).
    pub fn new(mut words: Vec<u64>, len: usize) -> Self {
        let num_blocks = len.div_ceil(BLOCK_BITS);
        words.resize(num_blocks * WORDS_PER_BLOCK, 0);
        if len % WORD_BITS != 0 {
            words[len / WORD_BITS] &= (1u64 << (len % WORD_BITS)) - 1;
        }
        for word in &mut words[len.div_ceil(WORD_BITS)..] {
            *word = 0;
        }

        let mut block_ranks = Vec::with_capacity(num_blocks);
        let mut sub_ranks = Vec::with_capacity(num_blocks);
        let mut select1_samples = Vec::new();
        let mut select0_samples = Vec::new();
        let mut next_one_sample = 0usize;
        let mut next_zero_sample = 0usize;
        let mut ones = 0usize;

        for block in 0..num_blocks {
            block_ranks.push(ones as u64);
            let zeros_before = block * BLOCK_BITS - ones;

            let mut packed = 0u64;
            let mut in_block = 0u64;
            for j in 0..WORDS_PER_BLOCK {
                if j > 0 {
                    packed |= in_block << (9 * (j - 1));
                }
                in_block += words[block * WORDS_PER_BLOCK + j].count_ones() as u64;
            }
            sub_ranks.push(packed);

            let block_ones = in_block as usize;
            let block_bits = BLOCK_BITS.min(len - block * BLOCK_BITS);
            let block_zeros = block_bits - block_ones;

            while next_one_sample < ones + block_ones {
                select1_samples.push(block as u32);
                next_one_sample += SELECT_SAMPLE;
            }
            while next_zero_sample < zeros_before + block_zeros {
                select0_samples.push(block as u32);
                next_zero_sample += SELECT_SAMPLE;
            }

            ones += block_ones;
        }

        Self {
            words,
            block_ranks,
            sub_ranks,
            select1_samples,
            select0_samples,
            len,
            ones,
        }
    }

    /// Total number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Number of unset bits.
    pub fn count_zeros(&self) -> usize {
        self.len - self.ones
    }

    /// Approximate heap usage of the bits plus the directory, in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.words.capacity() * 8
            + self.block_ranks.capacity() * 8
            + self.sub_ranks.capacity() * 8
            + self.select1_samples.capacity() * 4
            + self.select0_samples.capacity() * 4
    }

    /// Return true if bit `i` is set. Out-of-range positions read as unset.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    #[inline]
    fn sub_rank(&self, block: usize, word_in_block: usize) -> usize {
        if word_in_block == 0 {
            return 0;
        }
        ((self.sub_ranks[block] >> (9 * (word_in_block - 1))) & SUB_RANK_MASK) as usize
    }

    /// Number of set bits in `[0, i)`.
    pub fn rank1(&self, i: usize) -> usize {
        let i = i.min(self.len);
        let block = i / BLOCK_BITS;
        if block == self.block_ranks.len() {
            return self.ones;
        }
        let word_in_block = (i % BLOCK_BITS) / WORD_BITS;
        let word = self.words[block * WORDS_PER_BLOCK + word_in_block];
        let mask = (1u64 << (i % WORD_BITS)) - 1;
        self.block_ranks[block] as usize
            + self.sub_rank(block, word_in_block)
            + (word & mask).count_ones() as usize
    }

    /// Number of unset bits in `[0, i)`.
    pub fn rank0(&self, i: usize) -> usize {
        i.min(self.len) - self.rank1(i)
    }

    /// Position of the `k`-th set bit (0-indexed).
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones {
            return None;
        }
        let block = self.find_block(&self.select1_samples, k, |b| {
            self.block_ranks[b] as usize
        });
        let mut remaining = k - self.block_ranks[block] as usize;

        let mut word_in_block = 0;
        for j in 1..WORDS_PER_BLOCK {
            if self.sub_rank(block, j) <= remaining {
                word_in_block = j;
            } else {
                break;
            }
        }
        remaining -= self.sub_rank(block, word_in_block);

        let word = self.words[block * WORDS_PER_BLOCK + word_in_block];
        Some(block * BLOCK_BITS + word_in_block * WORD_BITS + select_in_word(word, remaining))
    }

    /// Position of the `k`-th unset bit (0-indexed).
    pub fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.count_zeros() {
            return None;
        }
        let block = self.find_block(&self.select0_samples, k, |b| {
            b * BLOCK_BITS - self.block_ranks[b] as usize
        });
        let mut remaining = k - (block * BLOCK_BITS - self.block_ranks[block] as usize);

        let zeros_before_word = |j: usize| j * WORD_BITS - self.sub_rank(block, j);
        let mut word_in_block = 0;
        for j in 1..WORDS_PER_BLOCK {
            if zeros_before_word(j) <= remaining {
                word_in_block = j;
            } else {
                break;
            }
        }
        remaining -= zeros_before_word(word_in_block);

        let word = !self.words[block * WORDS_PER_BLOCK + word_in_block];
        Some(block * BLOCK_BITS + word_in_block * WORD_BITS + select_in_word(word, remaining))
    }

    /// Last block whose leading count (per `count_before`) is `<= k`, searched
    /// within the range bounded by the select samples.
    fn find_block(&self, samples: &[u32], k: usize, count_before: impl Fn(usize) -> usize) -> usize {
        let sample = k / SELECT_SAMPLE;
        let mut lo = samples[sample] as usize;
        let mut hi = samples
            .get(sample + 1)
            .map(|&b| b as usize + 1)
            .unwrap_or(self.block_ranks.len());

        // Invariant: count_before(lo) <= k.
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if count_before(mid) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

/// Position of the `k`-th set bit inside `word`. Caller guarantees it exists.
#[inline]
fn select_in_word(mut word: u64, k: usize) -> usize {
    for _ in 0..k {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}
