// Fragment match finder.
//
// The core Snappy string-matching loop for one fragment of at most 64 KiB:
//   1. Hash the 4-byte window at the scan position and swap it into the
//      table, getting back the previous position with the same hash
//   2. Verify the candidate byte-for-byte; on a miss, step forward by
//      `skip >> 5` (skip grows by one per miss)
//   3. On a hit, emit the pending literal, extend the match forward and
//      emit it as copies
//   4. Re-probe right after the copy before going back to scanning
//
// Elements are written straight into the output buffer; no intermediate
// token list is built.

use super::config::{INPUT_MARGIN, MIN_MATCH, SKIP_SHIFT, SKIP_START};
use super::table::HashTable;
use super::word::{hash_word, load_u32_le, words_equal};
use crate::format::tag::{emit_copy, emit_literal};

/// Whether `candidate` holds a usable earlier occurrence of the window at `ip`.
#[inline(always)]
fn is_match(input: &[u8], ip: usize, candidate: usize) -> bool {
    candidate < ip && words_equal(input, ip, candidate)
}

/// Compress one fragment into `out[op..]` and return the new output position.
///
/// `table` must be zeroed and sized for the fragment.  `out` must have room
/// for the worst case, `max_compressed_len(input.len())` minus the header.
pub fn compress_fragment(input: &[u8], out: &mut [u8], mut op: usize, table: &mut HashTable) -> usize {
    let len = input.len();
    let bits = table.bits();
    let mut next_emit = 0usize;

    if len >= INPUT_MARGIN {
        let ip_limit = len - INPUT_MARGIN;
        let mut ip = 1usize;
        let mut next_hash = hash_word(load_u32_le(input, ip), bits);

        'fragment: loop {
            let mut skip = SKIP_START;
            let mut next_ip = ip;
            let mut candidate;
            loop {
                ip = next_ip;
                let hash = next_hash;
                let step = (skip >> SKIP_SHIFT) as usize;
                skip += 1;
                next_ip = ip + step;
                if next_ip > ip_limit {
                    break 'fragment;
                }
                next_hash = hash_word(load_u32_le(input, next_ip), bits);
                candidate = table.replace(hash, ip);
                if is_match(input, ip, candidate) {
                    break;
                }
            }

            op = emit_literal(out, op, &input[next_emit..ip]);

            loop {
                let base = ip;
                let mut matched = MIN_MATCH;
                while ip + matched < len && input[ip + matched] == input[candidate + matched] {
                    matched += 1;
                }
                ip += matched;
                op = emit_copy(out, op, base - candidate, matched);
                next_emit = ip;
                if ip >= ip_limit {
                    break 'fragment;
                }

                table.insert(hash_word(load_u32_le(input, ip - 1), bits), ip - 1);
                candidate = table.replace(hash_word(load_u32_le(input, ip), bits), ip);
                if !is_match(input, ip, candidate) {
                    break;
                }
            }

            ip += 1;
            next_hash = hash_word(load_u32_le(input, ip), bits);
        }
    }

    if next_emit < len {
        op = emit_literal(out, op, &input[next_emit..]);
    }
    op
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
