use super::hash::{Hash, digest};

/// Hash of the concatenation of two child hashes.
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut bytes = Vec::with_capacity(left.0.len() * 2);
    bytes.extend_from_slice(left.as_bytes());
    bytes.extend_from_slice(right.as_bytes());
    digest(bytes)
}

/// Fold an ordered list of leaf hashes into a single Merkle root.
///
/// Adjacent hashes are paired left to right; an unpaired trailing hash is
/// paired with itself. At least one level is always built, so a lone leaf
/// is hashed with itself. Returns `None` for an empty input, so callers must
/// pick their own sentinel for payload-free blocks.
pub fn merkle_root(leaves: &[Hash]) -> Option<Hash> {
    if leaves.is_empty() {
        return None;
    }

    let mut level = leaves.to_vec();
    loop {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                [single] => hash_pair(single, single),
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
        if level.len() == 1 {
            return level.pop();
        }
    }
}
