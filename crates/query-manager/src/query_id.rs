//! Stable identifiers for exported operations.
//!
//! An operation and each of its fragments are hashed separately. The combined id takes
//! an equal share of characters from every hash: the operation hash always comes first,
//! the fragment hashes follow in lexicographic order so the order fragments were listed
//! in does not matter. Persisted query files on disk are named after this id, so the
//! ordering rule must not change.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the text.
pub fn content_hash(text: &str) -> String {
    let digest = <Sha256 as Digest>::digest(text.as_bytes());
    hex::encode(digest)
}

/// Combines an operation hash followed by its fragment hashes into one id.
///
/// Every hash contributes its first `len(first) / count` characters. Returns `None`
/// for an empty list.
pub fn combine_query_id<S: AsRef<str>>(hashes: &[S]) -> Option<String> {
    let (first, rest) = hashes.split_first()?;

    Some(combine(first.as_ref(), rest.iter().map(AsRef::as_ref)))
}

pub(crate) fn combine<'a>(first: &str, rest: impl IntoIterator<Item = &'a str>) -> String {
    let mut rest = rest.into_iter().collect::<Vec<_>>();
    rest.sort_unstable();

    let chunk_len = first.len() / (rest.len() + 1);
    let mut id = String::with_capacity(chunk_len * (rest.len() + 1));

    id.push_str(chunk(first, chunk_len));
    for hash in rest {
        id.push_str(chunk(hash, chunk_len));
    }

    id
}

fn chunk(hash: &str, len: usize) -> &str {
    hash.get(..len).unwrap_or(hash)
}
