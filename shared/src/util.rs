/// Short order reference printed on tickets (first 8 chars of the order id)
pub fn short_ref(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
