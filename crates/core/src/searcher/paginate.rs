//! Fixed-size pagination over a result set.

use super::NormalizedTorrent;

/// Parse a 1-based page number; anything missing, non-numeric or below 1
/// becomes page 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

/// Slice out page `page` (1-based). Pages past the end are empty.
pub fn paginate(results: &[NormalizedTorrent], page: u32, page_size: usize) -> Vec<NormalizedTorrent> {
    let page = page.max(1) as usize;
    let offset = (page - 1).saturating_mul(page_size);
    results
        .iter()
        .skip(offset)
        .take(page_size)
        .cloned()
        .collect()
}
