//! Sponsored entries spliced into an organic feed

use crate::entities::Document;

/// Default slot of the sponsored entry in a rendered feed
pub const DEFAULT_SPONSORED_POSITION: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEntry {
    Organic(Document),
    Sponsored(Document),
}

impl FeedEntry {
    pub fn document(&self) -> &Document {
        match self {
            Self::Organic(doc) | Self::Sponsored(doc) => doc,
        }
    }

    #[inline]
    pub fn is_sponsored(&self) -> bool {
        matches!(self, Self::Sponsored(_))
    }
}

/// Insert sponsored documents at `position` of the organic list.
///
/// Nothing is spliced when the organic list is shorter than `position`, so a
/// sparse feed never opens with an ad.
pub fn splice_sponsored(
    organic: &[Document],
    sponsored: &[Document],
    position: usize,
) -> Vec<FeedEntry> {
    let mut entries: Vec<FeedEntry> = organic.iter().cloned().map(FeedEntry::Organic).collect();
    if organic.len() >= position && !sponsored.is_empty() {
        let ads = sponsored.iter().cloned().map(FeedEntry::Sponsored);
        entries.splice(position..position, ads);
    }
    entries
}

/// Last organic document, the cursor anchor for the next page
pub fn last_organic(entries: &[FeedEntry]) -> Option<&Document> {
    entries.iter().rev().find_map(|e| match e {
        FeedEntry::Organic(doc) => Some(doc),
        FeedEntry::Sponsored(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::DocId;
    use chrono::Utc;
    use serde_json::Map;

    fn docs(prefix: &str, n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| {
                Document::with_id(
                    DocId::parse(&format!("{prefix}{i}")).unwrap(),
                    "posts",
                    None,
                    Map::new(),
                    Utc::now(),
                )
            })
            .collect()
    }

    #[test]
    fn test_splices_at_position() {
        let entries = splice_sponsored(&docs("p", 5), &docs("s", 1), 3);
        assert_eq!(entries.len(), 6);
        assert!(entries[3].is_sponsored());
        assert_eq!(entries.iter().filter(|e| e.is_sponsored()).count(), 1);
        assert_eq!(last_organic(&entries).unwrap().id.as_str(), "p4");
    }

    #[test]
    fn test_short_feed_has_no_sponsored() {
        let entries = splice_sponsored(&docs("p", 2), &docs("s", 1), 3);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.is_sponsored()));
    }

    #[test]
    fn test_sponsored_at_tail_does_not_move_cursor() {
        let entries = splice_sponsored(&docs("p", 3), &docs("s", 1), 3);
        assert!(entries[3].is_sponsored());
        assert_eq!(last_organic(&entries).unwrap().id.as_str(), "p2");
    }
}
