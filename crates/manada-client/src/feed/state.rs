use manada_core::FeedEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Loading,
    Ready,
    Failed(String),
}

/// What a feed subscriber renders
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub status: FeedStatus,
    pub entries: Vec<FeedEntry>,
    /// The last page came back short; `load_more` issues no more requests
    pub end_of_data: bool,
    pub pages_loaded: usize,
}

impl FeedState {
    pub fn loading() -> Self {
        Self {
            status: FeedStatus::Loading,
            entries: Vec::new(),
            end_of_data: false,
            pages_loaded: 0,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.status == FeedStatus::Ready
    }

    /// Organic entries only
    pub fn organic_len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_sponsored()).count()
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::loading()
    }
}
