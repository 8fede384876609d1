//! Traits (ports) implemented by the infrastructure crates

mod repositories;

pub use repositories::{
    AdQuery, AdRepository, ChangePublisher, DocumentRepository, MarkerRepository,
    MomentRepository, NotificationRepository, RepoResult,
};
