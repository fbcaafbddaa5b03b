pub mod config;
pub mod error;
pub mod summary;
pub mod types;

pub use config::Config;
pub use error::{ConnectorError, ConnectorErrorKind};
pub use summary::{CollectorSummary, NotifierSummary, ProcessorSummary};
pub use types::{
    FetchBatch, Filter, Listing, ListingCandidate, ListingDraft, MonitoredCity, NewListing,
    NotificationSent, PricePeriod, RawListing, RunStatus, Source, SourceState, User, WorkerState,
};
