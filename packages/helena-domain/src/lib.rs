pub mod describe;
pub mod listing;
pub mod preference;
pub mod query;
pub mod viewed;

pub use describe::PartialRecordError;
pub use listing::ListingRecord;
pub use preference::PreferenceRecord;
pub use query::ListingQuery;
pub use viewed::ViewedListingSet;
