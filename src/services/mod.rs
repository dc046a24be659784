pub mod listing_source;
pub mod oracle;
pub mod record_extractor;
pub mod selection_decoder;

pub use listing_source::{
    listing_source_from_config, BrowserListingSource, HttpListingSource, ListingSource,
};
pub use oracle::{OpenAiOracle, OracleConfig, ScoringOracle};
pub use record_extractor::{MarkupEvent, RecordExtractor};
pub use selection_decoder::{decode, decode_for_group};
