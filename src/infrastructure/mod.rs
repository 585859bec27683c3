pub mod csv_provider;
pub mod json_lines;
pub mod mock;
pub mod observability;

pub use csv_provider::CsvPriceHistoryProvider;
pub use json_lines::JsonLinesPublisher;
pub use mock::{InMemoryPriceHistoryProvider, MockResultPublisher};
