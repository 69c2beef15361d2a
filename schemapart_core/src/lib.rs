pub mod codec;
pub mod driver;
pub mod error;
pub mod format;
pub mod mapblock;
pub mod store;
pub mod transcode;

pub use codec::Codec;
pub use driver::{migrate_record, Driver, MigrationPlan, MigrationReport, Outcome};
pub use error::{CodecError, Field, LayoutError, MigrateError, StoreError};
pub use format::{Format, LegacyFormat, OverflowPolicy, TargetFormat};
pub use mapblock::LayoutSummary;
pub use store::{MemoryStore, Record, RowStore};
pub use transcode::{Transcoded, Transcoder};
