use tracing::{debug, info, warn};

use crate::error::{Field, MigrateError};
use crate::format::OverflowPolicy;
use crate::mapblock;
use crate::store::{Record, RowStore};
use crate::transcode::{Transcoded, Transcoder};

/// Everything a migration run does to each record.
#[derive(Debug)]
pub struct MigrationPlan {
    /// Codec pair for the `content` field.
    pub content: Transcoder,
    /// Codec pair for the `metadata` field. Never layout-migrated.
    pub metadata: Transcoder,
    /// `Some` enables the mapblock layout migration on decoded content.
    pub layout: Option<OverflowPolicy>,
    /// Re-decode every output and compare digests before writing.
    pub verify: bool,
    /// Leave rows whose content lacks the source format's header untouched.
    pub skip_converted: bool,
    /// Convert everything, write nothing.
    pub dry_run: bool,
}

impl MigrationPlan {
    /// Plain recompression of both fields, no layout change.
    pub fn recompress(content: Transcoder, metadata: Transcoder) -> Self {
        Self {
            content,
            metadata,
            layout: None,
            verify: false,
            skip_converted: false,
            dry_run: false,
        }
    }
}

/// Result of converting one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Converted { content: Vec<u8>, metadata: Vec<u8> },
    /// Content did not carry the source header; treated as already migrated.
    AlreadyConverted,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub records: usize,
    pub converted: usize,
    pub skipped: usize,
    pub content_in: u64,
    pub content_out: u64,
    pub metadata_in: u64,
    pub metadata_out: u64,
}

impl MigrationReport {
    /// Compressed size before / after, across both fields.
    pub fn ratio(&self) -> f64 {
        let after = self.content_out + self.metadata_out;
        if after == 0 {
            return 1.0;
        }
        (self.content_in + self.metadata_in) as f64 / after as f64
    }
}

fn verify(
    id: i64,
    field: Field,
    transcoder: &Transcoder,
    out: &Transcoded,
) -> Result<(), MigrateError> {
    let actual = transcoder
        .redecode_digest(&out.bytes)
        .map_err(|source| MigrateError::Codec { id, field, source })?;
    if actual != out.digest {
        return Err(MigrateError::Verify {
            id,
            field,
            expected: out.digest,
            actual,
        });
    }
    Ok(())
}

/// Convert the two blob fields of one record according to `plan`.
pub fn migrate_record(plan: &MigrationPlan, record: &Record) -> Result<Outcome, MigrateError> {
    let id = record.id;

    if plan.skip_converted && !plan.content.source().recognizes(&record.content) {
        return Ok(Outcome::AlreadyConverted);
    }

    let content = match plan.layout {
        Some(policy) => {
            let mut plain = plan
                .content
                .decode(&record.content)
                .map_err(|source| MigrateError::Codec {
                    id,
                    field: Field::Content,
                    source,
                })?;
            mapblock::migrate(&mut plain, policy)
                .map_err(|source| MigrateError::Layout { id, source })?;
            plan.content.encode(&plain)
        }
        None => plan.content.transcode(&record.content),
    }
    .map_err(|source| MigrateError::Codec {
        id,
        field: Field::Content,
        source,
    })?;

    let metadata = plan
        .metadata
        .transcode(&record.metadata)
        .map_err(|source| MigrateError::Codec {
            id,
            field: Field::Metadata,
            source,
        })?;

    if plan.verify {
        verify(id, Field::Content, &plan.content, &content)?;
        verify(id, Field::Metadata, &plan.metadata, &metadata)?;
    }

    Ok(Outcome::Converted {
        content: content.bytes,
        metadata: metadata.bytes,
    })
}

/// Sequential, fail-fast migration over a [`RowStore`].
///
/// Rows are written back one at a time with no enclosing transaction: when
/// record N fails, records before it are already written and the rest are
/// untouched.
pub struct Driver<S> {
    store: S,
    plan: MigrationPlan,
}

impl<S: RowStore> Driver<S> {
    pub fn new(store: S, plan: MigrationPlan) -> Self {
        Self { store, plan }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Convert and write back every record. Stops at the first error.
    pub fn run(&mut self) -> Result<MigrationReport, MigrateError> {
        let records = self.store.load_all()?;
        info!(
            count = records.len(),
            content = ?self.plan.content,
            metadata = ?self.plan.metadata,
            layout = ?self.plan.layout,
            dry_run = self.plan.dry_run,
            "found records"
        );

        let mut report = MigrationReport {
            records: records.len(),
            ..MigrationReport::default()
        };

        for record in &records {
            debug!(id = record.id, "converting record");
            match migrate_record(&self.plan, record)? {
                Outcome::AlreadyConverted => {
                    warn!(id = record.id, "content not in source format, skipping");
                    report.skipped += 1;
                }
                Outcome::Converted { content, metadata } => {
                    if !self.plan.dry_run {
                        self.store.update(record.id, &content, &metadata)?;
                    }
                    report.converted += 1;
                    report.content_in += record.content.len() as u64;
                    report.metadata_in += record.metadata.len() as u64;
                    report.content_out += content.len() as u64;
                    report.metadata_out += metadata.len() as u64;
                }
            }
        }

        info!(
            converted = report.converted,
            skipped = report.skipped,
            ratio = %format!("{:.2}", report.ratio()),
            "migration finished"
        );
        Ok(report)
    }
}
