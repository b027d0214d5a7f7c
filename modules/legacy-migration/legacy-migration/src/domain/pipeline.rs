//! The per-entity migration loop.

use std::sync::Arc;

use legacy_migration_sdk::{
    EntityKind, LegacyId, LegacyRow, MigrationError, MigrationReport, NaturalKey, NewId, RowError,
    StorageError, TargetRecord, TargetValue, Tenant, TenantSelector, UpsertKey, UpsertRequest,
};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::ports::{BlobStore, DestinationStore, LegacySource};
use crate::domain::resolver::FkResolver;
use crate::domain::rules::{MappingRule, RowContext, rule_for};
use crate::domain::tenant_resolver::resolve_tenant;

/// Settings of one pipeline instance, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Cache positive foreign-key resolutions for the lifetime of the pipeline.
    pub cache_resolutions: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_resolutions: true,
        }
    }
}

/// Receives one notification per processed row, in order.
pub trait ProgressSink: Send + Sync {
    fn imported(&self, legacy_id: LegacyId, new_id: NewId);
    fn skipped(&self, legacy_id: LegacyId, reason: &str);
}

/// Discards progress notifications.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn imported(&self, _legacy_id: LegacyId, _new_id: NewId) {}
    fn skipped(&self, _legacy_id: LegacyId, _reason: &str) {}
}

/// Migrates legacy rows of one entity kind into one tenant.
///
/// Rows are processed strictly one after another: a row may reference a row
/// written earlier in the same run.
pub struct MigrationPipeline {
    store: Arc<dyn DestinationStore>,
    source: Arc<dyn LegacySource>,
    blobs: Option<Arc<dyn BlobStore>>,
    resolver: FkResolver,
    progress: Arc<dyn ProgressSink>,
}

impl MigrationPipeline {
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn DestinationStore>,
        source: Arc<dyn LegacySource>,
        blobs: Option<Arc<dyn BlobStore>>,
    ) -> Self {
        Self {
            resolver: FkResolver::new(store.clone(), config.cache_resolutions),
            store,
            source,
            blobs,
            progress: Arc::new(NoProgress),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Resolve the tenant, read every legacy row of `kind` and migrate them.
    ///
    /// # Errors
    /// `TenantNotFound` before any row is read; storage failures abort the
    /// run. Row-level failures are reported, not returned.
    #[instrument(skip(self), fields(selector = %selector, kind = %kind))]
    pub async fn run(
        &self,
        selector: &TenantSelector,
        kind: EntityKind,
    ) -> Result<MigrationReport, MigrationError> {
        let tenant = resolve_tenant(self.store.as_ref(), selector).await?;
        let rule = rule_for(kind);
        let rows = self
            .source
            .fetch_all(&rule.legacy_table(), Some(&tenant))
            .await?;
        info!(rows = rows.len(), tenant_id = %tenant.id, "legacy rows loaded");
        self.migrate(&tenant, rule.as_ref(), &rows).await
    }

    /// Migrate `rows` in the order given.
    ///
    /// # Errors
    /// A `MigrationError::StorageAtRow` naming the row being processed when
    /// the destination failed.
    #[instrument(skip_all, fields(tenant_id = %tenant.id, kind = %rule.kind()))]
    pub async fn migrate(
        &self,
        tenant: &Tenant,
        rule: &dyn MappingRule,
        rows: &[LegacyRow],
    ) -> Result<MigrationReport, MigrationError> {
        let kind = rule.kind();
        let mut report = MigrationReport::new(kind, tenant.id);

        for row in rows {
            let legacy_id = row.id();
            let mut ctx = RowContext::new(
                tenant,
                &self.resolver,
                self.store.as_ref(),
                self.blobs.as_deref(),
                legacy_id,
            );
            let mapped = rule.map(&mut ctx, row).await;
            let degraded = ctx.into_degraded();

            let record = match mapped {
                Ok(record) => record,
                Err(RowError::Fatal(source)) => {
                    error!(%legacy_id, error = %source, "storage failure, aborting run");
                    return Err(MigrationError::StorageAtRow { legacy_id, source });
                }
                Err(e) => {
                    self.skip(&mut report, legacy_id, e.to_string());
                    continue;
                }
            };

            let key = upsert_key(rule, legacy_id, &record);
            let new_id = match self
                .store
                .upsert(tenant.id, UpsertRequest::new(kind, key, record))
                .await
            {
                Ok(new_id) => new_id,
                Err(e @ StorageError::KeyClaimed { .. }) => {
                    self.skip(&mut report, legacy_id, e.to_string());
                    continue;
                }
                Err(source) => {
                    error!(%legacy_id, error = %source, "upsert failed, aborting run");
                    return Err(MigrationError::StorageAtRow { legacy_id, source });
                }
            };
            self.resolver.remember(tenant.id, kind, legacy_id, new_id);

            debug!(%legacy_id, %new_id, "row imported");
            self.progress.imported(legacy_id, new_id);
            report.degraded.extend(degraded);
            report.record_imported();
        }

        info!(
            processed = report.processed,
            imported = report.imported,
            skipped = report.skipped.len(),
            degraded = report.degraded.len(),
            "migration finished"
        );
        Ok(report)
    }

    fn skip(&self, report: &mut MigrationReport, legacy_id: LegacyId, reason: String) {
        warn!(%legacy_id, %reason, "row skipped");
        self.progress.skipped(legacy_id, &reason);
        report.record_skipped(legacy_id, reason);
    }
}

/// The legacy id always keys the row; kinds with a natural key add it as the
/// second axis when the record carries a value for it.
fn upsert_key(rule: &dyn MappingRule, legacy_id: LegacyId, record: &TargetRecord) -> UpsertKey {
    let natural = rule.natural_key_column().and_then(|column| {
        record
            .get(column)
            .and_then(TargetValue::as_text)
            .map(|value| NaturalKey::new(column, value))
    });
    match natural {
        Some(natural) => UpsertKey::Both { legacy_id, natural },
        None => UpsertKey::Legacy(legacy_id),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::domain::rules::states::WorkOrderState;
    use crate::domain::test_support::{MemorySource, MemoryStore, row};
    use legacy_migration_sdk::LegacyValue;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    fn legacy(n: i64) -> LegacyId {
        LegacyId::try_from(n).unwrap()
    }

    #[derive(Default)]
    struct Lines(Mutex<Vec<String>>);

    impl ProgressSink for Lines {
        fn imported(&self, legacy_id: LegacyId, _new_id: NewId) {
            self.0.lock().unwrap().push(format!("imported #{legacy_id}"));
        }

        fn skipped(&self, legacy_id: LegacyId, _reason: &str) {
            self.0.lock().unwrap().push(format!("skipped #{legacy_id}"));
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        source: Arc<MemorySource>,
        tenant: Tenant,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::default());
            let tenant = store.add_tenant("london", 2);
            Self {
                store,
                source: Arc::new(MemorySource::default()),
                tenant,
            }
        }

        fn pipeline(&self, cache_resolutions: bool) -> MigrationPipeline {
            MigrationPipeline::new(
                PipelineConfig { cache_resolutions },
                self.store.clone(),
                self.source.clone(),
                None,
            )
        }

        fn selector(&self) -> TenantSelector {
            TenantSelector::SchemaName(self.tenant.schema_name.clone())
        }
    }

    #[tokio::test]
    async fn ownerless_associate_is_idempotent() {
        let fx = Fixture::new();
        fx.source.put(
            EntityKind::Associate.legacy_table(),
            vec![
                row(42)
                    .with("owner_id", LegacyValue::Null)
                    .with("email", "a@b.com")
                    .with("given_name", "Ada")
                    .with("last_name", "Lovelace"),
            ],
        );

        let first = fx.pipeline(true).run(&fx.selector(), EntityKind::Associate).await.unwrap();
        assert_eq!(first.imported, 1);
        let associate = fx.store.row(fx.tenant.id, EntityKind::Associate, 42).unwrap();
        let users = fx.store.rows(fx.tenant.id, EntityKind::User);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].record.get("email").and_then(TargetValue::as_text), Some("a@b.com"));
        assert_eq!(associate.record.get("user_id").and_then(TargetValue::as_id), Some(users[0].id));

        let second = fx.pipeline(true).run(&fx.selector(), EntityKind::Associate).await.unwrap();
        assert_eq!(second.imported, 1);
        assert_eq!(fx.store.rows(fx.tenant.id, EntityKind::Associate).len(), 1);
        assert_eq!(fx.store.rows(fx.tenant.id, EntityKind::User).len(), 1);
        assert_eq!(
            fx.store.row(fx.tenant.id, EntityKind::Associate, 42).unwrap().id,
            associate.id
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn task_item_with_unmigrated_job_is_skipped() {
        let fx = Fixture::new();
        fx.source.put(
            EntityKind::TaskItem.legacy_table(),
            vec![row(900).with("job_id", 7_i64).with("title", "Call customer")],
        );
        let lines = Arc::new(Lines::default());

        let report = fx
            .pipeline(true)
            .with_progress(lines.clone())
            .run(&fx.selector(), EntityKind::TaskItem)
            .await
            .unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped_ids(), vec![legacy(900)]);
        assert!(report.skipped[0].reason.contains("job_id"));
        assert!(fx.store.rows(fx.tenant.id, EntityKind::TaskItem).is_empty());
        assert_eq!(*lines.0.lock().unwrap(), vec!["skipped #900".to_owned()]);
        assert!(logs_contain("row skipped"));
    }

    #[tokio::test]
    async fn work_order_states_and_self_reference() {
        let fx = Fixture::new();
        fx.store
            .insert_mapping(fx.tenant.id, EntityKind::Customer, legacy(11), NewId::generate());
        fx.source.put(
            EntityKind::WorkOrder.legacy_table(),
            vec![
                row(2)
                    .with("customer_id", 11_i64)
                    .with("state", "accepted")
                    .with("cloned_from_id", 1_i64),
                row(1).with("customer_id", 11_i64).with("state", "terminated"),
            ],
        );

        let report = fx.pipeline(true).run(&fx.selector(), EntityKind::WorkOrder).await.unwrap();
        assert_eq!(report.imported, 2);
        assert!(report.degraded.is_empty());

        let state = |id| {
            fx.store
                .row(fx.tenant.id, EntityKind::WorkOrder, id)
                .unwrap()
                .record
                .get("state")
                .and_then(TargetValue::as_int)
        };
        assert_eq!(state(1), Some(WorkOrderState::Terminated.code()));
        assert_eq!(state(2), Some(WorkOrderState::Pending.code()));

        let original = fx.store.row(fx.tenant.id, EntityKind::WorkOrder, 1).unwrap();
        let clone = fx.store.row(fx.tenant.id, EntityKind::WorkOrder, 2).unwrap();
        assert_eq!(clone.record.get("cloned_from_id").and_then(TargetValue::as_id), Some(original.id));
    }

    #[tokio::test]
    async fn unknown_tenant_touches_nothing() {
        let fx = Fixture::new();
        fx.source.put(EntityKind::Tag.legacy_table(), vec![row(1).with("text", "VIP")]);

        let err = fx
            .pipeline(true)
            .run(&TenantSelector::SchemaName("paris".to_owned()), EntityKind::Tag)
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::TenantNotFound { .. }));
        assert!(fx.store.rows(fx.tenant.id, EntityKind::Tag).is_empty());
    }

    #[tokio::test]
    async fn destination_failure_aborts_with_the_row_id() {
        let fx = Fixture::new();
        fx.source.put(
            EntityKind::Tag.legacy_table(),
            vec![row(1).with("text", "VIP"), row(2).with("text", "Seniors")],
        );
        fx.store.break_writes();

        let err = fx.pipeline(true).run(&fx.selector(), EntityKind::Tag).await.unwrap_err();
        assert_eq!(err.legacy_id(), Some(legacy(1)));
        assert!(matches!(
            err,
            MigrationError::StorageAtRow { source: StorageError::Unavailable(_), .. }
        ));
    }

    #[tokio::test]
    async fn optional_reference_degrades_without_skipping() {
        let fx = Fixture::new();
        fx.source.put(
            EntityKind::Comment.legacy_table(),
            vec![row(5).with("text", "Left a voicemail").with("created_by_id", 99_i64)],
        );

        let report = fx.pipeline(true).run(&fx.selector(), EntityKind::Comment).await.unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.degraded.len(), 1);
        assert_eq!(report.degraded[0].missing, legacy(99));
        let comment = fx.store.row(fx.tenant.id, EntityKind::Comment, 5).unwrap();
        assert_eq!(comment.record.get("created_by_id").and_then(TargetValue::as_id), None);
    }

    #[tokio::test]
    async fn cache_saves_repeated_lookups() {
        let fx = Fixture::new();
        fx.store
            .insert_mapping(fx.tenant.id, EntityKind::Tag, legacy(4), NewId::generate());
        fx.store
            .insert_mapping(fx.tenant.id, EntityKind::Customer, legacy(11), NewId::generate());
        let links: Vec<_> = (1..=5)
            .map(|id| row(id).with("customer_id", 11_i64).with("tag_id", 4_i64))
            .collect();
        fx.source.put(EntityKind::CustomerTag.legacy_table(), links);

        let before = fx.store.lookups();
        fx.pipeline(false).run(&fx.selector(), EntityKind::CustomerTag).await.unwrap();
        let uncached = fx.store.lookups() - before;

        let before = fx.store.lookups();
        fx.pipeline(true).run(&fx.selector(), EntityKind::CustomerTag).await.unwrap();
        let cached = fx.store.lookups() - before;

        assert_eq!(uncached, 10);
        assert_eq!(cached, 2);
    }

    #[tokio::test]
    #[traced_test]
    async fn email_of_another_legacy_user_skips_the_row() {
        let fx = Fixture::new();
        fx.source.put(
            EntityKind::User.legacy_table(),
            vec![
                row(1).with("email", "Ada@x.ca").with("first_name", "Ada"),
                row(2).with("email", "ada@x.ca").with("first_name", "Ada L."),
            ],
        );

        let first = fx.pipeline(true).run(&fx.selector(), EntityKind::User).await.unwrap();
        assert_eq!(first.imported, 1);
        assert_eq!(first.skipped_ids(), vec![legacy(2)]);
        assert!(first.skipped[0].reason.contains("legacy id #1"), "{}", first.skipped[0].reason);
        assert!(logs_contain("row skipped"));
        let owner = fx.store.row(fx.tenant.id, EntityKind::User, 1).unwrap();

        let second = fx.pipeline(true).run(&fx.selector(), EntityKind::User).await.unwrap();
        assert_eq!(second.skipped_ids(), vec![legacy(2)]);
        let users = fx.store.rows(fx.tenant.id, EntityKind::User);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, owner.id);
        assert_eq!(users[0].old_id, Some(legacy(1)));
    }

    #[tokio::test]
    async fn users_match_on_email_before_legacy_id_exists() {
        let fx = Fixture::new();
        fx.source.put(
            EntityKind::User.legacy_table(),
            vec![row(3).with("email", "ops@workery.ca").with("first_name", "Ops")],
        );
        // An account derived earlier for a party, without a legacy id.
        fx.store
            .upsert(
                fx.tenant.id,
                UpsertRequest::new(
                    EntityKind::User,
                    UpsertKey::Natural(NaturalKey::new("email", "ops@workery.ca")),
                    TargetRecord::new().text("email", Some("ops@workery.ca")),
                ),
            )
            .await
            .unwrap();

        fx.pipeline(true).run(&fx.selector(), EntityKind::User).await.unwrap();
        let users = fx.store.rows(fx.tenant.id, EntityKind::User);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].old_id, Some(legacy(3)));
    }

    /// Migrate `rows` as given into a fresh store; links come back as legacy
    /// id triples so runs against different stores compare.
    async fn customer_tags_in_order(
        rows: &[LegacyRow],
    ) -> (Vec<(LegacyId, LegacyId, LegacyId)>, MigrationReport) {
        let fx = Fixture::new();
        for (kind, id) in [
            (EntityKind::Customer, 11),
            (EntityKind::Customer, 12),
            (EntityKind::Tag, 4),
            (EntityKind::Tag, 5),
        ] {
            fx.store
                .insert_mapping(fx.tenant.id, kind, legacy(id), NewId::generate());
        }
        let rule = rule_for(EntityKind::CustomerTag);
        let report = fx
            .pipeline(true)
            .migrate(&fx.tenant, rule.as_ref(), rows)
            .await
            .unwrap();

        let legacy_of = |kind: EntityKind, id: Option<NewId>| {
            fx.store
                .rows(fx.tenant.id, kind)
                .into_iter()
                .find(|r| Some(r.id) == id)
                .and_then(|r| r.old_id)
                .unwrap()
        };
        let mut links: Vec<_> = fx
            .store
            .rows(fx.tenant.id, EntityKind::CustomerTag)
            .into_iter()
            .map(|r| {
                let customer = r.record.get("customer_id").and_then(TargetValue::as_id);
                let tag = r.record.get("tag_id").and_then(TargetValue::as_id);
                (
                    r.old_id.unwrap(),
                    legacy_of(EntityKind::Customer, customer),
                    legacy_of(EntityKind::Tag, tag),
                )
            })
            .collect();
        links.sort_unstable();
        (links, report)
    }

    #[tokio::test]
    async fn row_order_does_not_change_the_outcome() {
        let rows = vec![
            row(1).with("customer_id", 11_i64).with("tag_id", 4_i64),
            row(2).with("customer_id", 12_i64).with("tag_id", 4_i64),
            row(3).with("customer_id", 11_i64).with("tag_id", 99_i64),
            row(4).with("customer_id", 12_i64).with("tag_id", 5_i64),
            row(5).with("customer_id", 77_i64).with("tag_id", 5_i64),
        ];
        let reversed: Vec<_> = rows.iter().rev().cloned().collect();

        let (forward_links, forward) = customer_tags_in_order(&rows).await;
        let (reverse_links, reverse) = customer_tags_in_order(&reversed).await;

        assert_eq!(
            forward_links,
            vec![
                (legacy(1), legacy(11), legacy(4)),
                (legacy(2), legacy(12), legacy(4)),
                (legacy(4), legacy(12), legacy(5)),
            ]
        );
        assert_eq!(forward_links, reverse_links);
        assert_eq!((forward.processed, forward.imported), (reverse.processed, reverse.imported));
        assert_eq!(forward.degraded, reverse.degraded);

        let mut forward_skipped = forward.skipped.clone();
        let mut reverse_skipped = reverse.skipped.clone();
        forward_skipped.sort_by_key(|s| s.legacy_id);
        reverse_skipped.sort_by_key(|s| s.legacy_id);
        assert_eq!(forward_skipped, reverse_skipped);
        assert_eq!(forward.skipped_ids(), vec![legacy(3), legacy(5)]);
        assert_eq!(reverse.skipped_ids(), vec![legacy(5), legacy(3)]);
    }
}
