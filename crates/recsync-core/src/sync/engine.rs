//! Reconciler implementation
//!
//! For every configured target the reconciler asks the remote which
//! identifiers it already holds, creates everything it lacks in one bulk
//! call, then updates known records whose content changed since the last
//! push, one by one. Failures are counted per target and never stop the
//! next target.

use recsync_connectors::{ConnectionType, Record};
use serde_json::Value;

use super::factory::{ConnectorFactory, SourceFactory};
use super::phase::TargetPhase;
use crate::config::{ConnectionStructure, SourceKind, SyncConfig, Target};
use crate::history::{HistoryStore, ident_key};
use crate::remote::{Payload, RemoteApi};
use crate::report::{RunSummary, TargetOutcome};
use crate::transform::Transformer;
use crate::Error;

/// Record/payload pairs shown in a dry run, per push step
const PREVIEW_SAMPLES: usize = 3;

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Compute everything but write nothing, neither remotely nor to the
    /// history
    pub dry_run: bool,
    /// Only sync these targets; empty means all
    pub targets: Vec<Target>,
    /// Only sync targets bound to these source types; empty means all
    pub sources: Vec<ConnectionType>,
}

impl SyncOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// An unknown source type is only selected when no source filter is set.
    pub fn selects(&self, target: Target, source: &SourceKind) -> bool {
        (self.targets.is_empty() || self.targets.contains(&target))
            && (self.sources.is_empty()
                || source.known().is_some_and(|s| self.sources.contains(&s)))
    }
}

/// Ends a target early, charging `failed` records to it
struct Abort {
    error: Error,
    failed: usize,
}

impl From<Error> for Abort {
    fn from(error: Error) -> Self {
        Self { error, failed: 1 }
    }
}

fn advance(phase: &mut TargetPhase, next: TargetPhase) {
    tracing::debug!(from = %phase, to = %next, "phase");
    *phase = next;
}

/// Runs the reconciliation for a configuration.
///
/// The change history is borrowed exclusively for the whole run.
pub struct Reconciler<'a> {
    remote: &'a dyn RemoteApi,
    connectors: &'a dyn ConnectorFactory,
    history: &'a mut HistoryStore,
    options: SyncOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        remote: &'a dyn RemoteApi,
        history: &'a mut HistoryStore,
        options: SyncOptions,
    ) -> Self {
        Self {
            remote,
            connectors: &SourceFactory,
            history,
            options,
        }
    }

    /// Use `connectors` instead of the configured backends
    pub fn with_connectors(mut self, connectors: &'a dyn ConnectorFactory) -> Self {
        self.connectors = connectors;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Sync every selected target in order and summarize.
    pub fn run(&mut self, config: &SyncConfig) -> RunSummary {
        let mut summary = RunSummary::new(self.options.dry_run);
        if self.options.dry_run {
            tracing::info!("dry run: nothing will be written");
        }

        for (target, structure) in config.targets() {
            if !self.options.selects(target, &structure.connection_type) {
                tracing::debug!(%target, source = %structure.connection_type, "target not selected");
                continue;
            }
            summary.push(self.sync_target(target, structure));
        }

        if !self.options.dry_run {
            if let Err(error) = self.history.flush_if_dirty() {
                tracing::error!(%error, "cannot persist change history");
            }
        }
        summary
    }

    /// Sync one target; every failure ends up in the returned counts.
    pub fn sync_target(&mut self, target: Target, structure: &ConnectionStructure) -> TargetOutcome {
        let span = tracing::info_span!("sync", %target, source = %structure.connection_type);
        let _entered = span.enter();

        let mut outcome = TargetOutcome::new(target, structure.connection_type.clone());
        let mut phase = TargetPhase::Idle;

        match self.reconcile(target, structure, &mut outcome, &mut phase) {
            Ok(()) => tracing::info!(
                success = outcome.success,
                failed = outcome.failed,
                "target finished"
            ),
            Err(abort) => {
                tracing::error!(%phase, error = %abort.error, "target aborted");
                outcome.failed += abort.failed;
                outcome.aborted_at = Some(phase);
            }
        }
        outcome
    }

    fn reconcile(
        &mut self,
        target: Target,
        structure: &ConnectionStructure,
        outcome: &mut TargetOutcome,
        phase: &mut TargetPhase,
    ) -> Result<(), Abort> {
        advance(phase, TargetPhase::ConnectorHealthCheck);
        structure.validate()?;
        let transformer = Transformer::new(&structure.field_mapping, &structure.encoding)?;
        let connector = self.connectors.connect(structure)?;
        let ident = structure.collection_info.ident.as_str();

        advance(phase, TargetPhase::FetchRemoteIdentifiers);
        let known = self.remote.get_idents(target)?;
        tracing::info!(known = known.len(), "remote identifiers fetched");

        advance(phase, TargetPhase::FetchNewRows);
        let new_records = connector.get_new(&known).map_err(Error::from)?.into_records();
        outcome.new_records = new_records.len();
        tracing::info!(new = new_records.len(), "new records fetched");

        if !new_records.is_empty() {
            advance(phase, TargetPhase::PushNew);
            self.push_new(target, ident, &transformer, &new_records, outcome, phase);
        }

        advance(phase, TargetPhase::FetchCandidateRows);
        let candidates = connector.get_old(&known).map_err(Error::from)?.into_records();
        let candidate_count = candidates.len();

        advance(phase, TargetPhase::ClassifyChanged);
        let changed: Vec<Record> = self.history.classify(target, candidates, ident).collect();
        outcome.changed_records = changed.len();
        tracing::info!(
            known = candidate_count,
            changed = changed.len(),
            "known records classified"
        );

        if !changed.is_empty() {
            advance(phase, TargetPhase::PushChangedOneByOne);
            let updated = self.push_changed(target, ident, &transformer, &changed, outcome);
            if updated > 0 {
                advance(phase, TargetPhase::CommitChangedHistory);
                self.flush_history();
            }
        }

        advance(phase, TargetPhase::Done);
        Ok(())
    }

    /// One bulk create for every new record; all or nothing.
    fn push_new(
        &mut self,
        target: Target,
        ident: &str,
        transformer: &Transformer,
        records: &[Record],
        outcome: &mut TargetOutcome,
        phase: &mut TargetPhase,
    ) {
        let payloads = match transformer.apply_all(records) {
            Ok(payloads) => payloads,
            Err(error) => {
                tracing::error!(
                    %error,
                    idents = ?idents(records, ident),
                    "cannot map new records; batch skipped"
                );
                outcome.failed += records.len();
                return;
            }
        };

        if self.options.dry_run {
            let pairs: Vec<(&Record, &Payload)> = records.iter().zip(&payloads).collect();
            log_preview(target, &pairs);
            outcome.success += records.len();
            return;
        }

        if let Err(error) = self.remote.bulk_create(target, &payloads) {
            tracing::error!(
                %error,
                idents = ?idents(records, ident),
                "bulk create failed"
            );
            outcome.failed += records.len();
            return;
        }
        outcome.success += records.len();
        tracing::info!(created = records.len(), "new records created");

        advance(phase, TargetPhase::CommitNewHistory);
        for record in records {
            if let Err(error) = self.history.commit(target, record, ident) {
                tracing::warn!(%error, "created record not recorded in history");
            }
        }
        self.flush_history();
    }

    /// One update per changed record; returns how many went through.
    fn push_changed(
        &mut self,
        target: Target,
        ident: &str,
        transformer: &Transformer,
        records: &[Record],
        outcome: &mut TargetOutcome,
    ) -> usize {
        let mut updated = 0;
        let mut previews: Vec<(&Record, Payload)> = Vec::new();

        for record in records {
            let key = ident_key(record, ident).unwrap_or_default();
            let payload = match transformer.apply(record) {
                Ok(payload) => payload,
                Err(error) => {
                    tracing::error!(ident = %key, %error, "cannot map changed record");
                    outcome.failed += 1;
                    continue;
                }
            };

            if self.options.dry_run {
                previews.push((record, payload));
                outcome.success += 1;
                continue;
            }

            match self.remote.update_by_ident(target, &payload) {
                Ok(()) => {
                    if let Err(error) = self.history.commit(target, record, ident) {
                        tracing::warn!(ident = %key, %error, "updated record not recorded in history");
                    }
                    outcome.success += 1;
                    updated += 1;
                }
                Err(error) => {
                    tracing::error!(ident = %key, %error, "update failed");
                    outcome.failed += 1;
                }
            }
        }

        if !previews.is_empty() {
            let pairs: Vec<(&Record, &Payload)> = previews.iter().map(|(r, p)| (*r, p)).collect();
            log_preview(target, &pairs);
        }
        if updated > 0 {
            tracing::info!(updated, "changed records updated");
        }
        updated
    }

    fn flush_history(&mut self) {
        if let Err(error) = self.history.flush() {
            tracing::error!(%error, "cannot persist change history");
        }
    }
}

fn idents(records: &[Record], ident: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| ident_key(r, ident))
        .collect()
}

/// Log a random sample of what a dry run would send.
fn log_preview(target: Target, pairs: &[(&Record, &Payload)]) {
    let amount = pairs.len().min(PREVIEW_SAMPLES);
    let mut rng = rand::thread_rng();
    for index in rand::seq::index::sample(&mut rng, pairs.len(), amount).iter() {
        let (record, payload) = pairs[index];
        let source = serde_json::to_string(record).unwrap_or_default();
        let destination = Value::Object(payload.clone());
        tracing::info!(%target, %source, %destination, "dry run: would send");
    }
}
