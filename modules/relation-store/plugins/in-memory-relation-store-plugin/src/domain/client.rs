//! Client implementation for the in-memory relation store plugin.

use async_trait::async_trait;
use relation_store_sdk::{
    ReadPage, RelationStoreClient, RelationStoreError, Tuple, TupleFilter, with_cancellation,
};
use tokio_util::sync::CancellationToken;

use super::service::{Operation, Service};

#[async_trait]
impl RelationStoreClient for Service {
    async fn check(
        &self,
        cancel: &CancellationToken,
        tuple: &Tuple,
        trace: bool,
    ) -> Result<bool, RelationStoreError> {
        with_cancellation(cancel, async {
            self.delay().await;
            self.injected_fault(Operation::Check)?;
            self.check(tuple, trace)
        })
        .await
    }

    async fn add_relations(
        &self,
        cancel: &CancellationToken,
        tuples: &[Tuple],
    ) -> Result<(), RelationStoreError> {
        with_cancellation(cancel, async {
            self.delay().await;
            self.injected_fault(Operation::Write)?;
            self.add(tuples)
        })
        .await
    }

    async fn remove_relations(
        &self,
        cancel: &CancellationToken,
        tuples: &[Tuple],
    ) -> Result<(), RelationStoreError> {
        with_cancellation(cancel, async {
            self.delay().await;
            self.injected_fault(Operation::Write)?;
            self.remove(tuples);
            Ok(())
        })
        .await
    }

    async fn read_related_objects(
        &self,
        cancel: &CancellationToken,
        filter: &TupleFilter,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<ReadPage, RelationStoreError> {
        with_cancellation(cancel, async {
            self.delay().await;
            self.injected_fault(Operation::Read)?;
            self.read(filter, limit, cursor)
        })
        .await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::InMemoryRelationStoreConfig;
    use jimm_names::{Relation, Tag};
    use relation_store_sdk::read_all_related_objects;
    use std::time::Duration;
    use tracing_test::traced_test;

    fn tuple(s: &str) -> Tuple {
        s.parse().unwrap()
    }

    fn slow_service() -> Service {
        let cfg = InMemoryRelationStoreConfig {
            latency_ms: 30_000,
            ..InMemoryRelationStoreConfig::default()
        };
        Service::from_config(&cfg).unwrap()
    }

    #[tokio::test]
    async fn plugin_trait_round_trips_tuples() {
        let service = Service::new();
        let plugin: &dyn RelationStoreClient = &service;
        let cancel = CancellationToken::new();
        let admin = tuple("user-alice administrator serviceaccount-acme");

        plugin
            .add_relations(&cancel, std::slice::from_ref(&admin))
            .await
            .unwrap();
        assert!(plugin.check(&cancel, &admin, false).await.unwrap());

        plugin
            .remove_relations(&cancel, std::slice::from_ref(&admin))
            .await
            .unwrap();
        assert!(!plugin.check(&cancel, &admin, false).await.unwrap());
    }

    #[tokio::test]
    async fn read_all_collects_every_page() {
        let service = Service::new();
        let batch: Vec<Tuple> = (0..25)
            .map(|i| tuple(&format!("user-u{i:02} administrator serviceaccount-acme")))
            .collect();
        service.add(&batch).unwrap();

        let filter = TupleFilter::new(
            Relation::Administrator,
            "serviceaccount-acme".parse::<Tag>().unwrap(),
        );
        let all = read_all_related_objects(&service, &CancellationToken::new(), &filter, 10)
            .await
            .unwrap();

        assert_eq!(all, batch);
    }

    #[tokio::test]
    async fn injected_write_fault_leaves_store_unchanged() {
        let service = Service::new();
        service.fail(Operation::Write, "store unavailable");
        let plugin: &dyn RelationStoreClient = &service;

        let err = plugin
            .add_relations(
                &CancellationToken::new(),
                &[tuple("user-bob administrator serviceaccount-acme")],
            )
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(service.is_empty());
    }

    #[tokio::test]
    async fn cancelled_request_is_abandoned() {
        let service = slow_service();
        let plugin: &dyn RelationStoreClient = &service;
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = plugin
            .add_relations(&cancel, &[tuple("user-bob administrator serviceaccount-acme")])
            .await;

        assert_eq!(result, Err(RelationStoreError::Cancelled));
        assert!(service.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn trace_logs_resolution_path() {
        let service = Service::new();
        service
            .add(&[
                tuple("user-bob member group-ops"),
                tuple("group-ops#member administrator serviceaccount-acme"),
            ])
            .unwrap();
        let plugin: &dyn RelationStoreClient = &service;

        let allowed = plugin
            .check(
                &CancellationToken::new(),
                &tuple("user-bob administrator serviceaccount-acme"),
                true,
            )
            .await
            .unwrap();

        assert!(allowed);
        assert!(logs_contain("check allowed through group membership"));
    }
}
