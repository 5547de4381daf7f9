// src/store/server.rs — Async message passing for Store

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::recommend::job::{BatchWrite, HistorySource, RecommendationSink};
use crate::recommend::types::{DeviceRef, RawHistoryRecord, Recommendation};
use crate::store::db::{PredictionRow, Store};

#[derive(Debug)]
pub enum StoreCommand {
    InsertHistory {
        device: DeviceRef,
        records: Vec<RawHistoryRecord>,
        resp: oneshot::Sender<anyhow::Result<usize>>,
    },
    QueryHistory {
        device: DeviceRef,
        resp: oneshot::Sender<anyhow::Result<Vec<RawHistoryRecord>>>,
    },
    WritePredictionBatch {
        device: DeviceRef,
        run_key: String,
        recommendations: Vec<Recommendation>,
        resp: oneshot::Sender<anyhow::Result<BatchWrite>>,
    },
    QueryLatestPredictions {
        device: DeviceRef,
        resp: oneshot::Sender<anyhow::Result<Vec<PredictionRow>>>,
    },
}

/// A handle to the Store that uses message passing.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreHandle {
    pub fn new(tx: mpsc::Sender<StoreCommand>) -> Self {
        Self { tx }
    }

    /// Insert history records, returning how many were new.
    pub async fn insert_history(
        &self,
        device: DeviceRef,
        records: Vec<RawHistoryRecord>,
    ) -> anyhow::Result<usize> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::InsertHistory {
                device,
                records,
                resp: resp_tx,
            })
            .await?;
        resp_rx.await?
    }

    pub async fn query_history(&self, device: DeviceRef) -> anyhow::Result<Vec<RawHistoryRecord>> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::QueryHistory {
                device,
                resp: resp_tx,
            })
            .await?;
        resp_rx.await?
    }

    pub async fn write_prediction_batch(
        &self,
        device: DeviceRef,
        run_key: String,
        recommendations: Vec<Recommendation>,
    ) -> anyhow::Result<BatchWrite> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::WritePredictionBatch {
                device,
                run_key,
                recommendations,
                resp: resp_tx,
            })
            .await?;
        resp_rx.await?
    }

    pub async fn query_latest_predictions(
        &self,
        device: DeviceRef,
    ) -> anyhow::Result<Vec<PredictionRow>> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::QueryLatestPredictions {
                device,
                resp: resp_tx,
            })
            .await?;
        resp_rx.await?
    }
}

#[async_trait]
impl HistorySource for StoreHandle {
    async fn fetch_history(&self, device: &DeviceRef) -> anyhow::Result<Vec<RawHistoryRecord>> {
        self.query_history(device.clone()).await
    }
}

#[async_trait]
impl RecommendationSink for StoreHandle {
    async fn write_batch(
        &self,
        device: &DeviceRef,
        run_key: &str,
        recommendations: &[Recommendation],
    ) -> anyhow::Result<BatchWrite> {
        self.write_prediction_batch(device.clone(), run_key.to_string(), recommendations.to_vec())
            .await
    }
}

/// Spawn the store server task and return a handle to it.
pub fn spawn_store_server(store: Store) -> (StoreHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(100);
    let handle = StoreHandle::new(tx);
    let join_handle = tokio::spawn(run_store_server(store, rx));
    (handle, join_handle)
}

/// The background task that owns the Store.
pub async fn run_store_server(store: Store, mut rx: mpsc::Receiver<StoreCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::InsertHistory {
                device,
                records,
                resp,
            } => {
                let res = insert_all(&store, &device, &records);
                let _ = resp.send(res);
            }
            StoreCommand::QueryHistory { device, resp } => {
                let res = store.query_history(&device);
                let _ = resp.send(res);
            }
            StoreCommand::WritePredictionBatch {
                device,
                run_key,
                recommendations,
                resp,
            } => {
                let res = store.write_prediction_batch(&device, &run_key, &recommendations);
                let _ = resp.send(res);
            }
            StoreCommand::QueryLatestPredictions { device, resp } => {
                let res = store.query_latest_predictions(&device);
                let _ = resp.send(res);
            }
        }
    }
}

fn insert_all(
    store: &Store,
    device: &DeviceRef,
    records: &[RawHistoryRecord],
) -> anyhow::Result<usize> {
    let mut inserted = 0;
    for record in records {
        if store.insert_history_record(device, record)? {
            inserted += 1;
        }
    }
    Ok(inserted)
}
