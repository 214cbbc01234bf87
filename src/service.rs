//! Store worker: the single owner of the task store.
//!
//! HTTP handlers run concurrently, but the SQLite connection is not `Sync`.
//! Every store call is sent over a bounded channel to one worker thread,
//! which executes requests one at a time and answers on a oneshot channel.
//! Each request is a single store call, so record mutations are atomic and
//! concurrent edits resolve last-write-wins.

use crate::protocol::{Request, Response};
use crate::store::{Store, StoreError};
use eyre::{Context, Result, bail};
use tokio::sync::{mpsc, oneshot};

/// Capacity of the request queue in front of the worker.
const QUEUE_CAPACITY: usize = 100;

type Envelope = (Request, oneshot::Sender<Response>);

/// Cloneable handle used to talk to the store worker.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<Envelope>,
}

impl StoreHandle {
    /// Move `store` onto a dedicated worker thread and return a handle to it.
    ///
    /// The worker exits once every handle has been dropped.
    pub fn spawn(store: Store) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Envelope>(QUEUE_CAPACITY);

        std::thread::Builder::new()
            .name("store-worker".to_string())
            .spawn(move || run_worker(store, rx))
            .context("Failed to spawn store worker")?;

        Ok(Self { tx })
    }

    /// Send a request and wait for the worker's response.
    pub async fn call(&self, request: Request) -> Result<Response> {
        let (resp_tx, resp_rx) = oneshot::channel();

        if self.tx.send((request, resp_tx)).await.is_err() {
            bail!("store worker is not running");
        }

        resp_rx.await.context("store worker dropped the request")
    }
}

/// Worker loop. Runs until all senders are gone.
fn run_worker(mut store: Store, mut rx: mpsc::Receiver<Envelope>) {
    log::info!("Store worker started");

    while let Some((request, resp_tx)) = rx.blocking_recv() {
        let response = handle_request(&mut store, request);
        // The caller may have gone away; nothing to do about it here
        let _ = resp_tx.send(response);
    }

    log::info!("Store worker stopped");
}

/// Handle a single request.
fn handle_request(store: &mut Store, request: Request) -> Response {
    match request {
        Request::Create { task } => match store.create(task) {
            Ok(task) => Response::Task { task },
            Err(e) => failure(e),
        },

        Request::Get { id } => match store.get(&id) {
            Ok(task) => Response::Task { task },
            Err(e) => failure(e),
        },

        Request::List {
            filter,
            page,
            page_size,
        } => match store.list(filter, page, page_size) {
            Ok(page) => Response::Page {
                items: page.items,
                total_count: page.total_count,
            },
            Err(e) => failure(e),
        },

        Request::Update { id, patch } => match store.update(&id, patch) {
            Ok(task) => Response::Task { task },
            Err(e) => failure(e),
        },

        Request::Delete { id } => match store.delete(&id) {
            Ok(()) => Response::Ok,
            Err(e) => failure(e),
        },
    }
}

/// Translate a store failure into a response.
fn failure(report: eyre::Report) -> Response {
    match StoreError::find(&report) {
        Some(StoreError::NotFound(id)) => Response::NotFound { id: id.clone() },
        Some(StoreError::Validation(e)) => Response::Invalid { message: e.to_string() },
        None => {
            let message = report
                .chain()
                .map(|cause| cause.to_string())
                .collect::<Vec<_>>()
                .join(": ");
            log::error!("Store failure: {}", message);
            Response::error(message)
        }
    }
}
