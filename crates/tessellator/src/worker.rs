//! Off-thread tessellation.
//!
//! Requests go through a bounded queue to dedicated OS threads and the
//! mesh comes back on a oneshot channel, so callers on a single-threaded
//! render loop only ever await.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use field_common::{FieldError, Grid};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::TessellatorConfig;
use crate::error::{Result, TessellatorError};
use crate::mesh::{tessellate, TessellatedMesh};

/// Everything the worker needs to build one mesh.
#[derive(Debug, Clone)]
pub struct TessellationRequest {
    pub lats: Arc<[f32]>,
    pub lons: Arc<[f32]>,
    pub ni: usize,
    pub nj: usize,
    pub margin_r: f32,
    pub margin_s: f32,
}

impl TessellationRequest {
    /// Request for a grid with texel-centre margins (`0.5 / ni`, `0.5 / nj`).
    ///
    /// The node arrays are copied; the worker never sees the grid itself.
    pub fn for_grid(grid: &Grid) -> Self {
        let (margin_r, margin_s) = grid.texcoord_margins();
        Self {
            lats: Arc::from(grid.lats()),
            lons: Arc::from(grid.lons()),
            ni: grid.ni(),
            nj: grid.nj(),
            margin_r,
            margin_s,
        }
    }

    /// Replace the texture coordinate margins.
    pub fn with_margins(mut self, margin_r: f32, margin_s: f32) -> Self {
        self.margin_r = margin_r;
        self.margin_s = margin_s;
        self
    }
}

/// A queued request together with its reply channel.
#[derive(Debug)]
pub struct TessellationJob {
    pub request: TessellationRequest,
    pub reply: oneshot::Sender<std::result::Result<TessellatedMesh, FieldError>>,
}

impl TessellationJob {
    /// Tessellate the request and send the result back.
    pub fn run(self) {
        let TessellationRequest {
            lats,
            lons,
            ni,
            nj,
            margin_r,
            margin_s,
        } = &self.request;

        let start = Instant::now();
        let result = tessellate(lats, lons, *ni, *nj, *margin_r, *margin_s);

        match &result {
            Ok(mesh) => debug!(
                ni = ni,
                nj = nj,
                vertices = mesh.vertex_count(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Tessellated grid"
            ),
            Err(e) => warn!(ni = ni, nj = nj, error = %e, "Tessellation failed"),
        }

        self.respond(result);
    }

    /// Send a result without tessellating.
    pub fn respond(self, result: std::result::Result<TessellatedMesh, FieldError>) {
        if self.reply.send(result).is_err() {
            debug!("Tessellation result discarded, requester went away");
        }
    }
}

/// Cloneable sender side of the tessellation queue.
#[derive(Debug, Clone)]
pub struct TessellatorHandle {
    tx: mpsc::Sender<TessellationJob>,
}

impl TessellatorHandle {
    /// Create a handle and the queue it feeds.
    ///
    /// [`TessellatorWorker::spawn`] drains the receiver on worker threads;
    /// holding the receiver directly lets a caller answer jobs itself.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TessellationJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue a request and wait for its mesh.
    pub async fn tessellate(&self, request: TessellationRequest) -> Result<TessellatedMesh> {
        let (reply, reply_rx) = oneshot::channel();

        self.tx
            .send(TessellationJob { request, reply })
            .await
            .map_err(|_| TessellatorError::WorkerUnavailable)?;

        let result = reply_rx
            .await
            .map_err(|_| TessellatorError::WorkerUnavailable)?;

        Ok(result?)
    }

    /// Whether the receiving side has shut down.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Pool of OS threads serving a [`TessellatorHandle`].
///
/// Threads exit once every handle is dropped and the queue drains.
#[derive(Debug)]
pub struct TessellatorWorker {
    threads: Vec<JoinHandle<()>>,
}

impl TessellatorWorker {
    /// Start the worker threads.
    pub fn spawn(config: &TessellatorConfig) -> Result<(TessellatorHandle, Self)> {
        config.validate().map_err(TessellatorError::ConfigError)?;

        let (handle, rx) = TessellatorHandle::channel(config.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let mut threads = Vec::with_capacity(config.worker_threads);
        for index in 0..config.worker_threads {
            let rx = Arc::clone(&rx);
            let thread = std::thread::Builder::new()
                .name(format!("{}-{}", config.thread_name, index))
                .spawn(move || serve(rx))
                .map_err(|e| TessellatorError::WorkerSpawn(e.to_string()))?;
            threads.push(thread);
        }

        info!(
            threads = config.worker_threads,
            queue_capacity = config.queue_capacity,
            "Tessellator worker started"
        );

        Ok((handle, Self { threads }))
    }

    /// Number of running threads.
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Wait for all threads to exit.
    ///
    /// Blocks until every [`TessellatorHandle`] has been dropped.
    pub fn join(self) {
        for thread in self.threads {
            if thread.join().is_err() {
                warn!("Tessellator thread panicked");
            }
        }
        debug!("Tessellator worker stopped");
    }
}

fn serve(rx: Arc<Mutex<mpsc::Receiver<TessellationJob>>>) {
    loop {
        let job = {
            let mut guard = match rx.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.blocking_recv()
        };

        match job {
            Some(job) => job.run(),
            None => break,
        }
    }
}
