//! Tests for the off-thread tessellator worker.

use std::sync::Arc;

use field_common::{FieldError, Grid};
use tessellator::{
    tessellate, TessellationRequest, TessellatorConfig, TessellatorError, TessellatorHandle,
    TessellatorWorker,
};
use test_utils::regular_nodes;

fn request(ni: usize, nj: usize) -> TessellationRequest {
    let (lats, lons) = regular_nodes(ni, nj, (-10.0, -10.0, 10.0, 10.0));
    TessellationRequest {
        lats: Arc::from(lats),
        lons: Arc::from(lons),
        ni,
        nj,
        margin_r: 0.5 / ni as f32,
        margin_s: 0.5 / nj as f32,
    }
}

// ============================================================================
// Worker threads
// ============================================================================

#[tokio::test]
async fn test_worker_matches_direct_tessellation() {
    let (handle, worker) = TessellatorWorker::spawn(&TessellatorConfig::default()).unwrap();

    let req = request(5, 4);
    let mesh = handle.tessellate(req.clone()).await.unwrap();
    let direct = tessellate(&req.lats, &req.lons, 5, 4, req.margin_r, req.margin_s).unwrap();
    assert_eq!(mesh, direct);

    drop(handle);
    worker.join();
}

#[tokio::test]
async fn test_worker_reports_invalid_grid() {
    let (handle, worker) = TessellatorWorker::spawn(&TessellatorConfig::default()).unwrap();

    let mut req = request(3, 3);
    req.ni = 4;
    let err = handle.tessellate(req).await.unwrap_err();
    assert!(matches!(
        err,
        TessellatorError::Field(FieldError::DataShapeMismatch { what: "lats", .. })
    ));

    // Worker survives a failed request
    assert!(handle.tessellate(request(2, 2)).await.is_ok());

    drop(handle);
    worker.join();
}

#[tokio::test]
async fn test_multi_thread_worker_serves_concurrent_requests() {
    let config = TessellatorConfig {
        worker_threads: 3,
        ..Default::default()
    };
    let (handle, worker) = TessellatorWorker::spawn(&config).unwrap();
    assert_eq!(worker.thread_count(), 3);

    let mut tasks = Vec::new();
    for n in 2..10 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            let mesh = handle.tessellate(request(n, n)).await.unwrap();
            (n, mesh)
        }));
    }

    for task in tasks {
        let (n, mesh) = task.await.unwrap();
        assert_eq!(mesh.dimensions(), (n, n));
        assert_eq!(mesh.vertex_count(), 2 * (n - 1) * (n + 1));
    }

    drop(handle);
    worker.join();
}

#[test]
fn test_request_for_grid_uses_texel_margins() {
    let grid = Grid::plate_carree(4, 2, -10.0, 0.0, 10.0, 5.0).unwrap();
    let req = TessellationRequest::for_grid(&grid);

    assert_eq!((req.ni, req.nj), (4, 2));
    assert_eq!((req.margin_r, req.margin_s), (0.125, 0.25));
    assert_eq!(&req.lats[..], grid.lats());
    assert_eq!(&req.lons[..], grid.lons());

    // The worker gets its own copy of the nodes
    assert!(!std::ptr::eq(req.lats.as_ptr(), grid.lats().as_ptr()));
    assert!(!std::ptr::eq(req.lons.as_ptr(), grid.lons().as_ptr()));

    let req = req.with_margins(0.0, 0.0);
    assert_eq!((req.margin_r, req.margin_s), (0.0, 0.0));
}

#[test]
fn test_blocking_caller() {
    let (handle, worker) = TessellatorWorker::spawn(&TessellatorConfig::default()).unwrap();

    let mesh = tokio_test::block_on(handle.tessellate(request(3, 2))).unwrap();
    assert_eq!(mesh.vertices().len(), 24);

    drop(handle);
    worker.join();
}

#[test]
fn test_spawn_rejects_invalid_config() {
    let config = TessellatorConfig {
        worker_threads: 0,
        ..Default::default()
    };
    assert!(matches!(
        TessellatorWorker::spawn(&config),
        Err(TessellatorError::ConfigError(_))
    ));
}

// ============================================================================
// Manual queue
// ============================================================================

#[tokio::test]
async fn test_replies_may_arrive_out_of_order() {
    let (handle, mut rx) = TessellatorHandle::channel(4);

    let first = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.tessellate(request(3, 3)).await })
    };
    let second = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.tessellate(request(6, 2)).await })
    };

    let job_a = rx.recv().await.unwrap();
    let job_b = rx.recv().await.unwrap();

    // Answer in reverse arrival order
    job_b.run();
    job_a.run();

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first.dimensions(), (3, 3));
    assert_eq!(second.dimensions(), (6, 2));
}

#[tokio::test]
async fn test_dropped_job_reports_unavailable() {
    let (handle, mut rx) = TessellatorHandle::channel(1);

    let pending = tokio::spawn({
        let handle = handle.clone();
        async move { handle.tessellate(request(2, 2)).await }
    });

    let job = rx.recv().await.unwrap();
    drop(job);

    assert!(matches!(
        pending.await.unwrap(),
        Err(TessellatorError::WorkerUnavailable)
    ));
}

#[tokio::test]
async fn test_closed_queue_reports_unavailable() {
    let (handle, rx) = TessellatorHandle::channel(1);
    drop(rx);

    assert!(handle.is_closed());
    assert!(matches!(
        handle.tessellate(request(2, 2)).await,
        Err(TessellatorError::WorkerUnavailable)
    ));
}

#[tokio::test]
async fn test_respond_forwards_errors() {
    let (handle, mut rx) = TessellatorHandle::channel(1);

    let pending = tokio::spawn({
        let handle = handle.clone();
        async move { handle.tessellate(request(2, 2)).await }
    });

    let job = rx.recv().await.unwrap();
    job.respond(Err(FieldError::InvalidGridShape { ni: 0, nj: 0 }));

    assert!(matches!(
        pending.await.unwrap(),
        Err(TessellatorError::Field(FieldError::InvalidGridShape { .. }))
    ));
}
