use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use telemetry::{spawn_polling, ViewState};

const EVERY: Duration = Duration::from_secs(30);

fn counting_poller(count: Arc<AtomicUsize>) -> telemetry::PollHandle {
    spawn_polling("test", EVERY, move |_life| {
        let count = count.clone();
        async move {
            count.fetch_add(1, Ordering::SeqCst);
        }
    })
}

#[tokio::test(start_paused = true)]
async fn test_immediate_fetch_then_every_interval() {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = counting_poller(count.clone());

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    tokio::time::sleep(EVERY * 3).await;
    assert_eq!(count.load(Ordering::SeqCst), 4);

    handle.cancel();
    tokio::time::sleep(EVERY * 10).await;
    assert_eq!(count.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_is_idempotent_and_drop_cancels() {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = counting_poller(count.clone());
    tokio::time::sleep(Duration::from_millis(1)).await;

    handle.cancel();
    handle.cancel();
    assert!(handle.is_cancelled());
    handle.shutdown().await;

    let count2 = Arc::new(AtomicUsize::new(0));
    {
        let _dropped = counting_poller(count2.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    tokio::time::sleep(EVERY * 5).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(count2.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_result_after_teardown_is_discarded() {
    let view: Arc<Mutex<ViewState<u32>>> = Arc::new(Mutex::new(ViewState::new()));
    let discarded = Arc::new(AtomicUsize::new(0));

    let handle = spawn_polling("slow", EVERY, {
        let view = view.clone();
        let discarded = discarded.clone();
        move |life| {
            let view = view.clone();
            let discarded = discarded.clone();
            async move {
                let ticket = view.lock().unwrap().begin_fetch();
                // simulated round trip outlives the view
                tokio::time::sleep(Duration::from_secs(45)).await;
                if !life.is_active() {
                    discarded.fetch_add(1, Ordering::SeqCst);
                    return;
                }
                view.lock().unwrap().apply(ticket, Ok(42));
            }
        }
    });

    tokio::time::sleep(Duration::from_secs(10)).await;
    handle.cancel();
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(discarded.load(Ordering::SeqCst), 1);
    assert_eq!(view.lock().unwrap().data, None);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_refreshes_do_not_block_timer() {
    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));

    let handle = spawn_polling("overlap", EVERY, {
        let started = started.clone();
        let finished = finished.clone();
        move |_life| {
            let started = started.clone();
            let finished = finished.clone();
            async move {
                started.fetch_add(1, Ordering::SeqCst);
                // longer than the interval
                tokio::time::sleep(EVERY * 2).await;
                finished.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    tokio::time::sleep(EVERY + Duration::from_millis(1)).await;
    assert_eq!(started.load(Ordering::SeqCst), 2);
    assert_eq!(finished.load(Ordering::SeqCst), 0);

    handle.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_survives_panicked_timer() {
    let handle = spawn_polling("broken", EVERY, |_life| -> std::future::Ready<()> {
        panic!("refresh could not be built")
    });
    tokio::time::sleep(Duration::from_millis(1)).await;

    handle.shutdown().await;
}
