//! Shared-state engine: the live index, the background refresh workers and
//! the single-worker search queue.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use chrono::Local;
use log::{info, warn};

use crate::{
    EngineConfig, Error,
    loading::{build_timetable, load_feed_tables},
    model::TransitIndex,
    realtime::{apply_trip_updates, decode_trip_updates},
    refresh::{self, FeedSource},
    routing::{self, Journey, SearchRequest},
};

struct SearchJob {
    request: SearchRequest,
    reply: mpsc::SyncSender<Result<Vec<Journey>, Error>>,
}

/// Handle to a running engine. Searches are queued onto a single worker;
/// the two refresh workers mutate the same index behind one lock, so every
/// search sees a consistent snapshot for its whole duration.
#[derive(Clone)]
pub struct Engine {
    jobs: mpsc::SyncSender<SearchJob>,
}

impl Engine {
    /// Download the feed, build the first index and spawn the workers.
    /// A failing first build fails startup; later refresh failures only
    /// keep the previous index alive.
    pub fn start(feed: Arc<dyn FeedSource>, config: EngineConfig) -> Result<Self, Error> {
        let index = Arc::new(Mutex::new(rebuild(feed.as_ref(), &config)?));
        let (jobs, job_queue) = mpsc::sync_channel::<SearchJob>(64);

        spawn_search_worker(job_queue, Arc::clone(&index), config.clone());
        spawn_static_refresh(Arc::clone(&index), Arc::clone(&feed), config.clone());
        if config.requests_table.iter().any(|&calls| calls > 0) {
            spawn_realtime_refresh(Arc::clone(&index), feed, config.requests_table);
        }

        Ok(Self { jobs })
    }

    /// Queue a search and block until the worker answers. Requests are
    /// served one at a time, in arrival order.
    pub fn search(&self, request: SearchRequest) -> Result<Vec<Journey>, Error> {
        let (reply, response) = mpsc::sync_channel(1);
        self.jobs
            .send(SearchJob { request, reply })
            .map_err(|_| Error::Engine("search worker is gone".into()))?;
        response
            .recv()
            .map_err(|_| Error::Engine("search worker dropped the request".into()))?
    }
}

fn spawn_search_worker(
    job_queue: mpsc::Receiver<SearchJob>,
    index: Arc<Mutex<TransitIndex>>,
    config: EngineConfig,
) {
    thread::spawn(move || {
        for job in job_queue {
            let result = {
                let guard = lock(&index);
                routing::search(&guard, &job.request, &config).map_err(Error::from)
            };
            // the caller may have given up; nothing to do then
            let _ = job.reply.send(result);
        }
    });
}

/// Rebuild the whole index from a fresh download at every local midnight.
/// The new index is built off to the side and swapped in under the lock.
fn spawn_static_refresh(
    index: Arc<Mutex<TransitIndex>>,
    feed: Arc<dyn FeedSource>,
    config: EngineConfig,
) {
    thread::spawn(move || {
        loop {
            thread::sleep(refresh::until_next_midnight());
            match rebuild(feed.as_ref(), &config) {
                Ok(fresh) => {
                    *lock(&index) = fresh;
                    info!("static refresh complete");
                }
                Err(e) => warn!("static refresh failed, keeping the current index: {e}"),
            }
        }
    });
}

/// Pull trip updates on the hourly quota schedule, starting with an
/// immediate pull, and patch the index under the lock.
fn spawn_realtime_refresh(
    index: Arc<Mutex<TransitIndex>>,
    feed: Arc<dyn FeedSource>,
    table: [u32; 24],
) {
    thread::spawn(move || {
        loop {
            match feed.trip_updates().and_then(|bytes| decode_trip_updates(&bytes)) {
                Ok(patches) => {
                    let midnight = refresh::local_midnight_epoch();
                    apply_trip_updates(&mut lock(&index), &patches, midnight);
                    info!("applied {} realtime trip updates", patches.len());
                }
                Err(e) => warn!("realtime refresh failed: {e}"),
            }
            thread::sleep(refresh::next_pull_delay(refresh::second_of_day_now(), &table));
        }
    });
}

fn rebuild(feed: &dyn FeedSource, config: &EngineConfig) -> Result<TransitIndex, Error> {
    feed.download_static()?;
    let tables = load_feed_tables(&config.data_dir)?;
    build_timetable(&tables, Local::now().date_naive(), config)
}

/// A poisoned lock only means a worker panicked mid-operation; the index
/// itself is still the best data available.
fn lock(index: &Mutex<TransitIndex>) -> MutexGuard<'_, TransitIndex> {
    index.lock().unwrap_or_else(PoisonError::into_inner)
}
