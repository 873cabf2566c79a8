//! Background loading
//!
//! Fetching and decoding run on short-lived worker threads. Results travel
//! back over an unbounded channel and are drained by the thread that owns the
//! viewer, once per frame, so scene swaps always happen on that thread.

use std::sync::Arc;
use std::thread;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;

use super::{decode, DecodedScene, Fetcher, LoadTicket};
use crate::error::{LoadError, LoadResult};

/// Where a load came from, for status messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Bytes { name: Option<String> },
    Url(String),
}

impl std::fmt::Display for LoadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadSource::Bytes { name: Some(name) } => write!(f, "{}", name),
            LoadSource::Bytes { name: None } => write!(f, "in-memory document"),
            LoadSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// A finished load, successful or not
#[derive(Debug)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub source: LoadSource,
    pub result: LoadResult<DecodedScene>,
}

/// Runs loads off the render thread
pub struct LoadQueue {
    fetcher: Arc<dyn Fetcher>,
    sender: UnboundedSender<LoadCompletion>,
    receiver: UnboundedReceiver<LoadCompletion>,
    in_flight: usize,
}

impl LoadQueue {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            fetcher,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Decodes `bytes` on a worker thread
    pub fn spawn_bytes(
        &mut self,
        ticket: LoadTicket,
        bytes: Vec<u8>,
        name: Option<String>,
    ) -> Result<(), LoadError> {
        let source = LoadSource::Bytes { name: name.clone() };
        self.spawn(ticket, source, move || {
            decode(&bytes, name.as_deref()).map_err(LoadError::from)
        })
    }

    /// Fetches and decodes `url` on a worker thread
    pub fn spawn_url(&mut self, ticket: LoadTicket, url: impl Into<String>) -> Result<(), LoadError> {
        let url = url.into();
        let fetcher = Arc::clone(&self.fetcher);
        let source = LoadSource::Url(url.clone());
        self.spawn(ticket, source, move || {
            let bytes = fetcher.fetch(&url)?;
            Ok(decode(&bytes, Some(&url))?)
        })
    }

    fn spawn<F>(&mut self, ticket: LoadTicket, source: LoadSource, job: F) -> Result<(), LoadError>
    where
        F: FnOnce() -> LoadResult<DecodedScene> + Send + 'static,
    {
        let sender = self.sender.clone();
        let label = source.to_string();
        thread::Builder::new()
            .name(format!("strata-load-{}", ticket.generation()))
            .spawn(move || {
                let result = job();
                let completion = LoadCompletion {
                    ticket,
                    source,
                    result,
                };
                if sender.unbounded_send(completion).is_err() {
                    log::debug!("load queue dropped before load {} finished", ticket.generation());
                }
            })
            .map_err(LoadError::Spawn)?;

        self.in_flight += 1;
        log::debug!("load {} started for {}", ticket.generation(), label);
        Ok(())
    }

    /// Completions that have arrived since the last call, in arrival order
    pub fn drain(&mut self) -> Vec<LoadCompletion> {
        let mut completions = Vec::new();
        while let Ok(Some(completion)) = self.receiver.try_next() {
            completions.push(completion);
        }
        self.in_flight = self.in_flight.saturating_sub(completions.len());
        completions
    }

    /// Blocks until the next completion arrives; `None` when nothing is in flight
    pub fn wait_next(&mut self) -> Option<LoadCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = futures::executor::block_on(self.receiver.next())?;
        self.in_flight -= 1;
        Some(completion)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    struct StaticFetcher(&'static [u8]);

    impl Fetcher for StaticFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            if url.contains("missing") {
                return Err(FetchError::Http {
                    url: url.to_string(),
                    status: 404,
                });
            }
            Ok(self.0.to_vec())
        }
    }

    fn queue() -> LoadQueue {
        LoadQueue::new(Arc::new(StaticFetcher(b"o Tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")))
    }

    #[test]
    fn test_url_load_completes_with_scene() {
        let mut queue = queue();
        queue.spawn_url(LoadTicket::new(1), "http://models/tri.obj").unwrap();
        assert_eq!(queue.in_flight(), 1);

        let completion = queue.wait_next().unwrap();
        assert_eq!(completion.ticket.generation(), 1);
        assert_eq!(completion.source, LoadSource::Url("http://models/tri.obj".into()));
        assert_eq!(completion.result.unwrap().roots.len(), 1);
        assert_eq!(queue.in_flight(), 0);
        assert!(queue.wait_next().is_none());
    }

    #[test]
    fn test_failures_are_delivered_as_completions() {
        let mut queue = queue();
        queue.spawn_url(LoadTicket::new(1), "http://models/missing.glb").unwrap();
        queue.spawn_bytes(LoadTicket::new(2), Vec::new(), None).unwrap();

        let mut results: Vec<_> = (0..2).filter_map(|_| queue.wait_next()).collect();
        results.sort_by_key(|c| c.ticket);
        assert!(matches!(
            results[0].result,
            Err(LoadError::Fetch(FetchError::Http { status: 404, .. }))
        ));
        assert!(matches!(results[1].result, Err(LoadError::Decode(_))));
    }

    #[test]
    fn test_drain_collects_finished_loads() {
        let mut queue = queue();
        queue
            .spawn_bytes(LoadTicket::new(3), b"v 0 0 0".to_vec(), Some("a.obj".into()))
            .unwrap();

        let mut drained = Vec::new();
        while drained.is_empty() {
            drained = queue.drain();
            thread::yield_now();
        }
        assert_eq!(drained.len(), 1);
        assert_eq!(queue.in_flight(), 0);
    }
}
