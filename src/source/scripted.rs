//! A scripted [`Retrieve`] for tests.
//!
//! Each URL owns a queue of replies.  A reply either resolves immediately or
//! waits on a oneshot gate the test fires later.  A URL with no queued reply
//! never resolves, which is how tests hold a retrieval in flight.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{FetchError, Gist, Retrieve};

/// A gist with no owner, date, or files.
pub fn make_gist(id: &str, description: Option<&str>) -> Gist {
    Gist {
        id: id.to_string(),
        html_url: format!("https://gist.github.com/{id}"),
        description: description.map(String::from),
        owner: None,
        created_at: None,
        files: BTreeMap::new(),
    }
}

pub enum Reply<T> {
    Now(Result<T, FetchError>),
    Gated(oneshot::Receiver<Result<T, FetchError>>),
}

pub struct Scripted<T> {
    replies: Mutex<HashMap<String, VecDeque<Reply<T>>>>,
    calls: Mutex<Vec<String>>,
}

impl<T> Scripted<T> {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(self, url: &str, value: T) -> Self {
        self.push(url, Reply::Now(Ok(value)))
    }

    pub fn fail(self, url: &str, error: FetchError) -> Self {
        self.push(url, Reply::Now(Err(error)))
    }

    /// Queue a reply that resolves when the returned sender fires.
    pub fn gate(&self, url: &str) -> oneshot::Sender<Result<T, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.queue(url, Reply::Gated(rx));
        tx
    }

    fn push(self, url: &str, reply: Reply<T>) -> Self {
        self.queue(url, reply);
        self
    }

    fn queue(&self, url: &str, reply: Reply<T>) {
        self.replies
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Every URL retrieved so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl<T: Send + 'static> Retrieve<T> for Scripted<T> {
    async fn retrieve(&self, url: &str) -> Result<T, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Now(result)) => result,
            Some(Reply::Gated(rx)) => match rx.await {
                Ok(result) => result,
                Err(_) => std::future::pending().await,
            },
            None => std::future::pending().await,
        }
    }
}
