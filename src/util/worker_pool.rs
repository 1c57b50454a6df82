use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};
use std::sync::mpsc;
use std::thread;

use log::{error, trace};

/// A fixed number of worker threads consuming items from one bounded first-in-first-out queue.
///
/// Items are taken in the order they were queued. With more than one worker, items may finish in a
/// different order than they were taken.
pub struct WorkerPool<T: Send + 'static> {
    workers: Vec<Worker>,
    sender: mpsc::SyncSender<Message<T>>,
}

/// A message to a worker.
enum Message<T> {
    /// A new item to handle.
    NewJob(T),
    /// Message to tell the worker to return.
    Terminate,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Create a new WorkerPool.
    ///
    /// `size` workers call `handler` for each queued item. At most `capacity` items wait in the queue.
    ///
    /// # Panics
    ///
    /// The `new` function will panic if the size is zero.
    pub fn new(size: usize, capacity: usize, handler: impl Fn(T) + Send + Sync + 'static) -> std::io::Result<WorkerPool<T>> {
        assert!(size > 0);

        let (sender, receiver) = mpsc::sync_channel(capacity);

        let receiver = Arc::new(Mutex::new(receiver));
        let handler = Arc::new(handler);

        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            workers.push(new_worker(id, Arc::clone(&receiver), Arc::clone(&handler))?);
        }

        Ok(WorkerPool { workers, sender })
    }

    /// Queues an item for a worker. Blocks while the queue is full.
    /// Gives the item back if every worker has stopped.
    pub fn execute(&self, item: T) -> Result<(), T> {
        self.sender.send(Message::NewJob(item)).map_err(|err| match err.0 {
            Message::NewJob(item) => item,
            Message::Terminate => unreachable!("only jobs are sent through execute"),
        })
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    /// Sends the termination message to all workers, after any queued items, and waits for them to return.
    fn drop(&mut self) {
        for _ in &self.workers {
            if self.sender.send(Message::Terminate).is_err() {
                break;
            }
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.take() {
                if thread.join().is_err() {
                    error!("Worker thread panicked");
                }
            }
        }
    }
}

/// A worker, represented by a join handler if the thread is still running, or None.
type Worker = Option<thread::JoinHandle<()>>;

/// Creates a new worker with the given receiver end of the queue.
/// The worker will run until a Terminate message is received or the queue is disconnected.
/// A panicking handler is logged and the worker moves on to the next item.
fn new_worker<T: Send + 'static>(
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Message<T>>>>,
    handler: Arc<impl Fn(T) + Send + Sync + 'static>,
) -> std::io::Result<Worker> {
    let thread = thread::Builder::new()
        .name(format!("minhttp-worker-{}", id))
        .spawn(move || loop {
            let message = match receiver.lock() {
                Ok(receiver) => receiver.recv(),
                Err(_) => break
            };

            match message {
                Ok(Message::NewJob(item)) => {
                    trace!("Worker {} took an item", id);
                    if catch_unwind(AssertUnwindSafe(|| handler(item))).is_err() {
                        error!("Worker {} recovered from a panic while handling an item", id);
                    }
                }
                Ok(Message::Terminate) | Err(_) => break
            }
        })?;

    Ok(Some(thread))
}
