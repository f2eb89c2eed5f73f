use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

type JobTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct Job {
    name: String,
    every: Duration,
    task: JobTask,
}

/// Explicitly constructed timer component. Jobs are registered up front and
/// each runs on its own fixed interval between `start` and `stop`; nothing
/// is registered ambiently at load time.
pub struct Scheduler {
    jobs: Vec<Job>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            handles: Vec::new(),
        }
    }

    pub fn register<F, Fut>(&mut self, name: &str, every: Duration, task: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task: JobTask = Arc::new(move || -> BoxFuture<'static, ()> { Box::pin(task()) });
        self.jobs.push(Job {
            name: name.to_string(),
            every,
            task,
        });
    }

    /// Spawn one interval task per registered job. The first firing happens a
    /// full interval after start.
    pub fn start(&mut self) {
        for job in &self.jobs {
            let name = job.name.clone();
            let every = job.every;
            let task = job.task.clone();

            let handle = tokio::spawn(async move {
                let mut interval = tokio::time::interval(every);
                // The first tick completes immediately; skip it.
                interval.tick().await;
                loop {
                    interval.tick().await;
                    log::info!("Running scheduled job '{}'", name);
                    task().await;
                }
            });
            self.handles.push(handle);
        }
    }

    pub fn stop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn registered_job_fires_until_stopped() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut scheduler = Scheduler::new();

        let seen = counter.clone();
        scheduler.register("tick", Duration::from_millis(10), move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert_eq!(scheduler.job_count(), 1);
        assert!(!scheduler.is_running());

        scheduler.start();
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop();
        assert!(!scheduler.is_running());

        let fired = counter.load(Ordering::SeqCst);
        assert!(fired > 0, "job never fired");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), fired, "job fired after stop");
    }
}
