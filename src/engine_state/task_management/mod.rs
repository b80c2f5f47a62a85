//! # Task Management System
//!
//! A pool of worker threads that runs chunk generation and meshing off the
//! owning thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed on a worker
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the owning thread and one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager hands tasks to idle workers round-robin, queueing the rest
//! 3. Workers process tasks and send results back
//! 4. Results are handled on the owning thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks or submit render commands
//!
//! Each worker has at most [`MAX_TASKS_IN_FLIGHT`] tasks outstanding, so a slow
//! task never hides queued work from an idle worker.
//!
//! A worker whose task panics is retired: its in-flight task is dropped and it
//! receives no more work.
//!
//! ## Example Usage
//! ```no_run
//! # use voxel_terrain::engine_state::task_management::{TaskManager, task::TaskContext};
//! # use voxel_terrain::engine_state::rendering::render_target::DrawList;
//! # fn demo(context: TaskContext) {
//! let mut task_manager = TaskManager::new(4, context);
//! let mut draw_list = DrawList::new();
//!
//! // In the main loop:
//! task_manager.process_completed_tasks(&mut draw_list);
//! task_manager.process_queued_tasks();
//! # }
//! ```

pub mod task;

use std::{
    collections::VecDeque,
    sync::mpsc::{channel, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use log::{debug, error, info};
use task::{Task, TaskContext, TaskResult};

use super::rendering::render_target::RenderTarget;

/// A communication channel between the owning thread and a worker thread.
///
/// Dropping the channel closes `task_sender`, which ends the worker loop.
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    /// Cleared once the worker thread has exited.
    alive: bool,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
    context: TaskContext,
}

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads; `0` queues tasks without running them
    /// * `context` - Shared state handed to every task result
    ///
    /// # Panics
    /// Panics if the operating system refuses to spawn a thread.
    pub fn new(num_workers: usize, context: TaskContext) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("chunk-worker-{index}"))
                .spawn(task_closure)
                .expect("failed to spawn chunk worker thread");

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                alive: true,
                _worker: worker,
            });
        }

        info!("Started {num_workers} chunk worker threads");

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            context,
        }
    }

    /// Number of worker threads still running.
    pub fn worker_count(&self) -> usize {
        self.channels.iter().filter(|channel| channel.alive).count()
    }

    /// Number of tasks waiting for a free worker.
    pub fn queued_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Number of tasks currently running on workers.
    pub fn in_flight_count(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Whether no task is queued or running.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.in_flight_count() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to the worker
    /// - `Err(task)` if the worker has gone away, so the task can be requeued
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                self.channels[channel_idx].alive = false;
                Err(task.0)
            }
        }
    }

    /// Finds a worker channel that can accept a new task, round-robin from the
    /// last used channel.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|step| (self.current_channel + step) % len)
            .find(|&index| {
                let channel = &self.channels[index];
                channel.alive && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately handed to a worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };

        match self.try_send_task(task, channel_idx) {
            Ok(_) => {
                self.current_channel = (channel_idx + 1) % self.channels.len();
                true
            }
            Err(task) => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to free workers, oldest first, until either runs out.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Worker disconnected; keep the task and stop.
                    self.queued_tasks.push_front(task);
                    return;
                }
            }
        }
    }

    /// Handles every result the workers have finished, submitting render commands
    /// to `target` and publishing follow-up tasks.
    ///
    /// # Returns
    /// The number of results handled.
    pub fn process_completed_tasks(&mut self, target: &mut dyn RenderTarget) -> usize {
        let mut tasks_to_queue = Vec::new();
        let mut handled = 0;
        for (index, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        handled += 1;
                        let (new_tasks, commands) = result.handle_result(&self.context);
                        for command in commands {
                            target.submit(command);
                        }
                        tasks_to_queue.extend(new_tasks);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.alive {
                            error!(
                                "Chunk worker {index} stopped, dropping {} in-flight tasks",
                                channel.num_tasks_in_flight
                            );
                        }
                        channel.alive = false;
                        channel.num_tasks_in_flight = 0;
                        break;
                    }
                }
            }
        }

        if !tasks_to_queue.is_empty() {
            debug!("Publishing {} follow-up tasks", tasks_to_queue.len());
        }
        for task in tasks_to_queue {
            self.publish_task(task);
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, sync::Arc, time::Duration};

    use super::*;
    use crate::{
        core::MtResource,
        engine_state::{
            rendering::render_target::{DrawList, RenderCommand},
            voxels::{height_field::HeightField, world::World},
        },
    };

    struct Echo {
        value: usize,
        spawn_child: bool,
        log: MtResource<Vec<usize>>,
    }

    struct EchoResult {
        value: usize,
        spawn_child: bool,
        log: MtResource<Vec<usize>>,
    }

    impl Task for Echo {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            Box::new(EchoResult {
                value: self.value,
                spawn_child: self.spawn_child,
                log: self.log.clone(),
            })
        }
    }

    impl TaskResult for EchoResult {
        fn handle_result(
            self: Box<Self>,
            _context: &TaskContext,
        ) -> (Vec<Box<dyn Task + Send>>, Vec<RenderCommand>) {
            self.log.get_mut().push(self.value);
            let children: Vec<Box<dyn Task + Send>> = if self.spawn_child {
                vec![Box::new(Echo {
                    value: self.value + 1000,
                    spawn_child: false,
                    log: self.log.clone(),
                })]
            } else {
                Vec::new()
            };
            (children, Vec::new())
        }
    }

    fn context() -> TaskContext {
        TaskContext {
            world: MtResource::new(World::new(
                Arc::new(HeightField::default()),
                NonZeroUsize::new(4).unwrap(),
            )),
        }
    }

    fn drain(manager: &mut TaskManager) {
        let mut target = DrawList::new();
        for _ in 0..10_000 {
            manager.process_completed_tasks(&mut target);
            manager.process_queued_tasks();
            if manager.is_idle() {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("task manager did not become idle");
    }

    #[test]
    fn runs_every_task_and_follow_up() {
        let log = MtResource::new(Vec::new());
        let mut manager = TaskManager::new(3, context());
        for value in 0..10 {
            manager.publish_task(Box::new(Echo {
                value,
                spawn_child: value % 2 == 0,
                log: log.clone(),
            }));
        }
        assert!(manager.in_flight_count() <= 3 * MAX_TASKS_IN_FLIGHT);

        drain(&mut manager);

        let mut seen = log.get().clone();
        seen.sort_unstable();
        let mut expected: Vec<usize> = (0..10).chain((0..10).step_by(2).map(|v| v + 1000)).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    struct Explode;

    impl Task for Explode {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            panic!("task failed");
        }
    }

    #[test]
    fn panicking_task_retires_its_worker() {
        let log = MtResource::new(Vec::new());
        let mut manager = TaskManager::new(2, context());
        manager.publish_task(Box::new(Explode));
        for value in 0..4 {
            manager.publish_task(Box::new(Echo {
                value,
                spawn_child: false,
                log: log.clone(),
            }));
        }

        drain(&mut manager);

        assert_eq!(manager.worker_count(), 1);
        assert_eq!(manager.in_flight_count(), 0);
        let mut seen = log.get().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn without_workers_tasks_stay_queued() {
        let log = MtResource::new(Vec::new());
        let mut manager = TaskManager::new(0, context());
        assert!(!manager.publish_task(Box::new(Echo {
            value: 1,
            spawn_child: false,
            log: log.clone(),
        })));
        manager.process_queued_tasks();
        assert_eq!(manager.queued_count(), 1);
        assert!(!manager.is_idle());
        assert!(log.get().is_empty());
    }
}
