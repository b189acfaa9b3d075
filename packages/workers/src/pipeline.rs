//! Producers and consumers sharing one bounded queue.

use std::{collections::BTreeMap, thread};

use handoff_channel::{Receiver, Sender, bounded};

use crate::join;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub producers: usize,
    pub consumers: usize,
    pub capacity: usize,
    pub items_per_producer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            producers: 2,
            consumers: 2,
            capacity: 3,
            items_per_producer: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("A pipeline needs at least one producer")]
    NoProducers,
    #[error("A pipeline needs at least one consumer")]
    NoConsumers,
}

/// The `seq`-th value enqueued by `producer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub producer: usize,
    pub seq: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub config: PipelineConfig,
    /// Items in the order each consumer received them, indexed by consumer.
    pub received: Vec<Vec<Item>>,
}

impl PipelineReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.received.iter().map(Vec::len).sum()
    }

    /// Whether every consumer saw each producer's items in the order they
    /// were produced.
    #[must_use]
    pub fn is_fifo_per_producer(&self) -> bool {
        self.received.iter().all(|items| {
            let mut last: BTreeMap<usize, usize> = BTreeMap::new();

            items.iter().all(|item| {
                let in_order = last.get(&item.producer).is_none_or(|&seq| item.seq > seq);
                last.insert(item.producer, item.seq);
                in_order
            })
        })
    }

    /// Whether every produced item was received by exactly one consumer.
    #[must_use]
    pub fn is_exactly_once(&self) -> bool {
        let mut all: Vec<Item> = self.received.iter().flatten().copied().collect();
        all.sort_unstable();

        let expected = (0..self.config.producers).flat_map(|producer| {
            (0..self.config.items_per_producer).map(move |seq| Item { producer, seq })
        });

        all.into_iter().eq(expected)
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// # Errors
    ///
    /// * [`PipelineError::NoProducers`] if `config.producers` is zero
    /// * [`PipelineError::NoConsumers`] if `config.consumers` is zero
    pub const fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        if config.producers == 0 {
            return Err(PipelineError::NoProducers);
        }
        if config.consumers == 0 {
            return Err(PipelineError::NoConsumers);
        }

        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every producer and consumer to completion. The queue is closed
    /// once all producers have finished, which lets the consumers drain it
    /// and stop.
    #[must_use]
    pub fn run(&self) -> PipelineReport {
        let config = self.config;
        let (tx, rx) = bounded::<Item>(config.capacity);

        let received = thread::scope(|s| {
            let consumers: Vec<_> = (0..config.consumers)
                .map(|consumer| {
                    let rx = rx.clone();
                    s.spawn(move || consume(consumer, &rx))
                })
                .collect();
            drop(rx);

            let producers: Vec<_> = (0..config.producers)
                .map(|producer| {
                    let tx = tx.clone();
                    s.spawn(move || produce(producer, config.items_per_producer, &tx))
                })
                .collect();

            for producer in producers {
                join(producer);
            }

            if let Err(e) = tx.close() {
                log::warn!("pipeline: {e}");
            }

            consumers.into_iter().map(join).collect()
        });

        PipelineReport { config, received }
    }
}

fn produce(producer: usize, items: usize, tx: &Sender<Item>) {
    for seq in 0..items {
        log::trace!("producer {producer}: sending {seq}");

        if let Err(e) = tx.send(Item { producer, seq }) {
            log::error!("producer {producer}: stopped at {seq}: {e}");
            return;
        }
    }

    log::debug!("producer {producer}: done after {items} item(s)");
}

fn consume(consumer: usize, rx: &Receiver<Item>) -> Vec<Item> {
    let received: Vec<Item> = rx.iter().collect();
    log::debug!("consumer {consumer}: received {} item(s)", received.len());
    received
}
