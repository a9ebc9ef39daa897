//! Minibatch parsing against an external predictive model.
//!
//! Every sentence gets its own [`Configuration`]. Each round takes up to
//! `batch_size` unfinished configurations, asks the model once for one
//! transition per configuration, and applies the proposals. A configuration
//! leaves the working set when it completes or when its proposal is illegal.
//! Illegal proposals are not retried: the parse keeps whatever arcs it had.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{Configuration, DepArc, Sentence, Transition};

/// Anything that proposes the next transition for a batch of configurations.
///
/// `predict` must return one proposal per configuration, in order. Missing
/// proposals retire the unanswered configurations.
pub trait Model {
    fn predict(&self, batch: &[&Configuration]) -> Vec<Transition>;
}

impl<M: Model + ?Sized> Model for &M {
    fn predict(&self, batch: &[&Configuration]) -> Vec<Transition> {
        (**self).predict(batch)
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn predict(&self, batch: &[&Configuration]) -> Vec<Transition> {
        (**self).predict(batch)
    }
}

/// Parses `sentences` in minibatches and returns one arc list per sentence, in input order.
pub fn minibatch_parse<I, M>(sentences: I, model: &M, batch_size: usize) -> Vec<Vec<DepArc>>
where
    I: IntoIterator<Item = Sentence>,
    M: Model + ?Sized,
{
    run_minibatches(sentences, model, batch_size)
        .into_iter()
        .map(Configuration::into_arcs)
        .collect()
}

/// Like [`minibatch_parse`] but returns the final configurations, so callers
/// can tell finished parses from stuck ones.
pub fn run_minibatches<I, M>(sentences: I, model: &M, batch_size: usize) -> Vec<Configuration>
where
    I: IntoIterator<Item = Sentence>,
    M: Model + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut configs: Vec<Configuration> = sentences.into_iter().map(Configuration::new).collect();
    // A sentence with no words is complete before the first round.
    let mut unfinished: Vec<usize> = (0..configs.len())
        .filter(|&i| !configs[i].is_complete())
        .collect();

    let mut round = 0usize;
    while !unfinished.is_empty() {
        let take = batch_size.min(unfinished.len());
        let (minibatch, rest) = unfinished.split_at(take);
        let proposals = {
            let batch: Vec<&Configuration> = minibatch.iter().map(|&i| &configs[i]).collect();
            model.predict(&batch)
        };
        if proposals.len() < minibatch.len() {
            warn!(
                expected = minibatch.len(),
                got = proposals.len(),
                "model returned too few proposals"
            );
        }
        debug!(round, batch = minibatch.len(), unfinished = unfinished.len(), "minibatch");

        let mut next = Vec::with_capacity(unfinished.len());
        for (slot, &index) in minibatch.iter().enumerate() {
            let Some(proposal) = proposals.get(slot) else {
                continue;
            };
            let config = &mut configs[index];
            match config.apply(proposal) {
                Ok(()) if config.is_complete() => {}
                Ok(()) => next.push(index),
                Err(e) => debug!(sentence = index, %proposal, error = %e, "retiring stuck parse"),
            }
        }
        next.extend_from_slice(rest);
        unfinished = next;
        round += 1;
    }
    configs
}

/// Splits `sentences` into `workers` contiguous partitions and runs a private
/// minibatch loop over each on the rayon pool. Output order matches input order.
pub fn parallel_minibatch_parse<M>(
    sentences: Vec<Sentence>,
    model: &M,
    batch_size: usize,
    workers: usize,
) -> Vec<Vec<DepArc>>
where
    M: Model + Sync + ?Sized,
{
    if sentences.is_empty() {
        return Vec::new();
    }
    let chunk = sentences.len().div_ceil(workers.max(1));
    sentences
        .par_chunks(chunk)
        .map(|part| minibatch_parse(part.iter().cloned(), model, batch_size))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
