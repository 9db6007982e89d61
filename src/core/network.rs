//! # Collective Communication
//!
//! Implementations of [`CollectiveTransport`]. [`SingleProcess`] is the
//! degenerate one-member group used when running non-distributed.
//! [`LocalCluster`] wires several in-process ranks (typically one per
//! thread) through a shared rendezvous table, giving real
//! blocking-until-the-group-arrives semantics for gather, scatter,
//! barrier and group splitting.

use crate::core::error::{MaskPointsError, Result};
use crate::core::traits::CollectiveTransport;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Transport for a group consisting of this process only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl CollectiveTransport for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn gather(&self, local: u64) -> Result<Option<Vec<u64>>> {
        Ok(Some(vec![local]))
    }

    fn scatter(&self, values: Option<&[u64]>) -> Result<u64> {
        match values {
            Some([value]) => Ok(*value),
            Some(values) => Err(MaskPointsError::invalid_parameter(
                "scatter values",
                values.len().to_string(),
                "must hold exactly one value per group member (1)",
            )),
            None => Err(MaskPointsError::transport(
                "coordinator did not provide scatter values",
            )),
        }
    }

    fn barrier(&self) -> Result<()> {
        Ok(())
    }

    fn split_group(&mut self, _color: bool) -> Result<()> {
        Ok(())
    }

    fn reset_group(&mut self) {}
}

/// Key of one collective round: the members of the group (world ranks)
/// and the per-group sequence number of the call.
type RoundKey = (Vec<usize>, u64);

#[derive(Debug)]
struct Round {
    slots: Vec<Option<Vec<u64>>>,
    posted: usize,
    readers_left: usize,
}

impl Round {
    fn new(members: usize) -> Self {
        Round {
            slots: vec![None; members],
            posted: 0,
            readers_left: members,
        }
    }

    fn complete(&self) -> bool {
        self.posted == self.slots.len()
    }
}

#[derive(Debug, Default)]
struct RendezvousTable {
    rounds: HashMap<RoundKey, Round>,
}

#[derive(Debug)]
struct Shared {
    table: Mutex<RendezvousTable>,
    arrived: Condvar,
}

/// Builder for a set of in-process ranks that talk to each other.
#[derive(Debug, Clone)]
pub struct LocalCluster {
    world_size: usize,
    timeout: Option<Duration>,
}

impl LocalCluster {
    /// A cluster of `world_size` ranks (at least one).
    pub fn new(world_size: usize) -> Self {
        LocalCluster {
            world_size: world_size.max(1),
            timeout: None,
        }
    }

    /// Fail collectives that wait longer than `timeout` for the group.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// One transport per rank, indexed by world rank.
    pub fn transports(self) -> Vec<LocalTransport> {
        let shared = Arc::new(Shared {
            table: Mutex::new(RendezvousTable::default()),
            arrived: Condvar::new(),
        });
        log::debug!("Local cluster initialized: world_size={}", self.world_size);
        let world: Vec<usize> = (0..self.world_size).collect();
        (0..self.world_size)
            .map(|world_rank| LocalTransport {
                shared: Arc::clone(&shared),
                world_rank,
                world: world.clone(),
                members: world.clone(),
                sequences: RefCell::new(HashMap::new()),
                timeout: self.timeout,
            })
            .collect()
    }
}

/// One rank of a [`LocalCluster`]. Move it into the thread that plays
/// this rank.
#[derive(Debug)]
pub struct LocalTransport {
    shared: Arc<Shared>,
    world_rank: usize,
    world: Vec<usize>,
    members: Vec<usize>,
    sequences: RefCell<HashMap<Vec<usize>, u64>>,
    timeout: Option<Duration>,
}

impl LocalTransport {
    /// Rank of this transport in the world group.
    pub fn world_rank(&self) -> usize {
        self.world_rank
    }

    fn lock(&self) -> Result<MutexGuard<'_, RendezvousTable>> {
        self.shared
            .table
            .lock()
            .map_err(|_| MaskPointsError::transport("rendezvous table poisoned by a failed rank"))
    }

    fn next_key(&self) -> RoundKey {
        let mut sequences = self.sequences.borrow_mut();
        let seq = sequences.entry(self.members.clone()).or_insert(0);
        let key = (self.members.clone(), *seq);
        *seq += 1;
        key
    }

    /// Post `payload` for the current group and wait until every member has
    /// posted. Returns all payloads ordered by group rank.
    fn exchange(&self, payload: Vec<u64>) -> Result<Vec<Vec<u64>>> {
        let key = self.next_key();
        let group_size = self.members.len();
        let slot = self.rank();

        let mut table = self.lock()?;
        {
            let round = table
                .rounds
                .entry(key.clone())
                .or_insert_with(|| Round::new(group_size));
            round.slots[slot] = Some(payload);
            round.posted += 1;
            if round.complete() {
                self.shared.arrived.notify_all();
            }
        }

        let pending = |t: &mut RendezvousTable| t.rounds.get(&key).map_or(false, |r| !r.complete());
        table = match self.timeout {
            Some(timeout) => {
                let (guard, result) = self
                    .shared
                    .arrived
                    .wait_timeout_while(table, timeout, pending)
                    .map_err(|_| MaskPointsError::transport("rendezvous table poisoned"))?;
                if result.timed_out() {
                    return Err(MaskPointsError::transport(format!(
                        "rank {} timed out after {:?} waiting for group of {}",
                        self.world_rank, timeout, group_size
                    )));
                }
                guard
            }
            None => self
                .shared
                .arrived
                .wait_while(table, pending)
                .map_err(|_| MaskPointsError::transport("rendezvous table poisoned"))?,
        };

        let round = table
            .rounds
            .get_mut(&key)
            .ok_or_else(|| MaskPointsError::internal("collective round vanished"))?;
        let values = round
            .slots
            .iter()
            .map(|s| s.clone().unwrap_or_default())
            .collect();
        round.readers_left -= 1;
        if round.readers_left == 0 {
            table.rounds.remove(&key);
        }
        Ok(values)
    }
}

impl CollectiveTransport for LocalTransport {
    fn rank(&self) -> usize {
        self.members
            .iter()
            .position(|&r| r == self.world_rank)
            .unwrap_or(0)
    }

    fn size(&self) -> usize {
        self.members.len()
    }

    fn gather(&self, local: u64) -> Result<Option<Vec<u64>>> {
        let all = self.exchange(vec![local])?;
        if self.rank() != 0 {
            return Ok(None);
        }
        all.into_iter()
            .map(|v| {
                v.first()
                    .copied()
                    .ok_or_else(|| MaskPointsError::transport("member posted no gather value"))
            })
            .collect::<Result<Vec<u64>>>()
            .map(Some)
    }

    fn scatter(&self, values: Option<&[u64]>) -> Result<u64> {
        let payload = if self.rank() == 0 {
            match values {
                Some(values) if values.len() == self.size() => values.to_vec(),
                Some(values) => {
                    return Err(MaskPointsError::invalid_parameter(
                        "scatter values",
                        values.len().to_string(),
                        format!("must hold exactly one value per group member ({})", self.size()),
                    ))
                }
                None => {
                    return Err(MaskPointsError::transport(
                        "coordinator did not provide scatter values",
                    ))
                }
            }
        } else {
            Vec::new()
        };
        let all = self.exchange(payload)?;
        all.first()
            .and_then(|root| root.get(self.rank()).copied())
            .ok_or_else(|| MaskPointsError::transport("scatter payload missing from coordinator"))
    }

    fn barrier(&self) -> Result<()> {
        self.exchange(Vec::new()).map(|_| ())
    }

    fn split_group(&mut self, color: bool) -> Result<()> {
        let colors = self.exchange(vec![u64::from(color)])?;
        let members: Vec<usize> = self
            .members
            .iter()
            .zip(colors.iter())
            .filter(|(_, c)| c.first() == Some(&u64::from(color)))
            .map(|(&r, _)| r)
            .collect();
        log::debug!(
            "rank {} joined sub-group of {} (color {})",
            self.world_rank,
            members.len(),
            color
        );
        self.members = members;
        Ok(())
    }

    fn reset_group(&mut self) {
        self.members = self.world.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn run_cluster<F, T>(size: usize, f: F) -> Vec<T>
    where
        F: Fn(LocalTransport) -> T + Send + Sync,
        T: Send,
    {
        let transports = LocalCluster::new(size)
            .with_timeout(Duration::from_secs(10))
            .transports();
        let f = &f;
        thread::scope(|scope| {
            let handles: Vec<_> = transports
                .into_iter()
                .map(|t| scope.spawn(move || f(t)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        })
    }

    #[test]
    fn test_single_process_collectives() {
        let mut t = SingleProcess;
        assert_eq!(t.gather(7).unwrap(), Some(vec![7]));
        assert_eq!(t.scatter(Some(&[3])).unwrap(), 3);
        assert!(t.scatter(Some(&[1, 2])).is_err());
        t.split_group(false).unwrap();
        assert_eq!(t.size(), 1);
    }

    #[test]
    fn test_gather_then_scatter() {
        let results = run_cluster(4, |t| {
            let gathered = t.gather(t.rank() as u64 * 10).unwrap();
            let values = gathered.map(|v| v.iter().map(|x| x + 1).collect::<Vec<_>>());
            t.scatter(values.as_deref()).unwrap()
        });
        assert_eq!(results, vec![1, 11, 21, 31]);
    }

    #[test]
    fn test_gather_only_on_coordinator() {
        let results = run_cluster(3, |t| t.gather(5).unwrap());
        assert_eq!(results[0], Some(vec![5, 5, 5]));
        assert_eq!(results[1], None);
        assert_eq!(results[2], None);
    }

    #[test]
    fn test_split_and_reset_group() {
        let results = run_cluster(5, |mut t| {
            let world_rank = t.world_rank();
            t.split_group(world_rank % 2 == 0).unwrap();
            let sub = (t.rank(), t.size());
            let gathered = t.gather(world_rank as u64).unwrap();
            t.reset_group();
            t.barrier().unwrap();
            (sub, gathered, t.size())
        });
        // even ranks 0,2,4 form one group, odd ranks 1,3 the other
        assert_eq!(results[0].0, (0, 3));
        assert_eq!(results[2].0, (1, 3));
        assert_eq!(results[1].0, (0, 2));
        assert_eq!(results[0].1, Some(vec![0, 2, 4]));
        assert_eq!(results[1].1, Some(vec![1, 3]));
        assert_eq!(results[3].1, None);
        assert!(results.iter().all(|r| r.2 == 5));
    }

    #[test]
    fn test_missing_member_times_out() {
        let mut transports = LocalCluster::new(2)
            .with_timeout(Duration::from_millis(50))
            .transports();
        let lonely = transports.remove(0);
        let err = lonely.barrier().unwrap_err();
        assert_eq!(err.category(), "transport");
    }
}
