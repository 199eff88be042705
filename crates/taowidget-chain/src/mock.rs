//! In-memory chain for tests.
//!
//! [`MockChain`] is a [`Connector`] whose connections answer from a shared
//! table of per-block balances and stakes. Failures can be injected per block,
//! per connection attempt, and on close. Every connection gets a distinct id
//! so tests can tell a reused connection from a fresh one.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use subxt::dynamic::Value;
use subxt::ext::scale_value::{Composite, Primitive, ValueDef};
use taowidget_core::{Balance, BlockNumber};

use crate::client::{BlockHash, ChainConnection, Connector};
use crate::error::ChainError;
use crate::queries::balance::{ACCOUNT_ENTRY, SYSTEM_PALLET};
use crate::queries::stake::{STAKE_INFO_API, STAKE_INFO_FOR_COLDKEY};

/// A number as decoded from chain data.
pub fn number(n: u128) -> Value<u32> {
    Value {
        value: ValueDef::Primitive(Primitive::U128(n)),
        context: 0,
    }
}

/// A struct with named fields.
pub fn record(fields: Vec<(&str, Value<u32>)>) -> Value<u32> {
    Value {
        value: ValueDef::Composite(Composite::Named(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )),
        context: 0,
    }
}

/// A sequence, tuple or tuple struct.
pub fn list(items: Vec<Value<u32>>) -> Value<u32> {
    Value {
        value: ValueDef::Composite(Composite::Unnamed(items)),
        context: 0,
    }
}

/// An `AccountId32` as decoded from chain data.
pub fn account(bytes: [u8; 32]) -> Value<u32> {
    list(vec![list(
        bytes.iter().map(|b| number(u128::from(*b))).collect(),
    )])
}

/// `System.Account` value with the given free balance.
pub fn account_info(free: Balance) -> Value<u32> {
    record(vec![
        ("nonce", number(0)),
        ("consumers", number(0)),
        ("providers", number(1)),
        ("sufficients", number(0)),
        (
            "data",
            record(vec![
                ("free", number(free)),
                ("reserved", number(0)),
                ("frozen", number(0)),
                ("flags", number(0)),
            ]),
        ),
    ])
}

/// One `StakeInfo` entry. `netuid` is wrapped in a newtype like recent
/// runtimes do.
pub fn stake_info(hotkey: [u8; 32], netuid: u16, stake: Balance) -> Value<u32> {
    record(vec![
        ("hotkey", account(hotkey)),
        ("coldkey", account([0xCC; 32])),
        ("netuid", list(vec![number(u128::from(netuid))])),
        ("stake", number(stake)),
        ("locked", number(0)),
        ("emission", number(0)),
        ("tao_emission", number(0)),
        ("drain", number(0)),
        ("is_registered", number(1)),
    ])
}

#[derive(Default)]
struct ChainState {
    current_block: BlockNumber,
    head_unavailable: bool,
    balances: HashMap<BlockNumber, Balance>,
    stakes: HashMap<BlockNumber, Vec<(u16, Balance)>>,
    failing_balance: HashSet<BlockNumber>,
    failing_stake: HashSet<BlockNumber>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<ChainState>,
    last_id: AtomicUsize,
    connects: AtomicUsize,
    pending_connect_failures: AtomicUsize,
    fail_close: AtomicBool,
    closed: Mutex<Vec<usize>>,
    stake_calls: Mutex<Vec<BlockNumber>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared in-memory chain; clones see the same data and counters.
#[derive(Clone, Default)]
pub struct MockChain {
    inner: Arc<Inner>,
}

impl MockChain {
    /// Chain whose latest block is `current_block` and where nothing is held.
    pub fn new(current_block: BlockNumber) -> Self {
        let chain = Self::default();
        lock(&chain.inner.state).current_block = current_block;
        chain
    }

    /// Free balance (in rao) at `block`.
    pub fn with_balance(self, block: BlockNumber, rao: Balance) -> Self {
        lock(&self.inner.state).balances.insert(block, rao);
        self
    }

    /// Add a stake entry (in rao) on `netuid` at `block`.
    pub fn with_stake(self, block: BlockNumber, netuid: u16, rao: Balance) -> Self {
        lock(&self.inner.state)
            .stakes
            .entry(block)
            .or_default()
            .push((netuid, rao));
        self
    }

    /// Balance queries at `block` fail.
    pub fn failing_balance_at(self, block: BlockNumber) -> Self {
        lock(&self.inner.state).failing_balance.insert(block);
        self
    }

    /// Stake queries at `block` fail.
    pub fn failing_stake_at(self, block: BlockNumber) -> Self {
        lock(&self.inner.state).failing_stake.insert(block);
        self
    }

    /// The next `count` connection attempts fail.
    pub fn failing_connects(self, count: usize) -> Self {
        self.fail_next_connects(count);
        self
    }

    /// Closing a connection reports an error (after being recorded).
    pub fn failing_close(self) -> Self {
        self.inner.fail_close.store(true, Ordering::SeqCst);
        self
    }

    /// Fetching the latest block fails.
    pub fn without_head(self) -> Self {
        self.set_head_unavailable(true);
        self
    }

    pub fn fail_next_connects(&self, count: usize) {
        self.inner
            .pending_connect_failures
            .store(count, Ordering::SeqCst);
    }

    pub fn set_head_unavailable(&self, unavailable: bool) {
        lock(&self.inner.state).head_unavailable = unavailable;
    }

    /// Connection attempts so far, failed ones included.
    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Ids of closed connections, in close order.
    pub fn closed_connections(&self) -> Vec<usize> {
        lock(&self.inner.closed).clone()
    }

    /// Blocks passed to the stake runtime API, in call order.
    pub fn stake_calls(&self) -> Vec<BlockNumber> {
        lock(&self.inner.stake_calls).clone()
    }
}

#[async_trait]
impl Connector for MockChain {
    type Connection = MockConnection;

    async fn connect(&self) -> Result<MockConnection, ChainError> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);

        let failures = &self.inner.pending_connect_failures;
        if failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ChainError::Connection("mock endpoint unreachable".into()));
        }

        let id = self.inner.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MockConnection {
            id,
            chain: self.clone(),
        })
    }
}

/// One connection to a [`MockChain`].
pub struct MockConnection {
    id: usize,
    chain: MockChain,
}

impl MockConnection {
    pub fn id(&self) -> usize {
        self.id
    }

    fn block_of(hash: BlockHash) -> BlockNumber {
        hash.to_low_u64_be() as BlockNumber
    }
}

#[async_trait]
impl ChainConnection for MockConnection {
    async fn current_block(&self) -> Result<BlockNumber, ChainError> {
        let state = lock(&self.chain.inner.state);
        if state.head_unavailable {
            return Err(ChainError::Rpc("mock head unavailable".into()));
        }
        Ok(state.current_block)
    }

    async fn block_hash(&self, block: BlockNumber) -> Result<BlockHash, ChainError> {
        let state = lock(&self.chain.inner.state);
        if block > state.current_block {
            return Err(ChainError::BlockNotFound(block));
        }
        Ok(BlockHash::from_low_u64_be(u64::from(block)))
    }

    async fn query_storage(
        &self,
        pallet: &str,
        entry: &str,
        _keys: Vec<Value>,
        at: BlockHash,
    ) -> Result<Option<Value<u32>>, ChainError> {
        if (pallet, entry) != (SYSTEM_PALLET, ACCOUNT_ENTRY) {
            return Err(ChainError::Storage(format!("unknown entry {pallet}::{entry}")));
        }
        let block = Self::block_of(at);
        let state = lock(&self.chain.inner.state);
        if state.failing_balance.contains(&block) {
            return Err(ChainError::Storage(format!("state of block {block} pruned")));
        }
        Ok(state.balances.get(&block).map(|free| account_info(*free)))
    }

    async fn runtime_call(
        &self,
        api: &str,
        method: &str,
        _args: Vec<Value>,
        at: BlockHash,
    ) -> Result<Value<u32>, ChainError> {
        if (api, method) != (STAKE_INFO_API, STAKE_INFO_FOR_COLDKEY) {
            return Err(ChainError::RuntimeApi(format!("unknown method {api}_{method}")));
        }
        let block = Self::block_of(at);
        lock(&self.chain.inner.stake_calls).push(block);

        let state = lock(&self.chain.inner.state);
        if state.failing_stake.contains(&block) {
            return Err(ChainError::RuntimeApi(format!("state of block {block} pruned")));
        }
        let entries = state
            .stakes
            .get(&block)
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, (netuid, stake))| stake_info([i as u8; 32], *netuid, *stake))
                    .collect()
            })
            .unwrap_or_default();
        Ok(list(entries))
    }

    async fn close(&mut self) -> Result<(), ChainError> {
        lock(&self.chain.inner.closed).push(self.id);
        if self.chain.inner.fail_close.load(Ordering::SeqCst) {
            return Err(ChainError::Connection("mock close failed".into()));
        }
        Ok(())
    }
}
