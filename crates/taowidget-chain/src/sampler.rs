//! Reconstruction of balance and stake history from point-in-time queries.
//!
//! One height is sampled per day going back from the current block (see
//! [`taowidget_core::sample_heights`]). Balance heights are queried
//! concurrently; stake heights strictly one after another, newest first.
//! A failing height is dropped from the series and recorded in
//! [`SampleReport::skipped`]; only failing to read the current block fails
//! the whole run.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use subxt::utils::AccountId32;
use taowidget_core::{
    BlockNumber, DailyData, HistoricalData, Metric, merge_daily, rao_to_tao, sample_heights,
    sample_timestamp,
};

use crate::client::ChainConnection;
use crate::error::ChainError;
use crate::queries::balance::free_balance_at;
use crate::queries::stake::root_stake_at;

/// Outcome of sampling one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleReport {
    pub metric: Metric,
    /// Block the sampling window was anchored to.
    pub current_block: BlockNumber,
    /// Successful samples, newest block first.
    pub samples: Vec<HistoricalData>,
    /// Heights whose query failed, newest first.
    pub skipped: Vec<BlockNumber>,
}

/// Balance and stake merged per day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyReport {
    pub days: Vec<DailyData>,
    /// Heights dropped from either series.
    pub skipped: usize,
}

/// Samples history for a fixed lookback window.
#[derive(Debug, Clone, Copy)]
pub struct BlockSampler {
    days: u32,
    now: DateTime<Utc>,
}

impl BlockSampler {
    /// Sampler for the last `days` days, dated relative to the current time.
    pub fn new(days: u32) -> Self {
        Self::at_time(days, Utc::now())
    }

    /// Sampler dating its samples relative to `now`.
    pub fn at_time(days: u32, now: DateTime<Utc>) -> Self {
        Self { days, now }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Free balance history of `coldkey`.
    pub async fn balance_history<C: ChainConnection + ?Sized>(
        &self,
        conn: &C,
        coldkey: &AccountId32,
    ) -> Result<SampleReport, ChainError> {
        let current_block = conn.current_block().await?;
        Ok(self.sample_balance(conn, coldkey, current_block).await)
    }

    /// Root stake history of `coldkey`.
    pub async fn stake_history<C: ChainConnection + ?Sized>(
        &self,
        conn: &C,
        coldkey: &AccountId32,
    ) -> Result<SampleReport, ChainError> {
        let current_block = conn.current_block().await?;
        Ok(self.sample_stake(conn, coldkey, current_block).await)
    }

    /// Balance and stake history of `coldkey`, merged per day.
    pub async fn daily_history<C: ChainConnection + ?Sized>(
        &self,
        conn: &C,
        coldkey: &AccountId32,
    ) -> Result<DailyReport, ChainError> {
        let current_block = conn.current_block().await?;
        let balance = self.sample_balance(conn, coldkey, current_block).await;
        let stake = self.sample_stake(conn, coldkey, current_block).await;

        Ok(DailyReport {
            days: merge_daily(&balance.samples, &stake.samples),
            skipped: balance.skipped.len() + stake.skipped.len(),
        })
    }

    async fn sample_balance<C: ChainConnection + ?Sized>(
        &self,
        conn: &C,
        coldkey: &AccountId32,
        current_block: BlockNumber,
    ) -> SampleReport {
        let heights = sample_heights(current_block, self.days);
        tracing::debug!(
            "Sampling balance of {} at {} blocks from #{}",
            coldkey,
            heights.len(),
            current_block
        );

        let outcomes = join_all(heights.into_iter().map(|block| async move {
            let outcome = async {
                let hash = conn.block_hash(block).await?;
                free_balance_at(conn, coldkey, hash).await
            }
            .await;
            (block, outcome)
        }))
        .await;

        let mut report = SampleReport::empty(Metric::Balance, current_block);
        for (block, outcome) in outcomes {
            match outcome {
                Ok(free) => report.push(self.now, block, rao_to_tao(free)),
                Err(e) => {
                    tracing::warn!("Dropping balance sample at block {}: {}", block, e);
                    report.skipped.push(block);
                }
            }
        }
        report
    }

    async fn sample_stake<C: ChainConnection + ?Sized>(
        &self,
        conn: &C,
        coldkey: &AccountId32,
        current_block: BlockNumber,
    ) -> SampleReport {
        let heights = sample_heights(current_block, self.days);
        tracing::debug!(
            "Sampling stake of {} at {} blocks from #{}",
            coldkey,
            heights.len(),
            current_block
        );

        let mut report = SampleReport::empty(Metric::Stake, current_block);
        for block in heights {
            let outcome = async {
                let hash = conn.block_hash(block).await?;
                root_stake_at(conn, coldkey, hash).await
            }
            .await;

            match outcome {
                Ok(stake) => report.push(self.now, block, rao_to_tao(stake)),
                Err(e) => {
                    tracing::warn!("Skipping stake sample at block {}: {}", block, e);
                    report.skipped.push(block);
                }
            }
        }
        report
    }
}

impl SampleReport {
    fn empty(metric: Metric, current_block: BlockNumber) -> Self {
        Self {
            metric,
            current_block,
            samples: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn push(&mut self, now: DateTime<Utc>, block: BlockNumber, value: f64) {
        let timestamp = sample_timestamp(now, self.current_block, block);
        self.samples.push(HistoricalData::new(block, timestamp, value));
    }
}
