//! Taxpayer profile table
//!
//! The profile table is kept as a single Arrow record batch: the pipeline only
//! needs its `TaxpayerID` column for the join, and the descriptive columns are
//! carried through untouched to the report.

use anyhow::Context;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use log::warn;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::models::filing::columns::TAXPAYER_ID;
use crate::utils::arrow::extract_string;

const TABLE_NAME: &str = "profiles";

/// Static taxpayer attributes indexed by `TaxpayerID`
#[derive(Debug, Clone)]
pub struct ProfileTable {
    batch: RecordBatch,
    ids: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl ProfileTable {
    /// Build the profile table from all batches of the loaded table
    ///
    /// When a `TaxpayerID` occurs more than once, the first row wins and the
    /// duplicates are reported in the log.
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        let Some(first) = batches.first() else {
            return Err(Error::EmptyInput {
                table: TABLE_NAME.to_string(),
            }
            .into());
        };
        let batch = concat_batches(&first.schema(), batches)
            .context("Profile batches do not share a schema")?;
        if batch.num_rows() == 0 {
            return Err(Error::EmptyInput {
                table: TABLE_NAME.to_string(),
            }
            .into());
        }

        let ids = extract_string(&batch, TAXPAYER_ID, true)?
            .into_iter()
            .enumerate()
            .map(|(row, id)| {
                id.ok_or_else(|| {
                    anyhow::Error::from(Error::MissingValue {
                        table: TABLE_NAME.to_string(),
                        column: TAXPAYER_ID.to_string(),
                        row,
                    })
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut index = FxHashMap::default();
        let mut duplicates = 0usize;
        for (row, id) in ids.iter().enumerate() {
            if index.contains_key(id) {
                duplicates += 1;
                continue;
            }
            index.insert(id.clone(), row);
        }
        if duplicates > 0 {
            warn!("Profile table has {duplicates} duplicate TaxpayerID rows; keeping the first occurrence");
        }

        Ok(Self { batch, ids, index })
    }

    /// Row of the profile for a taxpayer, if present
    #[must_use]
    pub fn row_of(&self, taxpayer_id: &str) -> Option<usize> {
        self.index.get(taxpayer_id).copied()
    }

    /// Whether a profile exists for the taxpayer
    #[must_use]
    pub fn contains(&self, taxpayer_id: &str) -> bool {
        self.index.contains_key(taxpayer_id)
    }

    /// Taxpayer identifiers in table order, duplicates included
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Number of distinct taxpayers in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The underlying table
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Names of the descriptive columns (every column except `TaxpayerID`)
    #[must_use]
    pub fn attribute_columns(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .filter(|name| name != TAXPAYER_ID)
            .collect()
    }
}
