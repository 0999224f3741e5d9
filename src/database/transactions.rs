// ABOUTME: Labelled SQLite transaction wrapper for multi-statement recipe writes
// ABOUTME: An uncommitted wrapper rolls back on drop and logs which write was abandoned
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult, DatabaseResultExt};

/// Open write transaction
///
/// sqlx rolls the inner transaction back when it is dropped, so an early `?`
/// return between statements leaves no partial recipe behind.
pub struct TransactionGuard {
    label: &'static str,
    inner: Option<Transaction<'static, Sqlite>>,
}

impl TransactionGuard {
    pub(crate) fn new(label: &'static str, inner: Transaction<'static, Sqlite>) -> Self {
        debug!(write = label, "Transaction opened");
        Self {
            label,
            inner: Some(inner),
        }
    }

    /// Connection bound to the transaction
    ///
    /// # Errors
    ///
    /// Internal error once the transaction has been committed
    pub fn executor(&mut self) -> AppResult<&mut SqliteConnection> {
        self.inner
            .as_deref_mut()
            .ok_or_else(|| AppError::internal(format!("{} transaction already closed", self.label)))
    }

    /// Make every statement run so far durable
    ///
    /// # Errors
    ///
    /// Database error when `COMMIT` fails
    pub async fn commit(mut self) -> AppResult<()> {
        let Some(inner) = self.inner.take() else {
            return Err(AppError::internal(format!(
                "{} transaction already closed",
                self.label
            )));
        };
        inner
            .commit()
            .await
            .db_context(format_args!("Commit of {} failed", self.label))?;
        debug!(write = self.label, "Transaction committed");
        Ok(())
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        if self.inner.is_some() {
            warn!(write = self.label, "Transaction abandoned, rolling back");
        }
    }
}
