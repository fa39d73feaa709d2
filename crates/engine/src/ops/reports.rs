use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    BudgetPatch, BudgetReport, EngineError, ResultEngine, SummaryEntry, User, analytics,
    validation::parse_budget,
};

use super::Engine;

#[derive(Serialize)]
struct ExportRow {
    id: String,
    created_time: String,
    description: String,
    amount: f64,
    category: &'static str,
}

impl Engine {
    pub async fn budget_report(&self, user_id: Uuid) -> ResultEngine<BudgetReport> {
        let user = self.require_user(user_id).await?;
        let transactions = self.gateway.select_transactions_by_user(user_id).await?;
        Ok(BudgetReport::compile(user, transactions))
    }

    /// Sets the budget from a patch. A patch without `budget` leaves the
    /// user untouched.
    pub async fn set_budget(&self, user_id: Uuid, patch: &BudgetPatch) -> ResultEngine<User> {
        let mut user = self.require_user(user_id).await?;
        let Some(raw) = &patch.budget else {
            return Ok(user);
        };
        let budget = parse_budget(raw)?;

        let rows = self.gateway.update_user_budget(user_id, budget).await?;
        if rows == 0 {
            return Err(EngineError::UpdateFailed);
        }
        tracing::debug!(user_id = %user_id, budget, "budget updated");

        user.budget = budget;
        Ok(user)
    }

    /// Spend over the last seven days.
    ///
    /// This feeds a best-effort statistic: an empty window, a missing
    /// aggregate and any gateway failure all yield `0.0`.
    pub async fn total_last_7_days(&self, user_id: Uuid, today: NaiveDate) -> f64 {
        match self
            .gateway
            .sum_spend_since(user_id, analytics::week_start(today))
            .await
        {
            Ok(total) => total.unwrap_or(0.0),
            Err(err) => {
                tracing::warn!(user_id = %user_id, "weekly total unavailable: {err}");
                0.0
            }
        }
    }

    /// Text report for `today`'s calendar month.
    pub async fn monthly_summary(&self, user_id: Uuid, today: NaiveDate) -> ResultEngine<SummaryEntry> {
        let Some(user) = self.gateway.select_user(user_id).await? else {
            return Ok(SummaryEntry::Error(EngineError::UserNotFound.to_string()));
        };
        let transactions = self.gateway.select_transactions_by_user(user_id).await?;
        let summary = analytics::monthly_summary(&user, &transactions, today);
        Ok(SummaryEntry::Summary(summary.to_string()))
    }

    /// Text listing of the last seven days.
    pub async fn weekly_summary(&self, user_id: Uuid, today: NaiveDate) -> ResultEngine<SummaryEntry> {
        let Some(user) = self.gateway.select_user(user_id).await? else {
            return Ok(SummaryEntry::Error(EngineError::UserNotFound.to_string()));
        };
        let transactions = self.gateway.select_transactions_by_user(user_id).await?;
        let summary = analytics::weekly_summary(&user, &transactions, today);
        Ok(SummaryEntry::Summary(summary.to_string()))
    }

    /// Writes the user's transactions as CSV, newest first.
    pub async fn export_csv<W: Write>(&self, user_id: Uuid, writer: W) -> ResultEngine<()> {
        self.require_user(user_id).await?;
        let transactions = self.gateway.select_transactions_by_user(user_id).await?;

        let mut writer = csv::Writer::from_writer(writer);
        for tx in transactions {
            writer
                .serialize(ExportRow {
                    id: tx.id.to_string(),
                    created_time: tx
                        .created_time
                        .map(|time| time.to_rfc3339())
                        .unwrap_or_default(),
                    description: tx.description,
                    amount: tx.amount,
                    category: tx.category.as_str(),
                })
                .map_err(|err| EngineError::ExportFailed(err.to_string()))?;
        }
        writer
            .flush()
            .map_err(|err| EngineError::ExportFailed(err.to_string()))?;
        Ok(())
    }
}
