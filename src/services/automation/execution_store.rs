//! Persistence Schema (C10): `snipe_executions` table access
//!
//! Write-once-then-append-only rows, one per attempted snipe. Unlike
//! [`super::config_store::SnipeConfigStore`] this has no read cache: every
//! row is read at most once (by the orchestrator's single-in-flight check,
//! which instead relies on the database's unique partial index) and callers
//! always want the latest state.

use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::core::sniping::{
    ExecutionId, ExecutionStatus, HoneypotRiskScore, SlippageBps, SnipeExecution, UserId,
};
use crate::core::types::{TokenAddress, Timestamp};

fn row_to_execution(row: &sqlx::postgres::PgRow) -> AppResult<SnipeExecution> {
    let status_raw: String = row
        .try_get("status")
        .map_err(|e| AppError::database(format!("malformed snipe_executions row: {e}"), "decode"))?;
    let status = match status_raw.as_str() {
        "PENDING" => ExecutionStatus::Pending,
        "ANALYZING" => ExecutionStatus::Analyzing,
        "EXECUTING" => ExecutionStatus::Executing,
        "SUCCESS" => ExecutionStatus::Success,
        "FAILED" => ExecutionStatus::Failed,
        "SKIPPED" => ExecutionStatus::Skipped,
        other => return Err(AppError::database(format!("unknown execution status: {other}"), "decode")),
    };

    let id: uuid::Uuid = row.try_get("id").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let user_id: i64 = row.try_get("user_id").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let token_mint: String = row.try_get("token_mint").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let buy_amount_lamports: i64 = row.try_get("buy_amount_lamports").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let discovered_at: chrono::DateTime<chrono::Utc> = row.try_get("discovered_at").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let liquidity_lamports: i64 = row.try_get("liquidity_lamports").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let market_cap_usd: Option<i64> = row.try_get("market_cap_usd").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let honeypot_score: Option<i16> = row.try_get("honeypot_score").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let analyzed_at: Option<chrono::DateTime<chrono::Utc>> = row.try_get("analyzed_at").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let analysis_duration_ms: Option<i64> = row.try_get("analysis_duration_ms").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let slippage_bps: Option<i32> = row.try_get("slippage_bps").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let transaction_signature: Option<String> = row.try_get("transaction_signature").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let output_amount_tokens: Option<rust_decimal::Decimal> = row.try_get("output_amount_tokens").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let executed_at: Option<chrono::DateTime<chrono::Utc>> = row.try_get("executed_at").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let confirmed_at: Option<chrono::DateTime<chrono::Utc>> = row.try_get("confirmed_at").map_err(|e| AppError::database(format!("{e}"), "decode"))?;
    let failure_reason: Option<String> = row.try_get("failure_reason").map_err(|e| AppError::database(format!("{e}"), "decode"))?;

    Ok(SnipeExecution {
        id: ExecutionId(id),
        user_id: UserId(user_id),
        token_mint: TokenAddress::new_unchecked(token_mint),
        status,
        buy_amount_lamports: buy_amount_lamports as u64,
        discovered_at: Timestamp::from_datetime(discovered_at),
        liquidity_lamports: liquidity_lamports as u64,
        market_cap_usd: market_cap_usd.map(|v| v as u64),
        honeypot_score: honeypot_score.map(|v| HoneypotRiskScore::new(v as u8)).transpose()?,
        analyzed_at: analyzed_at.map(Timestamp::from_datetime),
        analysis_duration_ms: analysis_duration_ms.map(|v| v as u64),
        slippage_bps: slippage_bps.map(|v| SlippageBps::new(v as u16)).transpose()?,
        transaction_signature,
        output_amount_tokens,
        executed_at: executed_at.map(Timestamp::from_datetime),
        confirmed_at: confirmed_at.map(Timestamp::from_datetime),
        failure_reason,
    })
}

/// Postgres-backed store for [`SnipeExecution`] rows.
pub struct SnipeExecutionStore {
    pool: PgPool,
}

impl SnipeExecutionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a freshly-PENDING row. Fails with a database error if the
    /// unique in-flight index is violated (another execution for this
    /// user/mint pair is already non-terminal).
    #[instrument(skip(self, execution))]
    pub async fn create(&self, execution: &SnipeExecution) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO snipe_executions (
                id, user_id, token_mint, status, buy_amount_lamports,
                discovered_at, liquidity_lamports, market_cap_usd
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(execution.id.0)
        .bind(execution.user_id.0)
        .bind(execution.token_mint.as_str())
        .bind(execution.status.to_string())
        .bind(execution.buy_amount_lamports as i64)
        .bind(execution.discovered_at.into_inner())
        .bind(execution.liquidity_lamports as i64)
        .bind(execution.market_cap_usd.map(|v| v as i64))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to insert snipe execution: {e}"), "insert"))?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_analyzing(&self, id: ExecutionId) -> AppResult<()> {
        self.set_status(id, ExecutionStatus::Analyzing).await
    }

    /// Record honeypot screening results and transition to `EXECUTING`.
    #[instrument(skip(self))]
    pub async fn mark_executing(
        &self,
        id: ExecutionId,
        honeypot_score: HoneypotRiskScore,
        analyzed_at: Timestamp,
        analysis_duration_ms: u64,
        slippage_bps: SlippageBps,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE snipe_executions SET
                status = 'EXECUTING',
                honeypot_score = $2,
                analyzed_at = $3,
                analysis_duration_ms = $4,
                slippage_bps = $5
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(honeypot_score.value() as i16)
        .bind(analyzed_at.into_inner())
        .bind(analysis_duration_ms as i64)
        .bind(slippage_bps.value() as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to mark execution executing: {e}"), "update"))?;

        Ok(())
    }

    /// Record a confirmed swap and transition to the terminal `SUCCESS` state.
    #[instrument(skip(self))]
    pub async fn mark_success(
        &self,
        id: ExecutionId,
        transaction_signature: &str,
        output_amount_tokens: rust_decimal::Decimal,
        executed_at: Timestamp,
        confirmed_at: Timestamp,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE snipe_executions SET
                status = 'SUCCESS',
                transaction_signature = $2,
                output_amount_tokens = $3,
                executed_at = $4,
                confirmed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(transaction_signature)
        .bind(output_amount_tokens)
        .bind(executed_at.into_inner())
        .bind(confirmed_at.into_inner())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to mark execution success: {e}"), "update"))?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_failed(&self, id: ExecutionId, reason: &str) -> AppResult<()> {
        self.set_terminal(id, ExecutionStatus::Failed, reason).await
    }

    #[instrument(skip(self))]
    pub async fn mark_skipped(&self, id: ExecutionId, reason: &str) -> AppResult<()> {
        self.set_terminal(id, ExecutionStatus::Skipped, reason).await
    }

    async fn set_status(&self, id: ExecutionId, status: ExecutionStatus) -> AppResult<()> {
        sqlx::query("UPDATE snipe_executions SET status = $2 WHERE id = $1")
            .bind(id.0)
            .bind(status.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("failed to update execution status: {e}"), "update"))?;
        Ok(())
    }

    async fn set_terminal(&self, id: ExecutionId, status: ExecutionStatus, reason: &str) -> AppResult<()> {
        sqlx::query("UPDATE snipe_executions SET status = $2, failure_reason = $3 WHERE id = $1")
            .bind(id.0)
            .bind(status.to_string())
            .bind(reason)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("failed to close out execution: {e}"), "update"))?;
        Ok(())
    }

    /// Fetch a single execution by id, used by the orchestrator's shutdown
    /// drain to check whether in-flight work settled.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ExecutionId) -> AppResult<Option<SnipeExecution>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, token_mint, status, buy_amount_lamports,
                   discovered_at, liquidity_lamports, market_cap_usd,
                   honeypot_score, analyzed_at, analysis_duration_ms, slippage_bps,
                   transaction_signature, output_amount_tokens, executed_at,
                   confirmed_at, failure_reason
            FROM snipe_executions WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to load snipe execution: {e}"), "select"))?;

        row.as_ref().map(row_to_execution).transpose()
    }
}
