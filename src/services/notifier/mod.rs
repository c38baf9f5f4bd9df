//! Notifier (C11)
//!
//! The only edge between the core sniping pipeline and the chat UI: the
//! executor calls [`Notifier::notify`] at most once per terminal execution
//! state, and this module is the sole place that knows how to turn a
//! [`UserId`] into a place a human will actually see the message.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use teloxide::prelude::*;
use tracing::{instrument, warn};

use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::core::sniping::UserId;
use crate::core::types::TokenAddress;

/// Which terminal outcome triggered the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
    Skip,
}

/// Fee components rendered into the success message's fee breakdown, per
/// spec §4.8 step 7. `network_fee_lamports` is the base Solana signature
/// fee, `jito_tip_lamports` the configured Jito tip (0 if unset), and
/// `price_impact_pct` the aggregator-quoted price impact.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeBreakdown {
    pub network_fee_lamports: u64,
    pub jito_tip_lamports: u64,
    pub price_impact_pct: f64,
}

/// Details rendered into the notification message. Gating by the user's
/// `notify_on_success`/`notify_on_failure` preference happens at the call
/// site, not here.
#[derive(Debug, Clone)]
pub struct NotificationContext {
    pub token_mint: TokenAddress,
    pub buy_amount_lamports: u64,
    pub transaction_signature: Option<String>,
    pub reason: Option<String>,
    /// Present only on success; rendered by the success template.
    pub fee_breakdown: Option<FeeBreakdown>,
}

/// A sink for user-facing execution outcomes.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        ctx: NotificationContext,
    ) -> AppResult<()>;
}

/// Render the configured success template, substituting its placeholders
/// with `ctx`'s fields. Falls back to a zeroed breakdown if `ctx` carries
/// none (should not happen on the success path, but keeps this infallible).
fn format_success_message(template: &str, ctx: &NotificationContext) -> String {
    let mint = ctx.token_mint.as_str();
    let sol = ctx.buy_amount_lamports as f64 / 1_000_000_000.0;
    let sig = ctx.transaction_signature.as_deref().unwrap_or("unknown");
    let fees = ctx.fee_breakdown.unwrap_or_default();
    let network_fee_sol = fees.network_fee_lamports as f64 / 1_000_000_000.0;
    let jito_tip_sol = fees.jito_tip_lamports as f64 / 1_000_000_000.0;

    template
        .replace("{mint}", mint)
        .replace("{sol}", &format!("{sol:.4}"))
        .replace("{tx}", sig)
        .replace("{network_fee_sol}", &format!("{network_fee_sol:.6}"))
        .replace("{jito_tip_sol}", &format!("{jito_tip_sol:.6}"))
        .replace("{price_impact_pct}", &format!("{:.2}", fees.price_impact_pct))
}

fn format_message(kind: NotificationKind, ctx: &NotificationContext, success_template: &str) -> String {
    let mint = ctx.token_mint.as_str();

    match kind {
        NotificationKind::Success => format_success_message(success_template, ctx),
        NotificationKind::Failure => {
            let reason = ctx.reason.as_deref().unwrap_or("unknown error");
            format!("❌ Snipe failed for {mint}\nReason: {reason}")
        }
        NotificationKind::Skip => {
            let reason = ctx.reason.as_deref().unwrap_or("policy rejection");
            format!("⏭️ Skipped {mint}\nReason: {reason}")
        }
    }
}

/// Telegram-backed [`Notifier`]: resolves `user_id -> telegram chat id`
/// against the `users` table at notify-time rather than requiring callers
/// to pre-resolve chat IDs.
pub struct TelegramNotifier {
    bot: Bot,
    pool: PgPool,
    success_template: String,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, pool: PgPool, success_template: String) -> Self {
        Self { bot, pool, success_template }
    }

    async fn chat_id(&self, user_id: UserId) -> AppResult<ChatId> {
        let row = sqlx::query("SELECT telegram_id FROM users WHERE id = $1")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("failed to resolve telegram id: {e}"), "select"))?;

        let row = row.ok_or_else(|| AppError::validation(format!("unknown user {user_id}")))?;
        let telegram_id: i64 = row
            .try_get("telegram_id")
            .map_err(|e| AppError::database(format!("malformed users row: {e}"), "decode"))?;

        Ok(ChatId(telegram_id))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, ctx))]
    async fn notify(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        ctx: NotificationContext,
    ) -> AppResult<()> {
        let chat_id = self.chat_id(user_id).await?;
        let text = format_message(kind, &ctx, &self.success_template);

        if let Err(e) = self.bot.send_message(chat_id, text).await {
            warn!("failed to deliver notification to user {}: {}", user_id, e);
            return Err(AppError::external_service("telegram".to_string(), format!("send_message failed: {e}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_success_template() -> String {
        "Sniped {mint}, spent {sol} SOL, tx {tx}. Fee breakdown: network {network_fee_sol}, \
         jito {jito_tip_sol}, impact {price_impact_pct}%"
            .to_string()
    }

    #[test]
    fn test_success_message_contains_signature_and_fee_breakdown() {
        let ctx = NotificationContext {
            token_mint: TokenAddress::new_unchecked("Mint1111111111111111111111111111111111111".to_string()),
            buy_amount_lamports: 1_000_000_000,
            transaction_signature: Some("sig123".to_string()),
            reason: None,
            fee_breakdown: Some(FeeBreakdown {
                network_fee_lamports: 5_000,
                jito_tip_lamports: 10_000,
                price_impact_pct: 0.42,
            }),
        };
        let message = format_message(NotificationKind::Success, &ctx, &test_success_template());
        assert!(message.contains("sig123"));
        assert!(message.contains("1.0000 SOL"));
        assert!(message.contains("Fee breakdown"));
        assert!(message.contains("0.42"));
    }

    #[test]
    fn test_failure_message_contains_reason() {
        let ctx = NotificationContext {
            token_mint: TokenAddress::new_unchecked("Mint1111111111111111111111111111111111111".to_string()),
            buy_amount_lamports: 500_000_000,
            transaction_signature: None,
            reason: Some("lease expired".to_string()),
            fee_breakdown: None,
        };
        let message = format_message(NotificationKind::Failure, &ctx, &test_success_template());
        assert!(message.contains("lease expired"));
    }
}
