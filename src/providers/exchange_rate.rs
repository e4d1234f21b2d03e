use anyhow::anyhow;
use log::{info, warn};

use super::{ExchangeRateProvider, ProviderError};
use crate::utils::{retry, round_to_significant, RetryPolicy};

/// Significant digits kept from the provider's quote.
const RATE_SIGNIFICANT_DIGITS: u32 = 2;

/// Resolve the native/USD rate, trying `primary` then `fallback`.
///
/// Each provider gets the full retry policy. The returned rate is rounded to two
/// significant digits. Fails only when both providers are exhausted.
pub async fn resolve_exchange_rate(
    primary: &dyn ExchangeRateProvider,
    fallback: &dyn ExchangeRateProvider,
    network_name: &str,
    policy: RetryPolicy,
) -> anyhow::Result<f64> {
    let rate = match fetch_rate(primary, network_name, policy).await {
        Ok(rate) => rate,
        Err(primary_err) => {
            warn!(
                "{} failed after {} attempts, falling back to {}: {}",
                primary.name(),
                policy.attempts,
                fallback.name(),
                primary_err
            );

            fetch_rate(fallback, network_name, policy)
                .await
                .map_err(|fallback_err| {
                    anyhow!(
                        "All exchange rate providers failed for {}: {}: {}; {}: {}",
                        network_name,
                        primary.name(),
                        primary_err,
                        fallback.name(),
                        fallback_err
                    )
                })?
        },
    };

    let rounded = round_to_significant(rate, RATE_SIGNIFICANT_DIGITS);
    info!("Resolved {} USD rate: {} (raw {})", network_name, rounded, rate);
    Ok(rounded)
}

async fn fetch_rate(
    provider: &dyn ExchangeRateProvider,
    network_name: &str,
    policy: RetryPolicy,
) -> Result<f64, ProviderError> {
    let label = format!("{} rate lookup", provider.name());
    retry(policy, &label, || provider.native_usd_rate(network_name)).await
}
