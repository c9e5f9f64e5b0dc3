//! Company preferences that feed connector defaults.

use super::{TransformContext, TransformError};
use crate::source::Preferences;

/// Target account of the default shipping account, when shipping is enabled.
pub async fn shipping_account(
    ctx: &TransformContext<'_>,
    preferences: &Preferences,
) -> Result<Option<String>, TransformError> {
    match preferences.shipping_account_id() {
        Some(id) => Ok(Some(ctx.account_name(id).await?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{Harness, parse};
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_shipping_account_when_enabled() {
        let harness = Harness::new();
        harness.seed_account("85", "Shipping Income - QB - AL", None, None).await;
        let enabled: Preferences = parse(json!({
            "SalesFormsPrefs": {"AllowShipping": true, "DefaultShippingAccount": "85"}
        }));
        let disabled: Preferences = parse(json!({
            "SalesFormsPrefs": {"AllowShipping": false, "DefaultShippingAccount": "85"}
        }));

        assert_eq!(
            shipping_account(&harness.ctx(), &enabled).await.unwrap().as_deref(),
            Some("Shipping Income - QB - AL")
        );
        assert_eq!(shipping_account(&harness.ctx(), &disabled).await.unwrap(), None);
    }
}
