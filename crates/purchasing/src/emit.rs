//! Reading back the order number after the commit.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use procurebot_core::{FailureReason, OrderNumber};
use procurebot_navigation::NavigationClient;

use crate::error::FlowResult;
use crate::screen;

fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("regex for digit runs"))
}

/// First run of decimal digits in `text`.
pub fn extract_order_number(text: &str) -> Option<OrderNumber> {
    digits()
        .find(text)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(OrderNumber::new)
}

pub struct OutcomeEmitter;

impl OutcomeEmitter {
    /// Open the status message details and read the number from them.
    ///
    /// On success the details popup is closed and the transaction is left.
    pub fn emit<C: NavigationClient + ?Sized>(client: &C) -> FlowResult<OrderNumber> {
        let status_bar = client.require_address(screen::STATUS_BAR)?;
        client.double_click(&status_bar)?;

        let Some(text) = client.probe_dialog(screen::CONFIRMATION_LABEL)? else {
            warn!("no confirmation message after commit");
            return Err(FailureReason::UnknownWriteFailure.into());
        };
        let Some(number) = extract_order_number(&text) else {
            warn!(text = %text, "confirmation message carries no order number");
            return Err(FailureReason::UnknownWriteFailure.into());
        };

        match client.resolve_address(screen::POPUP_OK)? {
            Some(ok) => client.press(&ok)?,
            None => debug!("confirmation popup already closed"),
        }
        let back = client.require_address(screen::BACK_BUTTON)?;
        client.press(&back)?;

        info!(order_number = %number, "purchase order created");
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use procurebot_navigation::{Action, InMemorySession};
    use proptest::prelude::*;

    fn main_window() -> InMemorySession {
        let session = InMemorySession::new();
        session.put(screen::STATUS_BAR, "");
        session.put(screen::BACK_BUTTON, "");
        session
    }

    #[test]
    fn first_digit_run_is_the_order_number() {
        assert_eq!(
            extract_order_number("Order created 4500123456"),
            Some(OrderNumber::new(4_500_123_456))
        );
        assert_eq!(
            extract_order_number("标准采购订单已创建，编号 4500000017 (项目 12)"),
            Some(OrderNumber::new(4_500_000_017))
        );
        assert_eq!(extract_order_number("no number here"), None);
    }

    #[test]
    fn number_is_read_and_dialogs_closed() {
        let session = main_window();
        session.on(Action::DoubleClick(screen::STATUS_BAR.into()), |state| {
            state.put(screen::CONFIRMATION_LABEL, "Order created 4500123456");
            state.put(screen::POPUP_OK, "");
        });

        let number = OutcomeEmitter::emit(&session).unwrap();

        assert_eq!(number.value(), 4_500_123_456);
        let presses: Vec<Action> = session
            .actions()
            .into_iter()
            .filter(|a| matches!(a, Action::Press(_)))
            .collect();
        assert_eq!(
            presses,
            vec![
                Action::Press(screen::POPUP_OK.into()),
                Action::Press(screen::BACK_BUTTON.into())
            ]
        );
    }

    #[test]
    fn missing_confirmation_is_unknown_write_failure() {
        let session = main_window();
        let err = OutcomeEmitter::emit(&session).unwrap_err();
        assert_eq!(err, FlowError::Failed(FailureReason::UnknownWriteFailure));
    }

    #[test]
    fn confirmation_without_digits_is_unknown_write_failure() {
        let session = main_window();
        session.put(screen::CONFIRMATION_LABEL, "Document saved");
        let err = OutcomeEmitter::emit(&session).unwrap_err();
        assert_eq!(err, FlowError::Failed(FailureReason::UnknownWriteFailure));
        assert_eq!(session.count(&Action::Press(screen::BACK_BUTTON.into())), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        #[test]
        fn number_survives_surrounding_text(prefix in "[^0-9]{0,20}", number in 1u64..10_000_000_000, suffix in "[^0-9]{0,20}") {
            let text = format!("{prefix}{number}{suffix}");
            prop_assert_eq!(extract_order_number(&text), Some(OrderNumber::new(number)));
        }
    }
}
