//! Terminal rendering of server replies.
use converter_common::Reply;

/// Format `reply` as the text shown to the user.
pub fn render(reply: &Reply) -> String {
    match reply {
        Reply::AssetMenu { options } if options.is_empty() => {
            String::from("No cryptocurrencies are available right now. Type /start to try again.")
        }
        Reply::AssetMenu { options } => {
            let mut text = String::from("Choose a cryptocurrency:");
            for (i, listing) in options.iter().enumerate() {
                text.push_str(&format!("\n  [{}] {} ({})", i + 1, listing.display_name, listing.symbol));
            }
            text
        }
        Reply::CurrencyMenu { asset, options } => {
            let mut text = format!("Choose a currency for {}:", asset);
            for (i, currency) in options.iter().enumerate() {
                text.push_str(&format!("\n  [{}] {}", i + 1, currency.code()));
            }
            text
        }
        Reply::AmountPrompt { asset, .. } => format!("Enter the amount of {}:", asset),
        Reply::Conversion {
            amount,
            asset,
            currency,
            result,
        } => format!(
            "If you convert {} {} to {}, you will get {}.\n  [Enter] Convert again",
            amount,
            asset,
            currency.code(),
            result
        ),
        Reply::Help { text } => text.clone(),
        Reply::Error { message, .. } => format!("Error: {}", message),
    }
}
