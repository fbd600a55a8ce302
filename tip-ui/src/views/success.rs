use tip_core::Receipt;
use tip_core::amount::format_minor_units;

use super::ViewContext;

pub fn success_view(
    receipt: &Receipt,
    ctx: &ViewContext,
) -> String {
    format!(
        "Thank you!\n\
         Your tip of {} {} was sent with {}.\n\
         Receipt: {} ({})\n\
         \n\
         Back",
        format_minor_units(receipt.amount_minor_units),
        ctx.currency_symbol,
        receipt.method,
        receipt.id,
        receipt.confirmed_at.format("%Y-%m-%d %H:%M UTC"),
    )
}
