//! Ordered asset lists per protocol version.
//!
//! Asset prices are transmitted positionally, so the ordering of these lists
//! is part of the wire contract. A record's `prices` vector is only
//! meaningful against the list for its version, and the grading reference
//! values are summed in exactly this order.

/// Version 1 asset list (20 assets, `PNT` era).
pub const ASSETS_V1: &[&str] = &[
    "PNT", "USD", "EUR", "JPY", "GBP", "CAD", "CHF", "INR", "SGD", "CNY",
    "HKD", "XAU", "XAG", "XPD", "XPT", "XBT", "ETH", "LTC", "XBC", "FCT",
];

/// Version 2 asset list (32 assets, `PEG` replaces `PNT`).
pub const ASSETS_V2: &[&str] = &[
    "PEG", "USD", "EUR", "JPY", "GBP", "CAD", "CHF", "INR", "SGD", "CNY",
    "HKD", "KRW", "BRL", "PHP", "MXN", "XAU", "XAG", "XPD", "XPT", "XBT",
    "ETH", "LTC", "RVN", "XBC", "FCT", "BNB", "XLM", "ADA", "XMR", "DASH",
    "ZEC", "DCR",
];

/// Version 4 asset list (44 assets, currency and token expansion).
pub const ASSETS_V4: &[&str] = &[
    "PEG", "USD", "EUR", "JPY", "GBP", "CAD", "CHF", "INR", "SGD", "CNY",
    "HKD", "KRW", "BRL", "PHP", "MXN", "XAU", "XAG", "XPD", "XPT", "XBT",
    "ETH", "LTC", "RVN", "XBC", "FCT", "BNB", "XLM", "ADA", "XMR", "DASH",
    "ZEC", "DCR", "AUD", "NZD", "SEK", "NOK", "RUB", "ZAR", "TRY", "EOS",
    "LINK", "ATOM", "BAT", "XTZ",
];

/// Position of `code` in `list`, if present.
pub fn asset_index(list: &[&str], code: &str) -> Option<usize> {
    list.iter().position(|a| *a == code)
}
