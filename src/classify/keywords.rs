//! Default rule lists for sender and content classification.
//!
//! All matching is case-insensitive substring matching against the
//! lower-cased sender or subject+body text. The lists are defaults:
//! classifiers take them as injected configuration, so tests and the
//! config file can extend or replace them.

/// Domain substrings whose senders must never be suppressed.
/// Whitelisting is an absolute override over every suppression rule.
pub const WHITELIST_DOMAINS: &[&str] = &[
    "fcps.edu",
    "fairfaxcounty.gov",
    "townsq.io",
    "virginiadmv",
    "irs.gov",
    "dmv.virginia.gov",
];

/// Sender substrings (domains and local-parts) known to be promotional
/// or automated. A match drops the item unless whitelisted.
pub const SUPPRESSED_SENDERS: &[&str] = &[
    "tiktok.com",
    "marketing@",
    "promo@",
    "newsletter@",
    "redditmail.com",
    "email.monarch.com",
    "rescueme.org",
    "membershipto",
    "bankofamerica.com",
    "ealerts.",
    "uspsinformeddelivery",
    "schwab.com",
    "creditkarma.com",
    "omadahealth.com",
    // Political mail
    "congressman",
    "senator",
    "representative",
    "house.gov",
    "senate.gov",
    "whitehouse.gov",
    "campaign@",
    "political",
    // Shipping and order notifications
    "amazon.com",
    "shipment-tracking@",
    "ship-confirm@",
    "auto-confirm@",
    "order-update@",
    "delivery@",
    "fedex.com",
    "ups.com",
    "usps.com",
    "dhl.com",
    "tracking@",
    "shipping@",
    "shippo.com",
    // Retail promotions
    "newsletters@audible.com",
    "audible.com",
    "email.bestbuy.com",
    "bestbuy.com",
    "emails.ugg.com",
    "ugg.com",
    "email@mail.salesforce.com",
    // Travel/cruise promotions
    "royalcaribbean",
    "carnival.com",
    "norwegiancruise",
    "princess.com",
    "hollandamerica.com",
    // Financial newsletters
    "motley.fool.com",
    "fool@",
    "fool.com",
    "motleyfool.com",
    "morningstar.com",
    "seekingalpha.com",
    "investopedia.com",
    "thestreet.com",
    "marketwatch.com",
    "barrons.com",
    // Tax/financial services promotions
    "turbotax@",
    "turbotax.intuit.com",
    "intuit.com",
    // Entertainment/streaming
    "hbo.com",
    "hbomax.com",
    "max.com",
    "warnermedia.com",
    // Healthcare appointment marketing
    "zocdoc.com",
    "mail5.zocdoc.com",
    // School/PTA promotional mail
    "notify@membershiptoolkit.com",
];

/// Phrases signaling genuine time-sensitivity. A match makes an item
/// unsuppressible regardless of any suppression phrase also present.
pub const PRIORITY_PHRASES: &[&str] = &[
    "school closed",
    "school closing",
    "schools closed",
    "school delay",
    "two-hour delay",
    "early dismissal",
    "appointment reminder",
    "appointment confirmed",
    "scheduled for",
    "appointment on",
    "field trip",
    "permission slip",
    "registration due",
    "renewal due",
    "expires",
    "property maintenance",
    "on site",
    "service scheduled",
    "today at",
    "this afternoon",
    "this evening",
    "same day",
    "deadline today",
];

/// Phrases signaling suppressible noise (shipping, sales language).
pub const SUPPRESSION_PHRASES: &[&str] = &[
    "shipped",
    "delivered",
    "delivery",
    "tracking",
    "package",
    "shipment",
    "order confirmation",
    "your order",
    "has shipped",
    "out for delivery",
    "item has been delivered",
    // Promotional/sales language
    "deal ends",
    "wish list",
    "sale",
    "discount",
    "trade up",
    "view as a web page",
    "membership now",
    "latest and greatest",
    "instant savings",
    "save up to",
    "up to $",
    "off before",
    "vacay alert",
    "vacation alert",
    "cruise deal",
    "limited time offer",
    "act now",
    "ends tonight",
    "last chance",
    "final hours",
    "flash sale",
    "mega savings",
    "huge savings",
    "score up to",
    "click here to",
    "shop now",
    "buy now",
    "order now",
    "free shipping",
    "free delivery",
    "no purchase necessary",
    "terms and conditions apply",
    "see details",
];

/// Phrases denoting account/confirmation/credential information worth
/// preserving independent of urgency.
pub const REFERENCE_PHRASES: &[&str] = &[
    "account number",
    "account #",
    "account:",
    "acct #",
    "confirmation number",
    "confirmation code",
    "confirmation #",
    "reference number",
    "reference #",
    "ref #",
    "policy number",
    "policy #",
    "claim number",
    "case number",
    "username:",
    "password:",
    "login:",
    "credentials",
    "activation code",
    "verification code",
    "access code",
    "membership number",
    "member #",
    "customer id",
    "customer number",
    "order number",
    "order #",
    "invoice #",
    "invoice number",
    "hoa",
    "homeowners association",
    "property account",
];

/// Generic urgency words checked by the item filter for neutral senders.
pub const URGENCY_WORDS: &[&str] = &[
    "urgent",
    "asap",
    "today",
    "deadline",
    "due",
    "important",
    "action required",
    "respond",
    "confirm",
];

/// Urgency words the thread scorer checks on a thread's latest item.
/// A deliberately narrower list than [`URGENCY_WORDS`].
pub const THREAD_URGENCY_WORDS: &[&str] =
    &["urgent", "asap", "today", "deadline", "action required"];

/// Subject keywords marking school/event notices, which go stale fast
/// and get the short freshness cutoff.
pub const SCHOOL_EVENT_KEYWORDS: &[&str] = &[
    "school",
    "sacc",
    "btb",
    "closed",
    "delay",
    "dismissal",
    "canceled",
    "cancelled",
];

/// Reply/forward prefixes stripped during subject normalization,
/// most specific first.
pub const REPLY_PREFIXES: &[&str] = &[
    "re: [external] re:",
    "re: [external]",
    "fw: [external]",
    "fwd:",
    "re:",
    "fw:",
];
