//! Shipping fee and delivery date resolution.
//!
//! Shipping is priced from a free-text address using a fixed, ordered rate
//! table. Each row is a tier with its own keywords, flat fee and lead time.
//! The address is lowercased and scanned row by row; the first row with a
//! keyword that appears anywhere in the address wins, so an address naming
//! two known places resolves to whichever row comes first. Addresses that
//! match nothing fall through to [`DEFAULT_RULE`].
//!
//! Orders at or above [`FREE_SHIPPING_THRESHOLD`] ship free. The matched
//! tier still supplies the lead time for the delivery estimate.
//!
//! ```
//! use chrono::NaiveDate;
//! use halwa_core::Rupees;
//! use halwa_core::shipping::{ShippingTier, resolve_shipping};
//!
//! let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(); // Monday
//! let quote = resolve_shipping("12 Anna Salai, Chennai", Rupees::from_whole(1280), today);
//! assert_eq!(quote.tier, ShippingTier::Metro);
//! assert_eq!(quote.fee, Rupees::from_whole(99));
//! assert_eq!(quote.eta_days, 3);
//! assert_eq!(quote.eta_date, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
//! ```

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::Rupees;

/// Subtotal (in whole rupees) at which shipping becomes free.
pub const FREE_SHIPPING_THRESHOLD: u32 = 1499;

/// India Standard Time offset, used to decide what "today" is for the shop.
const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// Named bucket in the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingTier {
    /// Same town as the kitchen.
    Local,
    /// Neighbouring districts.
    Near,
    /// Large Tamil Nadu cities.
    MajorInState,
    /// Chennai.
    Metro,
    /// Anywhere else in Tamil Nadu.
    SameState,
    /// Metros in the neighbouring southern states.
    NeighboringMetro,
    /// Neighbouring southern states.
    NeighboringState,
    /// Metros elsewhere in India.
    DistantMetro,
    /// Remote and island regions.
    Remote,
    /// Nothing matched.
    Default,
}

impl ShippingTier {
    /// Every tier in rate-table order, default last.
    pub const ALL: [Self; 10] = [
        Self::Local,
        Self::Near,
        Self::MajorInState,
        Self::Metro,
        Self::SameState,
        Self::NeighboringMetro,
        Self::NeighboringState,
        Self::DistantMetro,
        Self::Remote,
        Self::Default,
    ];

    /// Stored identifier, matching the serde name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Near => "near",
            Self::MajorInState => "major_in_state",
            Self::Metro => "metro",
            Self::SameState => "same_state",
            Self::NeighboringMetro => "neighboring_metro",
            Self::NeighboringState => "neighboring_state",
            Self::DistantMetro => "distant_metro",
            Self::Remote => "remote",
            Self::Default => "default",
        }
    }

    /// Customer-facing description.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Local => "Local delivery",
            Self::Near => "Nearby districts",
            Self::MajorInState => "Tamil Nadu city",
            Self::Metro => "Chennai metro",
            Self::SameState => "Within Tamil Nadu",
            Self::NeighboringMetro => "South India metro",
            Self::NeighboringState => "South India",
            Self::DistantMetro => "National metro",
            Self::Remote => "Remote region",
            Self::Default => "Standard delivery",
        }
    }
}

impl std::str::FromStr for ShippingTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| format!("invalid shipping tier: {s}"))
    }
}

/// One row of the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierRule {
    pub tier: ShippingTier,
    /// Flat fee in whole rupees.
    pub fee: u32,
    /// Calendar days before the weekend adjustment.
    pub eta_days: u32,
    /// Lowercase substrings that select this row.
    pub keywords: &'static [&'static str],
}

/// Ordered rate table. Row order is the precedence order.
pub const RATE_TABLE: &[TierRule] = &[
    TierRule {
        tier: ShippingTier::Local,
        fee: 0,
        eta_days: 1,
        keywords: &["tirunelveli", "palayamkottai"],
    },
    TierRule {
        tier: ShippingTier::Near,
        fee: 40,
        eta_days: 2,
        keywords: &[
            "thoothukudi",
            "tuticorin",
            "tenkasi",
            "nagercoil",
            "kanyakumari",
            "virudhunagar",
            "sivakasi",
        ],
    },
    TierRule {
        tier: ShippingTier::MajorInState,
        fee: 79,
        eta_days: 3,
        keywords: &[
            "madurai",
            "coimbatore",
            "trichy",
            "tiruchirappalli",
            "salem",
            "erode",
            "tiruppur",
            "vellore",
            "thanjavur",
            "dindigul",
        ],
    },
    TierRule {
        tier: ShippingTier::Metro,
        fee: 99,
        eta_days: 3,
        keywords: &["chennai"],
    },
    TierRule {
        tier: ShippingTier::SameState,
        fee: 119,
        eta_days: 4,
        keywords: &["tamil nadu", "tamilnadu"],
    },
    TierRule {
        tier: ShippingTier::NeighboringMetro,
        fee: 149,
        eta_days: 4,
        keywords: &[
            "bengaluru",
            "bangalore",
            "hyderabad",
            "kochi",
            "cochin",
            "thiruvananthapuram",
            "trivandrum",
        ],
    },
    TierRule {
        tier: ShippingTier::NeighboringState,
        fee: 169,
        eta_days: 5,
        keywords: &[
            "kerala",
            "karnataka",
            "andhra pradesh",
            "telangana",
            "puducherry",
            "pondicherry",
        ],
    },
    TierRule {
        tier: ShippingTier::DistantMetro,
        fee: 199,
        eta_days: 5,
        keywords: &[
            "mumbai",
            "delhi",
            "kolkata",
            "pune",
            "ahmedabad",
            "jaipur",
            "lucknow",
        ],
    },
    TierRule {
        tier: ShippingTier::Remote,
        fee: 299,
        eta_days: 7,
        keywords: &[
            "jammu",
            "kashmir",
            "ladakh",
            "assam",
            "arunachal",
            "manipur",
            "meghalaya",
            "mizoram",
            "nagaland",
            "tripura",
            "sikkim",
            "andaman",
            "lakshadweep",
        ],
    },
];

/// Row used when no keyword matches.
pub const DEFAULT_RULE: TierRule = TierRule {
    tier: ShippingTier::Default,
    fee: 249,
    eta_days: 6,
    keywords: &[],
};

/// Which row an address resolved to, and the keyword that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMatch {
    pub rule: &'static TierRule,
    /// `None` for the default row.
    pub keyword: Option<&'static str>,
}

/// Scan the rate table for the first row whose keyword appears in `address`.
#[must_use]
pub fn match_address(address: &str) -> AddressMatch {
    let haystack = address.to_lowercase();
    RATE_TABLE
        .iter()
        .find_map(|rule| {
            rule.keywords
                .iter()
                .find(|keyword| haystack.contains(*keyword))
                .map(|keyword| AddressMatch {
                    rule,
                    keyword: Some(*keyword),
                })
        })
        .unwrap_or(AddressMatch {
            rule: &DEFAULT_RULE,
            keyword: None,
        })
}

/// Resolved fee and delivery estimate for one address and subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingQuote {
    pub tier: ShippingTier,
    pub fee: Rupees,
    pub eta_days: u32,
    pub eta_date: NaiveDate,
    pub free_shipping: bool,
}

/// Price shipping for `address` on an order worth `subtotal`, starting from `today`.
///
/// Never fails: an empty or unrecognised address gets the default row.
#[must_use]
pub fn resolve_shipping(address: &str, subtotal: Rupees, today: NaiveDate) -> ShippingQuote {
    let matched = match_address(address);
    let free_shipping = qualifies_for_free_shipping(subtotal);
    let fee = if free_shipping {
        Rupees::ZERO
    } else {
        Rupees::from_whole(matched.rule.fee)
    };

    ShippingQuote {
        tier: matched.rule.tier,
        fee,
        eta_days: matched.rule.eta_days,
        eta_date: estimate_delivery(today, matched.rule.eta_days),
        free_shipping,
    }
}

/// Whether `subtotal` meets [`FREE_SHIPPING_THRESHOLD`].
#[must_use]
pub fn qualifies_for_free_shipping(subtotal: Rupees) -> bool {
    subtotal >= Rupees::from_whole(FREE_SHIPPING_THRESHOLD)
}

/// Add `eta_days` to `today`, then push weekend arrivals to the next week.
///
/// A Sunday arrival moves one day and a Saturday arrival moves two. The
/// adjustment happens once; the shifted date is not checked again.
#[must_use]
pub fn estimate_delivery(today: NaiveDate, eta_days: u32) -> NaiveDate {
    let arrival = today
        .checked_add_days(Days::new(u64::from(eta_days)))
        .unwrap_or(NaiveDate::MAX);

    let skip = match arrival.weekday() {
        Weekday::Sun => 1,
        Weekday::Sat => 2,
        _ => 0,
    };

    arrival
        .checked_add_days(Days::new(skip))
        .unwrap_or(NaiveDate::MAX)
}

/// The shop's current calendar date (India Standard Time).
#[must_use]
pub fn shop_today(now: DateTime<Utc>) -> NaiveDate {
    FixedOffset::east_opt(IST_OFFSET_SECONDS)
        .map_or_else(|| now.date_naive(), |ist| now.with_timezone(&ist).date_naive())
}

/// Structured delivery address as captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ShippingAddress {
    /// All parts joined, so structured and free-text addresses resolve alike.
    #[must_use]
    pub fn matching_text(&self) -> String {
        [
            self.address.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.pincode.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2026-03-02 is a Monday.
    fn monday() -> NaiveDate {
        date(2026, 3, 2)
    }

    #[test]
    fn test_free_shipping_ignores_address() {
        for address in ["Tirunelveli", "Chennai", "Srinagar, Jammu and Kashmir", "", "Paris"] {
            for subtotal in [1499, 1500, 25_000] {
                let quote = resolve_shipping(address, Rupees::from_whole(subtotal), monday());
                assert_eq!(quote.fee, Rupees::ZERO, "{address} / {subtotal}");
                assert!(quote.free_shipping);
            }
        }
    }

    #[test]
    fn test_just_below_threshold_pays() {
        let quote = resolve_shipping("Madurai", Rupees::parse("1498.99").unwrap(), monday());
        assert!(!quote.free_shipping);
        assert_eq!(quote.fee, Rupees::from_whole(79));
    }

    #[test]
    fn test_local_zone() {
        let quote = resolve_shipping(
            "4 South Car Street, Palayamkottai",
            Rupees::from_whole(600),
            monday(),
        );
        assert_eq!(quote.tier, ShippingTier::Local);
        assert_eq!(quote.fee, Rupees::ZERO);
        assert_eq!(quote.eta_days, 1);
        assert!(!quote.free_shipping);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            match_address("TIRUNELVELI JUNCTION").rule.tier,
            ShippingTier::Local
        );
        assert_eq!(match_address("bEnGaLuRu").rule.tier, ShippingTier::NeighboringMetro);
    }

    #[test]
    fn test_first_row_wins_over_later_rows() {
        // Local city and a remote state in one string: the local row is scanned first.
        let matched = match_address("Tirunelveli, shipping to a friend in Assam");
        assert_eq!(matched.rule.tier, ShippingTier::Local);
        assert_eq!(matched.keyword, Some("tirunelveli"));

        // A known city beats the same-state fallback.
        assert_eq!(
            match_address("Coimbatore, Tamil Nadu").rule.tier,
            ShippingTier::MajorInState
        );
        // Same-state fallback beats neighbouring metros.
        assert_eq!(
            match_address("Hosur, Tamil Nadu, near Bangalore").rule.tier,
            ShippingTier::SameState
        );
    }

    #[test]
    fn test_each_tier_fee_and_days() {
        let cases = [
            ("Tenkasi", ShippingTier::Near, 40, 2),
            ("Salem", ShippingTier::MajorInState, 79, 3),
            ("Chennai", ShippingTier::Metro, 99, 3),
            ("Kumbakonam, Tamil Nadu", ShippingTier::SameState, 119, 4),
            ("Hyderabad", ShippingTier::NeighboringMetro, 149, 4),
            ("Mysuru, Karnataka", ShippingTier::NeighboringState, 169, 5),
            ("Andheri, Mumbai", ShippingTier::DistantMetro, 199, 5),
            ("Gangtok, Sikkim", ShippingTier::Remote, 299, 7),
        ];
        for (address, tier, fee, days) in cases {
            let quote = resolve_shipping(address, Rupees::from_whole(500), monday());
            assert_eq!(quote.tier, tier, "{address}");
            assert_eq!(quote.fee, Rupees::from_whole(fee), "{address}");
            assert_eq!(quote.eta_days, days, "{address}");
        }
    }

    #[test]
    fn test_unmatched_address_uses_default() {
        for address in ["", "   ", "221B Baker Street, London", "Bhopal, Madhya Pradesh"] {
            let quote = resolve_shipping(address, Rupees::from_whole(500), monday());
            assert_eq!(quote.tier, ShippingTier::Default, "{address:?}");
            assert_eq!(quote.fee, Rupees::from_whole(DEFAULT_RULE.fee));
            assert_eq!(quote.eta_days, 6);
        }
    }

    #[test]
    fn test_weekday_arrival_is_unchanged() {
        // Monday + 3 = Thursday
        assert_eq!(estimate_delivery(monday(), 3), date(2026, 3, 5));
    }

    #[test]
    fn test_saturday_arrival_moves_two_days() {
        // Monday + 5 = Saturday -> Monday
        assert_eq!(estimate_delivery(monday(), 5), date(2026, 3, 9));
    }

    #[test]
    fn test_sunday_arrival_moves_one_day() {
        // Monday + 6 = Sunday -> Monday
        assert_eq!(estimate_delivery(monday(), 6), date(2026, 3, 9));
    }

    #[test]
    fn test_adjustment_is_single_pass() {
        // Thursday + 2 = Saturday -> +2 = Monday, with no second check.
        let thursday = date(2026, 3, 5);
        let arrival = estimate_delivery(thursday, 2);
        assert_eq!(arrival, date(2026, 3, 9));
        assert_eq!(arrival.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_chennai_example() {
        let quote = resolve_shipping("Chennai", Rupees::from_whole(1280), monday());
        assert_eq!(quote.fee, Rupees::from_whole(99));
        assert_eq!(quote.eta_days, 3);
        assert_eq!(Rupees::from_whole(1280) + quote.fee, Rupees::from_whole(1379));
    }

    #[test]
    fn test_structured_address_matches_like_free_text() {
        let address = ShippingAddress {
            address: "12 Anna Salai".to_owned(),
            city: "Chennai".to_owned(),
            state: "Tamil Nadu".to_owned(),
            pincode: "600001".to_owned(),
        };
        assert_eq!(address.matching_text(), "12 Anna Salai, Chennai, Tamil Nadu, 600001");
        assert_eq!(match_address(&address.matching_text()).rule.tier, ShippingTier::Metro);
    }

    #[test]
    fn test_tier_identifier_matches_serde() {
        for tier in ShippingTier::ALL {
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{}\"", tier.as_str()));
            assert_eq!(tier.as_str().parse::<ShippingTier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_shop_today_uses_ist() {
        // 20:00 UTC on Saturday is already Sunday in India.
        let now = DateTime::parse_from_rfc3339("2026-03-07T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(shop_today(now), date(2026, 3, 8));
    }
}
