//! App Store storefront registry: the closed set of valid 2-letter codes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every storefront Apple serves the customer-reviews feed for, sorted by code.
const STOREFRONTS: &[(&str, &str)] = &[
    ("AE", "United Arab Emirates"),
    ("AI", "Anguilla"),
    ("AM", "Armenia"),
    ("AO", "Angola"),
    ("AR", "Argentina"),
    ("AT", "Austria"),
    ("AU", "Australia"),
    ("AZ", "Azerbaijan"),
    ("BB", "Barbados"),
    ("BE", "Belgium"),
    ("BG", "Bulgaria"),
    ("BH", "Bahrain"),
    ("BM", "Bermuda"),
    ("BN", "Brunei Darussalam"),
    ("BO", "Bolivia"),
    ("BR", "Brazil"),
    ("BW", "Botswana"),
    ("BY", "Belarus"),
    ("BZ", "Belize"),
    ("CA", "Canada"),
    ("CH", "Switzerland"),
    ("CL", "Chile"),
    ("CN", "China"),
    ("CO", "Colombia"),
    ("CR", "Costa Rica"),
    ("CY", "Cyprus"),
    ("CZ", "Czech Republic"),
    ("DE", "Germany"),
    ("DK", "Denmark"),
    ("DM", "Dominica"),
    ("DZ", "Algeria"),
    ("EC", "Ecuador"),
    ("EE", "Estonia"),
    ("EG", "Egypt"),
    ("ES", "Spain"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("GB", "Great Britain"),
    ("GD", "Grenada"),
    ("GH", "Ghana"),
    ("GR", "Greece"),
    ("GT", "Guatemala"),
    ("GY", "Guyana"),
    ("HK", "Hong Kong"),
    ("HN", "Honduras"),
    ("HR", "Croatia"),
    ("HU", "Hungary"),
    ("ID", "Indonesia"),
    ("IE", "Ireland"),
    ("IL", "Israel"),
    ("IN", "India"),
    ("IS", "Iceland"),
    ("IT", "Italy"),
    ("JM", "Jamaica"),
    ("JO", "Jordan"),
    ("JP", "Japan"),
    ("KE", "Kenya"),
    ("KR", "South Korea"),
    ("KW", "Kuwait"),
    ("KY", "Cayman Islands"),
    ("LB", "Lebanon"),
    ("LK", "Sri Lanka"),
    ("LT", "Lithuania"),
    ("LU", "Luxembourg"),
    ("LV", "Latvia"),
    ("MG", "Madagascar"),
    ("MK", "Republic of North Macedonia"),
    ("ML", "Mali"),
    ("MO", "Macau"),
    ("MS", "Montserrat"),
    ("MT", "Malta"),
    ("MU", "Mauritius"),
    ("MX", "Mexico"),
    ("MY", "Malaysia"),
    ("NE", "Niger"),
    ("NG", "Nigeria"),
    ("NI", "Nicaragua"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("NP", "Nepal"),
    ("NZ", "New Zealand"),
    ("OM", "Oman"),
    ("PA", "Panama"),
    ("PE", "Peru"),
    ("PH", "Philippines"),
    ("PK", "Pakistan"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("PY", "Paraguay"),
    ("QA", "Qatar"),
    ("RO", "Romania"),
    ("RU", "Russia"),
    ("SA", "Saudi Arabia"),
    ("SE", "Sweden"),
    ("SG", "Singapore"),
    ("SI", "Slovenia"),
    ("SK", "Slovakia"),
    ("SN", "Senegal"),
    ("SR", "Suriname"),
    ("SV", "El Salvador"),
    ("TH", "Thailand"),
    ("TN", "Tunisia"),
    ("TR", "Turkey"),
    ("TW", "Taiwan"),
    ("TZ", "Tanzania"),
    ("UA", "Ukraine"),
    ("UG", "Uganda"),
    ("US", "United States"),
    ("UY", "Uruguay"),
    ("UZ", "Uzbekistan"),
    ("VE", "Venezuela"),
    ("VG", "British Virgin Islands"),
    ("VN", "Vietnam"),
    ("YE", "Yemen"),
    ("ZA", "South Africa"),
];

/// A validated App Store storefront code.
///
/// Can only be constructed through the registry, so a `Storefront` held
/// anywhere in the program is guaranteed to be one of the known codes.
/// Ordering follows the upper-case code, which keeps iteration over storefront
/// sets deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Storefront {
    code: &'static str,
}

impl Storefront {
    /// Returns the upper-case 2-letter code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Returns the lower-case code used in feed URLs and file names.
    pub fn code_lower(&self) -> String {
        self.code.to_ascii_lowercase()
    }

    /// Returns the storefront's display name.
    pub fn name(&self) -> &'static str {
        match STOREFRONTS.binary_search_by_key(&self.code, |&(code, _)| code) {
            Ok(idx) => STOREFRONTS[idx].1,
            Err(_) => unreachable!("storefront constructed outside the registry"),
        }
    }

    /// Returns all registered storefronts in code order.
    pub fn all() -> impl Iterator<Item = Storefront> {
        STOREFRONTS.iter().map(|(code, _)| Storefront { code })
    }
}

impl fmt::Display for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl FromStr for Storefront {
    type Err = UnknownStorefront;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        STOREFRONTS
            .binary_search_by_key(&code.as_str(), |&(code, _)| code)
            .map(|idx| Storefront { code: STOREFRONTS[idx].0 })
            .map_err(|_| UnknownStorefront(vec![code]))
    }
}

/// One or more requested codes that are not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown storefront code(s): {}", .0.join(", "))]
pub struct UnknownStorefront(pub Vec<String>);

/// Validates a set of requested storefront codes against the registry.
///
/// Codes are upper-cased and deduplicated. An empty request means "all
/// storefronts". Every unknown code is collected into a single error, sorted,
/// so the caller sees the complete list rather than the first offender.
pub fn validate(requested: &[String]) -> Result<BTreeSet<Storefront>, UnknownStorefront> {
    if requested.is_empty() {
        return Ok(Storefront::all().collect());
    }

    let mut valid = BTreeSet::new();
    let mut unknown = BTreeSet::new();
    for code in requested {
        match code.parse::<Storefront>() {
            Ok(storefront) => {
                valid.insert(storefront);
            }
            Err(UnknownStorefront(bad)) => {
                unknown.extend(bad);
            }
        }
    }

    if unknown.is_empty() {
        Ok(valid)
    } else {
        Err(UnknownStorefront(unknown.into_iter().collect()))
    }
}
