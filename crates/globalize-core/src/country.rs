//! Country records as served by the country data API, plus the region filter.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One country as returned by the upstream API.
///
/// Only the fields the application reads are modelled; everything else in the
/// upstream payload is ignored. `cca3` is the key used everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub cca3: String,
    pub name: CountryName,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub capital: Vec<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default)]
    pub languages: BTreeMap<String, String>,
    #[serde(default)]
    pub currencies: Currencies,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub borders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryName {
    pub common: String,
    #[serde(default)]
    pub official: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Currencies keyed by ISO code, kept in the order the upstream payload lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Currencies(Vec<(String, Currency)>);

impl Currencies {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Currency)> {
        self.0.iter().map(|(code, currency)| (code.as_str(), currency))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Currencies {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(code, currency)| (code, currency)))
    }
}

impl<'de> Deserialize<'de> for Currencies {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CurrenciesVisitor;

        impl<'de> Visitor<'de> for CurrenciesVisitor {
            type Value = Currencies;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of currency codes to currencies")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, Currency)> = Vec::new();
                while let Some((code, currency)) = map.next_entry::<String, Currency>()? {
                    if !entries.iter().any(|(seen, _)| *seen == code) {
                        entries.push((code, currency));
                    }
                }
                Ok(Currencies(entries))
            }
        }

        deserializer.deserialize_map(CurrenciesVisitor)
    }
}

impl Country {
    pub fn common_name(&self) -> &str {
        &self.name.common
    }

    /// First listed capital, if any.
    pub fn primary_capital(&self) -> Option<&str> {
        self.capital.first().map(String::as_str)
    }

    /// Code of the first currency in upstream order.
    pub fn primary_currency(&self) -> Option<&str> {
        self.currencies.iter().next().map(|(code, _)| code)
    }

    pub fn flag_url(&self) -> Option<&str> {
        self.flags.svg.as_deref().or(self.flags.png.as_deref())
    }

    pub fn in_region(&self, region: Region) -> bool {
        match region {
            Region::All => true,
            other => self.region == other.as_str(),
        }
    }
}

/// Geographic grouping used as a filter dimension.
///
/// `All` is the "no filter" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[default]
    All,
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
    Antarctic,
}

impl Region {
    pub const VALUES: [Region; 7] = [
        Region::All,
        Region::Africa,
        Region::Americas,
        Region::Asia,
        Region::Europe,
        Region::Oceania,
        Region::Antarctic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::All => "All",
            Region::Africa => "Africa",
            Region::Americas => "Americas",
            Region::Asia => "Asia",
            Region::Europe => "Europe",
            Region::Oceania => "Oceania",
            Region::Antarctic => "Antarctic",
        }
    }

    pub fn is_all(self) -> bool {
        self == Region::All
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        match Region::VALUES
            .iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
        {
            Some(region) => Ok(*region),
            None => bail!(
                "Unknown region '{}'. Expected one of: {}",
                wanted,
                Region::VALUES
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Minimal country record for tests.
    pub fn country(code: &str, name: &str, region: &str) -> Country {
        Country {
            cca3: code.to_string(),
            name: CountryName {
                common: name.to_string(),
                official: name.to_string(),
            },
            flags: Flags::default(),
            population: 0,
            capital: Vec::new(),
            region: region.to_string(),
            subregion: None,
            languages: BTreeMap::new(),
            currencies: Currencies::default(),
            area: None,
            borders: Vec::new(),
        }
    }
}
