use serde_repr::{Deserialize_repr, Serialize_repr};
#[allow(unused_imports)]
use strum::EnumCount;
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, EnumString};

/// All the cities of the built-in Europe board.
///
/// # JSON
/// Cities are serialized as an 8-bit unsigned integer, which is also their station id on the
/// board built by [`crate::map::Map::europe`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize_repr,
    Display,
    EnumCountMacro,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Serialize_repr,
)]
#[repr(u8)]
pub enum City {
    Amsterdam = 0,
    Angora = 1,
    Athina = 2,
    Barcelona = 3,
    Berlin = 4,
    Brest = 5,
    Brindisi = 6,
    Bruxelles = 7,
    Bucuresti = 8,
    Budapest = 9,
    Cadiz = 10,
    Constantinople = 11,
    Danzig = 12,
    Dieppe = 13,
    Edinburgh = 14,
    Erzurum = 15,
    Essen = 16,
    Frankfurt = 17,
    Kharkov = 18,
    Kobenhavn = 19,
    Kyiv = 20,
    Lisboa = 21,
    London = 22,
    Madrid = 23,
    Marseille = 24,
    Moskva = 25,
    Munchen = 26,
    Palermo = 27,
    Pamplona = 28,
    Paris = 29,
    Petrograd = 30,
    Riga = 31,
    Roma = 32,
    Rostov = 33,
    Sarajevo = 34,
    Sevastopol = 35,
    Smolensk = 36,
    Smyrna = 37,
    Sochi = 38,
    Sofia = 39,
    Stockholm = 40,
    Venezia = 41,
    Warszawa = 42,
    Wien = 43,
    Wilno = 44,
    Zagrab = 45,
    Zurich = 46,
}

/// Top-level representation of a connection between two cities.
pub type CityToCity = (City, City);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn city_count() {
        assert_eq!(City::COUNT, 47);
    }

    #[test]
    fn city_discriminants_are_contiguous() {
        for (index, city) in City::iter().enumerate() {
            assert_eq!(city as usize, index);
        }
    }

    #[test]
    fn city_to_string() {
        assert_eq!(City::Amsterdam.to_string(), "Amsterdam");
        assert_eq!(City::Kobenhavn.to_string(), "Kobenhavn");
        assert_eq!(City::Zurich.to_string(), "Zurich");
    }

    #[test]
    fn city_from_string() {
        assert_eq!(City::from_str("Paris"), Ok(City::Paris));
        assert!(City::from_str("Atlantis").is_err());
    }

    #[test]
    fn city_to_json() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&City::Edinburgh)?, "14");
        assert_eq!(serde_json::to_string(&City::Paris)?, "29");

        Ok(())
    }

    #[test]
    fn json_to_city() -> serde_json::Result<()> {
        assert_eq!(serde_json::from_str::<City>("43")?, City::Wien);
        assert_eq!(serde_json::from_str::<City>("0")?, City::Amsterdam);

        Ok(())
    }

    #[test]
    fn invalid_json_to_city() {
        assert!(serde_json::from_str::<City>("47").is_err());
    }
}
