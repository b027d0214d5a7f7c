//! Derived display strings for parties: names and addresses.

/// Join the non-blank parts with `sep`, trimming each.
fn join_present<'a>(parts: impl IntoIterator<Item = &'a str>, sep: &str) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// "Given Middle Last".
#[must_use]
pub fn full_name(given: &str, middle: &str, last: &str) -> String {
    join_present([given, middle, last], " ")
}

/// "Last, Middle, Given", the sort key used by listings.
#[must_use]
pub fn lexical_name(given: &str, middle: &str, last: &str) -> String {
    join_present([last, middle, given], ", ")
}

/// Postal address parts of a party.
#[derive(Debug, Clone, Copy, Default)]
pub struct Address<'a> {
    pub street: &'a str,
    pub street_extra: &'a str,
    pub locality: &'a str,
    pub region: &'a str,
    pub country: &'a str,
    pub postal_code: &'a str,
}

impl Address<'_> {
    /// Street lines, locality, region and country. Legacy rows use `-` for
    /// an unknown street.
    #[must_use]
    pub fn without_postal_code(&self) -> String {
        let street = if self.street.trim() == "-" { "" } else { self.street };
        join_present(
            [street, self.street_extra, self.locality, self.region, self.country],
            ", ",
        )
    }

    /// The full address including the postal code, or `-` when there is none.
    #[must_use]
    pub fn with_postal_code(&self) -> String {
        if self.postal_code.trim().is_empty() {
            return "-".to_owned();
        }
        join_present([self.without_postal_code().as_str(), self.postal_code], ", ")
    }

    /// Google Maps place URL for the most specific address available.
    #[must_use]
    pub fn maps_url(&self) -> String {
        let with_code = self.with_postal_code();
        let target = if with_code == "-" {
            self.without_postal_code()
        } else {
            with_code
        };
        format!(
            "https://www.google.com/maps/place/{}",
            target.split_whitespace().collect::<Vec<_>>().join("+")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_skip_missing_middle() {
        assert_eq!(full_name("Ada", "", "Lovelace"), "Ada Lovelace");
        assert_eq!(lexical_name("Ada", "", "Lovelace"), "Lovelace, Ada");
        assert_eq!(full_name(" Ada ", "King", "Lovelace"), "Ada King Lovelace");
        assert_eq!(lexical_name("Ada", "King", "Lovelace"), "Lovelace, King, Ada");
    }

    #[test]
    fn address_variants() {
        let addr = Address {
            street: "78 Riverside Dr",
            street_extra: "",
            locality: "London",
            region: "Ontario",
            country: "Canada",
            postal_code: "N6H 1B4",
        };
        assert_eq!(addr.without_postal_code(), "78 Riverside Dr, London, Ontario, Canada");
        assert_eq!(
            addr.with_postal_code(),
            "78 Riverside Dr, London, Ontario, Canada, N6H 1B4"
        );
        assert_eq!(
            addr.maps_url(),
            "https://www.google.com/maps/place/78+Riverside+Dr,+London,+Ontario,+Canada,+N6H+1B4"
        );
    }

    #[test]
    fn placeholder_street_and_missing_postal_code() {
        let addr = Address {
            street: "-",
            locality: "London",
            country: "Canada",
            ..Address::default()
        };
        assert_eq!(addr.without_postal_code(), "London, Canada");
        assert_eq!(addr.with_postal_code(), "-");
        assert_eq!(addr.maps_url(), "https://www.google.com/maps/place/London,+Canada");
    }
}
