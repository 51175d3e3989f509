const BASE_PRICE: f64 = 1_000.0;
const PRICE_PER_KM: f64 = 20.0;
const PRICE_PER_KG: f64 = 80.0;
const PRICE_PER_M3: f64 = 400.0;
const INSURANCE_RATE: f64 = 0.01;
const PACKAGING_FEE: f64 = 2_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CargoType {
    General,
    Fragile,
    Dangerous,
    Perishable,
}

impl CargoType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "general" => Some(CargoType::General),
            "fragile" => Some(CargoType::Fragile),
            "dangerous" => Some(CargoType::Dangerous),
            "perishable" => Some(CargoType::Perishable),
            _ => None,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            CargoType::General => 1.0,
            CargoType::Fragile => 1.3,
            CargoType::Dangerous => 1.5,
            CargoType::Perishable => 1.4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Quote<'a> {
    pub distance: f64,
    pub cargo_weight: f64,
    pub cargo_volume: f64,
    pub cargo_type: &'a str,
    pub insurance: bool,
    pub packaging: bool,
}

impl Quote<'_> {
    pub fn sanitized(self) -> Self {
        Self {
            distance: self.distance.max(0.0),
            cargo_weight: self.cargo_weight.max(0.0),
            cargo_volume: self.cargo_volume.max(0.0),
            ..self
        }
    }
}

/// Prices a shipment. Unknown cargo types are priced as general cargo and
/// the final amount is rounded half-to-even.
pub fn compute_price(quote: &Quote<'_>) -> i64 {
    let multiplier = CargoType::parse(quote.cargo_type).map_or(1.0, |kind| kind.multiplier());

    let mut cost = BASE_PRICE
        + quote.distance * PRICE_PER_KM
        + quote.cargo_weight * PRICE_PER_KG
        + quote.cargo_volume * PRICE_PER_M3;
    cost *= multiplier;

    if quote.insurance {
        cost += cost * INSURANCE_RATE;
    }
    if quote.packaging {
        cost += PACKAGING_FEE;
    }

    cost.round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{Quote, compute_price};

    fn quote(cargo_type: &str, insurance: bool, packaging: bool) -> Quote<'_> {
        Quote {
            distance: 700.0,
            cargo_weight: 10.0,
            cargo_volume: 1.0,
            cargo_type,
            insurance,
            packaging,
        }
    }

    #[test]
    fn general_cargo_without_extras() {
        assert_eq!(compute_price(&quote("general", false, false)), 16_200);
    }

    #[test]
    fn fragile_insured_cargo() {
        // 16200 * 1.3 = 21060, +1% = 21270.6
        assert_eq!(compute_price(&quote("fragile", true, false)), 21_271);
    }

    #[test]
    fn packaging_is_a_flat_fee_after_insurance() {
        assert_eq!(compute_price(&quote("general", true, true)), 18_362);
    }

    #[test]
    fn unknown_cargo_type_uses_general_multiplier() {
        assert_eq!(
            compute_price(&quote("livestock", false, false)),
            compute_price(&quote("general", false, false))
        );
    }

    #[test]
    fn ties_round_to_even() {
        let mut low = quote("general", false, false);
        low.distance = 0.125;
        low.cargo_weight = 0.0;
        low.cargo_volume = 0.0;
        assert_eq!(compute_price(&low), 1_002);

        let mut high = low;
        high.distance = 0.375;
        assert_eq!(compute_price(&high), 1_008);
    }

    #[test]
    fn sanitized_clamps_negative_measurements() {
        let negative = Quote {
            distance: -50.0,
            cargo_weight: -1.0,
            cargo_volume: f64::NAN,
            cargo_type: "general",
            insurance: false,
            packaging: false,
        };
        assert_eq!(compute_price(&negative.sanitized()), 1_000);
    }

    proptest! {
        #[test]
        fn price_is_deterministic_and_non_negative(
            distance in 0.0f64..50_000.0,
            weight in 0.0f64..40_000.0,
            volume in 0.0f64..200.0,
            kind in prop::sample::select(vec!["general", "fragile", "dangerous", "perishable", "other"]),
            insurance in any::<bool>(),
            packaging in any::<bool>(),
        ) {
            let q = Quote { distance, cargo_weight: weight, cargo_volume: volume, cargo_type: kind, insurance, packaging };
            let first = compute_price(&q);
            prop_assert!(first >= 0);
            prop_assert_eq!(first, compute_price(&q));
        }

        #[test]
        fn doubling_distance_raises_price(
            distance in 1.0f64..50_000.0,
            weight in 0.0f64..40_000.0,
            volume in 0.0f64..200.0,
            kind in prop::sample::select(vec!["general", "fragile", "dangerous", "perishable"]),
            insurance in any::<bool>(),
            packaging in any::<bool>(),
        ) {
            let base = Quote { distance, cargo_weight: weight, cargo_volume: volume, cargo_type: kind, insurance, packaging };
            let doubled = Quote { distance: distance * 2.0, ..base };
            prop_assert!(compute_price(&doubled) > compute_price(&base));
        }
    }
}
