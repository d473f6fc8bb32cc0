//! Read-only reference data: products, boxes, carrier rates, services and surcharges.
//!
//! Catalogs are plain values built once and passed into the planner by
//! reference. Nothing in here is mutated after construction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{BoxId, Dimensions, Product, ProductSize, TransportBox, ValidationError};

/// Products keyed by size.
#[derive(Clone, Debug)]
pub struct ProductCatalog {
    products: BTreeMap<ProductSize, Product>,
}

impl ProductCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.size, p)).collect(),
        }
    }

    /// The cube product line.
    pub fn builtin() -> Result<Self, ValidationError> {
        let products = [
            (ProductSize::S, (6.5, 6.5, 6.5), 0.073),
            (ProductSize::SLong, (6.5, 6.5, 9.7), 0.099),
            (ProductSize::L, (9.7, 9.7, 9.7), 0.169),
            (ProductSize::LLong, (9.7, 9.7, 16.2), 0.246),
            (ProductSize::LL, (13.0, 13.0, 13.0), 0.308),
        ]
        .into_iter()
        .map(|(size, (w, d, h), weight)| Product::new(size, Dimensions::new(w, d, h), weight))
        .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(products))
    }

    pub fn get(&self, size: ProductSize) -> Option<&Product> {
        self.products.get(&size)
    }

    /// Looks a product up by its size label ("S", "L-long", ...).
    pub fn lookup(&self, label: &str) -> Option<&Product> {
        label.parse::<ProductSize>().ok().and_then(|s| self.get(s))
    }

    pub fn all(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}

/// Transport boxes in catalog order.
#[derive(Clone, Debug)]
pub struct BoxCatalog {
    boxes: Vec<TransportBox>,
}

impl BoxCatalog {
    pub fn new(boxes: Vec<TransportBox>) -> Self {
        Self { boxes }
    }

    pub fn builtin() -> Result<Self, ValidationError> {
        let boxes = [
            ("No.1", (37.5, 37.0, 24.0), 10.0),
            ("No.2", (50.2, 40.2, 31.0), 15.0),
            ("No.5", (53.2, 40.2, 33.8), 20.0),
            ("No.6", (50.2, 40.2, 50.8), 25.0),
            ("No.15", (57.5, 40.2, 34.0), 25.0),
        ]
        .into_iter()
        .map(|(id, (w, d, h), max_weight)| {
            TransportBox::new(id, Dimensions::new(w, d, h), max_weight)
        })
        .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(boxes))
    }

    pub fn get(&self, id: &BoxId) -> Option<&TransportBox> {
        self.boxes.iter().find(|b| &b.id == id)
    }

    pub fn all(&self) -> &[TransportBox] {
        &self.boxes
    }
}

/// Parcel carriers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Carrier {
    Yamato,
    Sagawa,
    JapanPost,
}

impl Carrier {
    pub const ALL: [Carrier; 3] = [Carrier::Yamato, Carrier::Sagawa, Carrier::JapanPost];

    pub fn display_name(&self) -> &'static str {
        match self {
            Carrier::Yamato => "Yamato Transport",
            Carrier::Sagawa => "Sagawa Express",
            Carrier::JapanPost => "Japan Post",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Base price for shipping one box with one carrier.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ShippingRate {
    pub carrier: Carrier,
    pub box_id: BoxId,
    /// Price in yen.
    pub price: u32,
    pub transit_days: u32,
}

/// Fallback used when a carrier has no entry for a box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefaultRate {
    pub price: u32,
    pub transit_days: u32,
}

#[derive(Clone, Debug)]
pub struct RateTable {
    rates: Vec<ShippingRate>,
    defaults: BTreeMap<Carrier, DefaultRate>,
}

impl RateTable {
    /// Used for carriers without a configured default.
    pub const FALLBACK_DEFAULT: DefaultRate = DefaultRate {
        price: 800,
        transit_days: 2,
    };

    pub fn new(rates: Vec<ShippingRate>, defaults: BTreeMap<Carrier, DefaultRate>) -> Self {
        Self { rates, defaults }
    }

    pub fn builtin() -> Self {
        let table = [
            (Carrier::Yamato, [800, 1000, 1300, 1600, 2000], 1),
            (Carrier::Sagawa, [750, 950, 1250, 1550, 1950], 1),
            (Carrier::JapanPost, [850, 1050, 1350, 1650, 2050], 2),
        ];
        let box_ids = ["No.1", "No.2", "No.5", "No.6", "No.15"];

        let rates = table
            .iter()
            .flat_map(|(carrier, prices, days)| {
                box_ids
                    .iter()
                    .zip(prices.iter())
                    .map(move |(id, price)| ShippingRate {
                        carrier: *carrier,
                        box_id: BoxId::from(*id),
                        price: *price,
                        transit_days: *days,
                    })
            })
            .collect();

        let defaults = BTreeMap::from([
            (
                Carrier::Yamato,
                DefaultRate {
                    price: 800,
                    transit_days: 1,
                },
            ),
            (
                Carrier::Sagawa,
                DefaultRate {
                    price: 750,
                    transit_days: 1,
                },
            ),
            (
                Carrier::JapanPost,
                DefaultRate {
                    price: 700,
                    transit_days: 2,
                },
            ),
        ]);

        Self::new(rates, defaults)
    }

    /// Exact entry for (carrier, box), if any.
    pub fn lookup(&self, carrier: Carrier, box_id: &BoxId) -> Option<&ShippingRate> {
        self.rates
            .iter()
            .find(|r| r.carrier == carrier && &r.box_id == box_id)
    }

    pub fn default_for(&self, carrier: Carrier) -> DefaultRate {
        self.defaults
            .get(&carrier)
            .copied()
            .unwrap_or(Self::FALLBACK_DEFAULT)
    }

    /// Exact entry, or the carrier's default price for this box.
    ///
    /// The flag is `true` when the default was used.
    pub fn rate_or_default(&self, carrier: Carrier, box_id: &BoxId) -> (ShippingRate, bool) {
        match self.lookup(carrier, box_id) {
            Some(rate) => (rate.clone(), false),
            None => {
                let default = self.default_for(carrier);
                (
                    ShippingRate {
                        carrier,
                        box_id: box_id.clone(),
                        price: default.price,
                        transit_days: default.transit_days,
                    },
                    true,
                )
            }
        }
    }

    pub fn rates_for_box<'a>(
        &'a self,
        box_id: &BoxId,
    ) -> impl Iterator<Item = &'a ShippingRate> + use<'a> {
        let box_id = box_id.clone();
        self.rates.iter().filter(move |r| r.box_id == box_id)
    }

    /// Carriers with at least one rate entry, in carrier order.
    pub fn carriers(&self) -> Vec<Carrier> {
        let mut carriers: Vec<Carrier> = self.rates.iter().map(|r| r.carrier).collect();
        carriers.sort();
        carriers.dedup();
        carriers
    }

    pub fn cheapest_rate(&self, box_id: &BoxId) -> Option<&ShippingRate> {
        self.rates_for_box(box_id).min_by_key(|r| r.price)
    }

    pub fn fastest_rate(&self, box_id: &BoxId) -> Option<&ShippingRate> {
        self.rates_for_box(box_id).min_by_key(|r| r.transit_days)
    }

    /// Each carrier's exact rate for the box.
    pub fn compare_carriers(&self, box_id: &BoxId) -> BTreeMap<Carrier, &ShippingRate> {
        self.rates_for_box(box_id).map(|r| (r.carrier, r)).collect()
    }
}

/// Nominal delivery time of a carrier service.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DeliveryTime {
    NextDay,
    NextOrSecondDay,
    /// A range of days, e.g. "2-4 days".
    Days { min: u32, max: u32 },
    Unspecified,
}

impl fmt::Display for DeliveryTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryTime::NextDay => f.write_str("next day"),
            DeliveryTime::NextOrSecondDay => f.write_str("next or second day"),
            DeliveryTime::Days { min, max } => write!(f, "{}-{} days", min, max),
            DeliveryTime::Unspecified => f.write_str("unspecified"),
        }
    }
}

/// Geometry rule deciding whether a service may carry a given box.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum Applicability {
    Always,
    /// Thin mail services: outer box height must not exceed the limit.
    MaxBoxHeight { cm: f64 },
    /// Services bound to dedicated cartons.
    BoxIn { ids: Vec<BoxId> },
}

impl Applicability {
    pub fn allows(&self, b: &TransportBox) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::MaxBoxHeight { cm } => b.outer.height <= *cm,
            Applicability::BoxIn { ids } => ids.contains(&b.id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct CarrierService {
    pub carrier: Carrier,
    pub name: String,
    pub delivery: DeliveryTime,
    pub tracking: bool,
    pub insurance: bool,
    pub features: Vec<String>,
    pub applicability: Applicability,
}

impl CarrierService {
    fn new(
        carrier: Carrier,
        name: &str,
        delivery: DeliveryTime,
        (tracking, insurance): (bool, bool),
        features: &[&str],
        applicability: Applicability,
    ) -> Self {
        Self {
            carrier,
            name: name.to_string(),
            delivery,
            tracking,
            insurance,
            features: features.iter().map(|f| f.to_string()).collect(),
            applicability,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServiceTable {
    services: Vec<CarrierService>,
}

impl ServiceTable {
    pub const THIN_PARCEL_MAX_HEIGHT: f64 = 3.0;

    pub fn new(services: Vec<CarrierService>) -> Self {
        Self { services }
    }

    pub fn builtin() -> Self {
        use Applicability::{Always, BoxIn, MaxBoxHeight};
        use DeliveryTime::{Days, NextDay, NextOrSecondDay};

        let thin = || MaxBoxHeight {
            cm: Self::THIN_PARCEL_MAX_HEIGHT,
        };
        let compact = BoxIn {
            ids: vec![BoxId::from("B-60"), BoxId::from("B-80")],
        };

        Self::new(vec![
            CarrierService::new(
                Carrier::Yamato,
                "TA-Q-BIN",
                NextOrSecondDay,
                (true, true),
                &["time designation", "free redelivery", "convenience store pickup"],
                Always,
            ),
            CarrierService::new(
                Carrier::Yamato,
                "Nekopos",
                NextOrSecondDay,
                (true, false),
                &["mailbox delivery", "thin parcels only"],
                thin(),
            ),
            CarrierService::new(
                Carrier::Yamato,
                "TA-Q-BIN Compact",
                NextOrSecondDay,
                (true, true),
                &["dedicated box", "compact"],
                compact,
            ),
            CarrierService::new(
                Carrier::Sagawa,
                "Hikyaku Express",
                NextOrSecondDay,
                (true, true),
                &["time designation", "branch pickup"],
                Always,
            ),
            CarrierService::new(
                Carrier::Sagawa,
                "Hikyaku Mail",
                Days { min: 2, max: 4 },
                (true, false),
                &["mailbox delivery", "low price"],
                Always,
            ),
            CarrierService::new(
                Carrier::JapanPost,
                "Yu-Pack",
                NextOrSecondDay,
                (true, true),
                &["post office pickup", "convenience store pickup", "cash on delivery"],
                Always,
            ),
            CarrierService::new(
                Carrier::JapanPost,
                "Click Post",
                NextOrSecondDay,
                (true, false),
                &["flat nationwide rate", "mailbox delivery"],
                thin(),
            ),
            CarrierService::new(
                Carrier::JapanPost,
                "Letter Pack",
                NextDay,
                (true, false),
                &["face-to-face delivery", "flat nationwide rate"],
                Always,
            ),
        ])
    }

    pub fn for_carrier(&self, carrier: Carrier) -> impl Iterator<Item = &CarrierService> {
        self.services.iter().filter(move |s| s.carrier == carrier)
    }

    /// Carriers offering at least one service, in carrier order.
    pub fn carriers(&self) -> Vec<Carrier> {
        let mut carriers: Vec<Carrier> = self.services.iter().map(|s| s.carrier).collect();
        carriers.sort();
        carriers.dedup();
        carriers
    }
}

/// Optional extras that add a per-carrier surcharge.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Addon {
    TimeDesignation,
    CashOnDelivery,
    InsuranceExtra,
    ExpressDelivery,
}

#[derive(Clone, Debug)]
pub struct SurchargeTable {
    surcharges: BTreeMap<Addon, BTreeMap<Carrier, u32>>,
}

impl SurchargeTable {
    pub fn new(surcharges: BTreeMap<Addon, BTreeMap<Carrier, u32>>) -> Self {
        Self { surcharges }
    }

    pub fn builtin() -> Self {
        let per_carrier = |yamato: u32, sagawa: u32, post: u32| {
            BTreeMap::from([
                (Carrier::Yamato, yamato),
                (Carrier::Sagawa, sagawa),
                (Carrier::JapanPost, post),
            ])
        };
        Self::new(BTreeMap::from([
            (Addon::TimeDesignation, per_carrier(0, 0, 0)),
            (Addon::CashOnDelivery, per_carrier(330, 330, 260)),
            (Addon::InsuranceExtra, per_carrier(0, 0, 0)),
            (Addon::ExpressDelivery, per_carrier(220, 220, 320)),
        ]))
    }

    /// Surcharge in yen; 0 if the add-on or carrier is not listed.
    pub fn surcharge(&self, addon: Addon, carrier: Carrier) -> u32 {
        self.surcharges
            .get(&addon)
            .and_then(|by_carrier| by_carrier.get(&carrier))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all enabled add-ons for the carrier.
    pub fn total_for(&self, carrier: Carrier, addons: &BTreeMap<Addon, bool>) -> u32 {
        addons
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(addon, _)| self.surcharge(*addon, carrier))
            .fold(0, u32::saturating_add)
    }
}

/// All reference data the planner reads.
#[derive(Clone, Debug)]
pub struct Catalogs {
    pub products: ProductCatalog,
    pub boxes: BoxCatalog,
    pub rates: RateTable,
    pub services: ServiceTable,
    pub surcharges: SurchargeTable,
}

impl Catalogs {
    pub fn builtin() -> Result<Self, ValidationError> {
        Ok(Self {
            products: ProductCatalog::builtin()?,
            boxes: BoxCatalog::builtin()?,
            rates: RateTable::builtin(),
            services: ServiceTable::builtin(),
            surcharges: SurchargeTable::builtin(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogs_load() {
        let catalogs = Catalogs::builtin().expect("built-in data must be valid");
        assert_eq!(catalogs.products.all().count(), 5);
        assert_eq!(catalogs.boxes.all().len(), 5);
        assert_eq!(catalogs.rates.carriers(), Carrier::ALL.to_vec());
        assert_eq!(catalogs.services.carriers(), Carrier::ALL.to_vec());
    }

    #[test]
    fn product_lookup_by_label() {
        let products = ProductCatalog::builtin().unwrap();
        let s = products.lookup("S").expect("S exists");
        assert!((s.dims.volume() - 274.625).abs() < 1e-9);
        assert_eq!(s.weight, 0.073);
        assert!(products.lookup("XL").is_none());
    }

    #[test]
    fn rate_falls_back_to_carrier_default() {
        let rates = RateTable::builtin();
        let (exact, fallback) = rates.rate_or_default(Carrier::Sagawa, &BoxId::from("No.2"));
        assert!(!fallback);
        assert_eq!(exact.price, 950);

        let (default, fallback) = rates.rate_or_default(Carrier::JapanPost, &BoxId::from("B-60"));
        assert!(fallback);
        assert_eq!(default.price, 700);
        assert_eq!(default.box_id, BoxId::from("B-60"));
    }

    #[test]
    fn cheapest_fastest_and_comparison() {
        let rates = RateTable::builtin();
        let id = BoxId::from("No.5");
        assert_eq!(rates.cheapest_rate(&id).map(|r| r.carrier), Some(Carrier::Sagawa));
        assert_eq!(rates.fastest_rate(&id).map(|r| r.transit_days), Some(1));
        let comparison = rates.compare_carriers(&id);
        assert_eq!(comparison.len(), 3);
        assert_eq!(comparison[&Carrier::JapanPost].price, 1350);
        assert!(rates.cheapest_rate(&BoxId::from("unknown")).is_none());
    }

    #[test]
    fn rate_lookups_outlive_the_box_id() {
        let rates = RateTable::builtin();
        let (cheapest, fastest, comparison) = {
            let id = BoxId::from("No.2");
            (
                rates.cheapest_rate(&id),
                rates.fastest_rate(&id),
                rates.compare_carriers(&id),
            )
        };
        assert_eq!(cheapest.map(|r| r.price), Some(950));
        assert_eq!(fastest.map(|r| r.transit_days), Some(1));
        assert_eq!(comparison[&Carrier::Yamato].price, 1000);
    }

    #[test]
    fn applicability_rules() {
        let boxes = BoxCatalog::builtin().unwrap();
        let no1 = boxes.get(&BoxId::from("No.1")).unwrap();
        let envelope =
            TransportBox::new("B-60", Dimensions::new(34.0, 25.0, 2.5), 1.0).unwrap();

        let thin = Applicability::MaxBoxHeight { cm: 3.0 };
        assert!(!thin.allows(no1));
        assert!(thin.allows(&envelope));

        let compact = Applicability::BoxIn {
            ids: vec![BoxId::from("B-60")],
        };
        assert!(!compact.allows(no1));
        assert!(compact.allows(&envelope));
        assert!(Applicability::Always.allows(no1));
    }

    #[test]
    fn surcharges_sum_enabled_addons_only() {
        let table = SurchargeTable::builtin();
        let addons = BTreeMap::from([
            (Addon::CashOnDelivery, true),
            (Addon::ExpressDelivery, true),
            (Addon::TimeDesignation, false),
        ]);
        assert_eq!(table.total_for(Carrier::Yamato, &addons), 550);
        assert_eq!(table.total_for(Carrier::JapanPost, &addons), 580);

        let empty = SurchargeTable::new(BTreeMap::new());
        assert_eq!(empty.total_for(Carrier::Yamato, &addons), 0);
    }
}
