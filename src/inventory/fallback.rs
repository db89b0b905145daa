use once_cell::sync::Lazy;

use super::RawRecord;

// id, cpu, ram, storage, bandwidth, location, region, price, stock
type Row = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

#[rustfmt::skip]
const ROWS: &[Row] = &[
    ("fb-basic-mia-1", "Intel Xeon E3-1240 v6", "32GB DDR4", "1x 480GB SSD", "1Gbps", "Miami, FL", "MIA", "59.00", "6"),
    ("fb-basic-nyc-1", "Intel Xeon E-2388G", "64GB DDR4", "2x 960GB NVMe", "1Gbps", "New York, NY", "NYC", "89.00", "3"),
    ("fb-basic-dal-1", "Intel Xeon Silver 4214", "64GB DDR4", "2x 1TB SSD", "1Gbps", "Dallas, TX", "DAL", "99.00", "0"),
    ("fb-core-mia-1", "Intel Xeon E5-2680 v4", "64GB DDR4", "2x 1TB SSD", "1Gbps", "Miami, FL", "MIA", "109.00", "4"),
    ("fb-core-lax-1", "Intel Xeon E5-2697 v2", "128GB DDR3", "2x 2TB HDD", "1Gbps", "Los Angeles, CA", "LAX", "119.00", "2"),
    ("fb-core-sea-1", "Intel Xeon W-2145", "128GB DDR4", "2x 1TB NVMe", "1Gbps", "Seattle, WA", "SEA", "139.00", "0"),
    ("fb-ultra-nyc-1", "Intel Xeon Gold 6248R", "192GB DDR4", "2x 1.92TB NVMe", "10Gbps", "New York, NY", "NYC", "229.00", "2"),
    ("fb-ultra-dal-1", "Dual Xeon E5-2690 v4", "256GB DDR4", "4x 960GB SSD", "10Gbps", "Dallas, TX", "DAL", "199.00", "5"),
    ("fb-titan-mia-1", "AMD EPYC 7543P", "256GB DDR4", "2x 3.84TB NVMe", "10Gbps", "Miami, FL", "MIA", "349.00", "2"),
    ("fb-titan-lax-1", "Intel Xeon Platinum 8280", "384GB DDR4", "4x 1.92TB NVMe", "10Gbps", "Los Angeles, CA", "LAX", "399.00", "1"),
    ("fb-velocity-mia-1", "AMD Ryzen 9 7950X", "128GB DDR5", "2x 2TB NVMe", "10Gbps", "Miami, FL", "MIA", "249.00", "3"),
    ("fb-velocity-nyc-1", "AMD Ryzen 9 5950X", "128GB DDR4", "2x 1TB NVMe", "1Gbps", "New York, NY", "NYC", "189.00", "0"),
    ("fb-velocity-sea-1", "AMD EPYC 9354P", "384GB DDR5", "2x 3.84TB NVMe", "10Gbps", "Seattle, WA", "SEA", "449.00", "1"),
];

/// Representative inventory served when the upstream is unavailable. Shaped
/// like upstream records so it goes through the same normalization.
pub static FALLBACK_RECORDS: Lazy<Vec<RawRecord>> = Lazy::new(|| {
    ROWS.iter()
        .map(|(id, cpu, ram, storage, bandwidth, location, region, price, stock)| {
            [
                ("id", *id),
                ("cpu", *cpu),
                ("ram", *ram),
                ("storage", *storage),
                ("bandwidth", *bandwidth),
                ("location", *location),
                ("region", *region),
                ("base_price", *price),
                ("stock", *stock),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
        })
        .collect()
});

pub fn fallback_records() -> &'static [RawRecord] {
    &FALLBACK_RECORDS
}
