//! Maps loosely-typed upstream records onto [`NormalizedServer`].
//!
//! Every target attribute owns a priority-ordered alias list. Aliases are
//! tried in order and the first one holding a non-blank value wins, so the
//! tables below are the whole of the field-mapping behaviour.

use super::catalog::CatalogConfig;
use super::pricing::sanitize_price;
use super::{Availability, NormalizedServer, RawRecord};

pub const UNKNOWN_TEXT: &str = "Unknown";
pub const MISSING_SPEC: &str = "—";
pub const UNKNOWN_REGION: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

impl FieldAliases {
    /// First non-blank value among the aliases, trimmed.
    pub fn extract<'a>(&self, record: &'a RawRecord) -> Option<&'a str> {
        self.aliases
            .iter()
            .filter_map(|alias| record.get(*alias))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

pub const ID: FieldAliases = FieldAliases {
    field: "id",
    aliases: &["id", "ID", "Id", "server_id", "ServerId", "ServerID", "sku", "SKU"],
};

pub const CPU: FieldAliases = FieldAliases {
    field: "cpu",
    aliases: &[
        "cpu",
        "CPU",
        "Cpu",
        "processor",
        "Processor",
        "cpu_model",
        "CpuModel",
        "CPUModel",
        "cpuName",
        "CpuName",
    ],
};

pub const RAM: FieldAliases = FieldAliases {
    field: "ram",
    aliases: &["ram", "RAM", "Ram", "memory", "Memory", "MemorySize", "memory_size"],
};

pub const STORAGE: FieldAliases = FieldAliases {
    field: "storage",
    aliases: &[
        "storage", "Storage", "disk", "Disk", "disks", "Disks", "drives", "Drives", "hdd", "HDD",
    ],
};

pub const BANDWIDTH: FieldAliases = FieldAliases {
    field: "bandwidth",
    aliases: &[
        "bandwidth",
        "Bandwidth",
        "port",
        "Port",
        "port_speed",
        "PortSpeed",
        "network",
        "Network",
        "uplink",
        "Uplink",
    ],
};

pub const LOCATION: FieldAliases = FieldAliases {
    field: "location",
    aliases: &[
        "location",
        "Location",
        "datacenter",
        "Datacenter",
        "DataCenter",
        "data_center",
        "city",
        "City",
    ],
};

pub const REGION: FieldAliases = FieldAliases {
    field: "region",
    aliases: &["region", "Region", "region_code", "RegionCode", "regionCode"],
};

pub const PRICE: FieldAliases = FieldAliases {
    field: "base_price",
    aliases: &[
        "base_price",
        "BasePrice",
        "basePrice",
        "price",
        "Price",
        "monthly_price",
        "MonthlyPrice",
        "cost",
        "Cost",
    ],
};

pub const AVAILABILITY: FieldAliases = FieldAliases {
    field: "availability",
    aliases: &[
        "availability",
        "Availability",
        "status",
        "Status",
        "available",
        "Available",
        "in_stock",
        "InStock",
    ],
};

pub const STOCK: FieldAliases = FieldAliases {
    field: "stock",
    aliases: &[
        "stock",
        "Stock",
        "quantity",
        "Quantity",
        "qty",
        "Qty",
        "available_count",
        "AvailableCount",
    ],
};

const AVAILABLE_WORDS: &[&str] = &["available", "in stock", "instock", "yes", "true", "1"];
const SOLDOUT_WORDS: &[&str] = &[
    "soldout",
    "sold out",
    "sold_out",
    "out of stock",
    "outofstock",
    "unavailable",
    "no",
    "false",
    "0",
];

/// Parses the first numeric run of `text`, ignoring currency symbols and
/// thousands separators.
pub fn parse_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let negative = text[..start].trim_end().ends_with('-');
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    let value: f64 = digits.trim_end_matches('.').parse().ok()?;
    Some(if negative { -value } else { value })
}

pub fn parse_availability(text: &str) -> Option<Availability> {
    let lowered = text.trim().to_lowercase();
    if SOLDOUT_WORDS.contains(&lowered.as_str()) {
        Some(Availability::Soldout)
    } else if AVAILABLE_WORDS.contains(&lowered.as_str()) {
        Some(Availability::Available)
    } else {
        None
    }
}

/// Upper-cases an explicit region code, otherwise slugs the free-text
/// location down to its ASCII alphanumerics.
pub fn derive_region(explicit: Option<&str>, location: Option<&str>) -> String {
    if let Some(code) = explicit.map(str::trim).filter(|c| !c.is_empty()) {
        return code.to_uppercase();
    }
    let slug: String = location
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_uppercase();
    if slug.is_empty() {
        UNKNOWN_REGION.to_string()
    } else {
        slug
    }
}

/// Normalizes one record. `index` is the record's position upstream and only
/// feeds the synthetic id used when the record carries none.
pub fn normalize_record(
    record: &RawRecord,
    index: usize,
    catalog: &CatalogConfig,
) -> NormalizedServer {
    let text_or = |aliases: &FieldAliases, default: &str| {
        aliases.extract(record).unwrap_or(default).to_string()
    };

    let cpu = text_or(&CPU, UNKNOWN_TEXT);
    let location_raw = LOCATION.extract(record);
    let region = derive_region(REGION.extract(record), location_raw);

    let stock_raw = STOCK.extract(record);
    let stock = stock_raw
        .and_then(parse_number)
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
        .unwrap_or(0);

    let availability = AVAILABILITY
        .extract(record)
        .and_then(parse_availability)
        .unwrap_or(if stock_raw.is_none() || stock > 0 {
            Availability::Available
        } else {
            Availability::Soldout
        });

    let base_price = PRICE
        .extract(record)
        .and_then(parse_number)
        .map(sanitize_price)
        .unwrap_or(0.0);

    let tier = catalog.classifier.classify(&cpu);
    let marked_up_price = catalog.markup.marked_up_price(base_price, tier);

    NormalizedServer {
        id: ID
            .extract(record)
            .map(str::to_string)
            .unwrap_or_else(|| format!("srv-{index}")),
        cpu,
        ram: text_or(&RAM, MISSING_SPEC),
        storage: text_or(&STORAGE, MISSING_SPEC),
        bandwidth: text_or(&BANDWIDTH, MISSING_SPEC),
        location: location_raw.unwrap_or(UNKNOWN_TEXT).to_string(),
        region,
        availability,
        base_price,
        marked_up_price,
        tier,
        stock,
    }
}

pub fn normalize_all(records: &[RawRecord], catalog: &CatalogConfig) -> Vec<NormalizedServer> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(record, index, catalog))
        .collect()
}
