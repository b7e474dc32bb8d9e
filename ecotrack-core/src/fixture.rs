//! Static bin and user rosters loaded at startup and re-applied on reset.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{Bin, BinId, BinType, Coordinates, User, UserRole};

struct BinSeed {
    id: &'static str,
    location: &'static str,
    x: f64,
    y: f64,
    fill_level: u8,
    // (year, month, day, hour, minute)
    collected: (i32, u32, u32, u32, u32),
    kind: BinType,
}

const BIN_SEEDS: [BinSeed; 8] = [
    BinSeed {
        id: "BIN-001",
        location: "Central Park North",
        x: 20.0,
        y: 30.0,
        fill_level: 45,
        collected: (2024, 3, 10, 8, 0),
        kind: BinType::General,
    },
    BinSeed {
        id: "BIN-002",
        location: "Main St. Mall",
        x: 50.0,
        y: 50.0,
        fill_level: 85,
        collected: (2024, 3, 9, 14, 30),
        kind: BinType::Recycle,
    },
    BinSeed {
        id: "BIN-003",
        location: "City Library",
        x: 70.0,
        y: 20.0,
        fill_level: 12,
        collected: (2024, 3, 11, 9, 15),
        kind: BinType::General,
    },
    BinSeed {
        id: "BIN-004",
        location: "Tech District",
        x: 30.0,
        y: 70.0,
        fill_level: 92,
        collected: (2024, 3, 8, 18, 0),
        kind: BinType::Organic,
    },
    BinSeed {
        id: "BIN-005",
        location: "Subway Station 4",
        x: 80.0,
        y: 80.0,
        fill_level: 60,
        collected: (2024, 3, 10, 11, 0),
        kind: BinType::Recycle,
    },
    BinSeed {
        id: "BIN-006",
        location: "Community Center",
        x: 10.0,
        y: 60.0,
        fill_level: 30,
        collected: (2024, 3, 10, 13, 45),
        kind: BinType::Organic,
    },
    BinSeed {
        id: "BIN-007",
        location: "High School",
        x: 40.0,
        y: 10.0,
        fill_level: 78,
        collected: (2024, 3, 9, 7, 30),
        kind: BinType::General,
    },
    BinSeed {
        id: "BIN-008",
        location: "Market Square",
        x: 90.0,
        y: 40.0,
        fill_level: 95,
        collected: (2024, 3, 7, 16, 20),
        kind: BinType::General,
    },
];

fn timestamp((year, month, day, hour, minute): (i32, u32, u32, u32, u32)) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

/// The initial bin roster.
#[must_use]
pub fn initial_bins() -> Vec<Bin> {
    BIN_SEEDS
        .iter()
        .map(|seed| Bin {
            id: BinId::new(seed.id),
            location_name: seed.location.to_owned(),
            coordinates: Coordinates {
                x: seed.x,
                y: seed.y,
            },
            fill_level: seed.fill_level,
            last_collected: timestamp(seed.collected),
            kind: seed.kind,
            predicted_overflow: None,
        })
        .collect()
}

/// The fixed user roster offered on the login screen.
#[must_use]
pub fn users() -> Vec<User> {
    [
        ("u1", "Alice Admin", "admin@city.gov", UserRole::Admin),
        ("u2", "Bob Collector", "bob@waste.co", UserRole::Collector),
        ("u3", "Charlie Citizen", "charlie@gmail.com", UserRole::Citizen),
    ]
    .into_iter()
    .map(|(id, name, email, role)| User {
        id: id.to_owned(),
        name: name.to_owned(),
        email: email.to_owned(),
        role,
    })
    .collect()
}
