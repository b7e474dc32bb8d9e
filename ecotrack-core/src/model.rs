//! Domain data structures for bins, collection routes, and users.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Highest fill level a bin can report, in percent.
pub const MAX_FILL_LEVEL: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a tracked bin, e.g. `BIN-001`.
pub struct BinId(pub String);

impl BinId {
    /// Build an identifier from anything string-like.
    #[must_use]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for BinId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Position on the normalized 0–100 display grid.
pub struct Coordinates {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Waste stream a bin accepts.
pub enum BinType {
    /// Mixed residual waste.
    General,
    /// Recyclables.
    Recycle,
    /// Compostable waste.
    Organic,
}

impl BinType {
    /// All bin types in display order.
    pub const ALL: [BinType; 3] = [BinType::General, BinType::Recycle, BinType::Organic];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            BinType::General => "General",
            BinType::Recycle => "Recycle",
            BinType::Organic => "Organic",
        }
    }
}

impl fmt::Display for BinType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A physical waste receptacle reporting its fill level.
pub struct Bin {
    /// Unique, stable identifier.
    pub id: BinId,
    /// Human label for where the bin stands.
    pub location_name: String,
    /// Display position.
    pub coordinates: Coordinates,
    /// Fill level in percent, always within `0..=100`.
    pub fill_level: u8,
    /// When the bin was last emptied.
    pub last_collected: NaiveDateTime,
    /// Accepted waste stream, fixed at creation.
    pub kind: BinType,
    /// Display string from the overflow predictor, if one was requested.
    pub predicted_overflow: Option<String>,
}

impl Bin {
    /// Apply every field present in `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: BinPatch) {
        if let Some(level) = patch.fill_level {
            self.fill_level = level.min(MAX_FILL_LEVEL);
        }
        if let Some(at) = patch.last_collected {
            self.last_collected = at;
        }
        if let Some(name) = patch.location_name {
            self.location_name = name;
        }
        if let Some(prediction) = patch.predicted_overflow {
            self.predicted_overflow = Some(prediction);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Partial update for a [`Bin`]. Absent fields are left as they are.
///
/// The identifier and bin type are deliberately not part of the patch.
pub struct BinPatch {
    /// New fill level, clamped to 100.
    pub fill_level: Option<u8>,
    /// New collection timestamp.
    pub last_collected: Option<NaiveDateTime>,
    /// New location label.
    pub location_name: Option<String>,
    /// New overflow prediction text.
    pub predicted_overflow: Option<String>,
}

impl BinPatch {
    /// Patch that marks a bin as emptied at `at`.
    #[must_use]
    pub fn emptied(at: NaiveDateTime) -> Self {
        Self {
            fill_level: Some(0),
            last_collected: Some(at),
            ..Self::default()
        }
    }

    /// Patch that only sets the overflow prediction.
    #[must_use]
    pub fn prediction<S: Into<String>>(text: S) -> Self {
        Self {
            predicted_overflow: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a collection route.
pub struct RouteId(pub String);

impl fmt::Display for RouteId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Progress of a collection route.
pub enum RouteStatus {
    /// Planned but not started.
    Pending,
    /// A truck is on the way.
    InProgress,
    /// All stops collected.
    Completed,
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RouteStatus::Pending => "Pending",
            RouteStatus::InProgress => "In Progress",
            RouteStatus::Completed => "Completed",
        };
        formatter.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Where a route's ordering came from.
pub enum RouteSource {
    /// Ordered by the AI optimizer.
    Ai,
    /// Built locally after the optimizer failed.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A proposed truck itinerary.
pub struct CollectionRoute {
    /// Unique identifier.
    pub id: RouteId,
    /// Driver label shown to users.
    pub driver_name: String,
    /// Vehicle label shown to users.
    pub vehicle_id: String,
    /// Bin snapshots in visiting order.
    pub stops: Vec<Bin>,
    /// Distance as display text, e.g. `12.5 km`.
    pub total_distance: String,
    /// Duration as display text, e.g. `25 mins`.
    pub estimated_time: String,
    /// Current progress.
    pub status: RouteStatus,
    /// Whether the ordering came from the optimizer or the fallback.
    pub source: RouteSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Roles a user can sign in with.
pub enum UserRole {
    /// City administrator.
    Admin,
    /// Truck crew member.
    Collector,
    /// Resident with read-only access.
    Citizen,
}

impl UserRole {
    /// All roles in login-screen order.
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Collector, UserRole::Citizen];
}

impl fmt::Display for UserRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UserRole::Admin => "Admin",
            UserRole::Collector => "Collector",
            UserRole::Citizen => "Citizen",
        };
        formatter.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A signed-in actor.
pub struct User {
    /// Roster identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Role selected at login.
    pub role: UserRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Top-level screens of the dashboard.
pub enum View {
    /// Overview with counters and critical alerts.
    Dashboard,
    /// Bin table with empty/predict actions.
    Bins,
    /// Route planner and history.
    Routes,
    /// Fill levels and type distribution.
    Analytics,
}

impl View {
    /// All views in navigation order.
    pub const ALL: [View; 4] = [View::Dashboard, View::Bins, View::Routes, View::Analytics];

    /// Navigation label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Bins => "Bin Management",
            View::Routes => "Route Optimization",
            View::Analytics => "Analytics",
        }
    }

    /// Whether a user with `role` should see this view. Only used to filter navigation.
    #[must_use]
    pub const fn visible_to(self, role: UserRole) -> bool {
        match self {
            View::Dashboard => true,
            View::Bins | View::Routes => matches!(role, UserRole::Admin | UserRole::Collector),
            View::Analytics => matches!(role, UserRole::Admin),
        }
    }

    /// Views reachable for `role`, in navigation order.
    #[must_use]
    pub fn for_role(role: UserRole) -> Vec<View> {
        View::ALL
            .into_iter()
            .filter(|view| view.visible_to(role))
            .collect()
    }
}
