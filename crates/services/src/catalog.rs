//! Static policy tables for the reward economy: badges, levels, and the perk
//! catalog. These are program data, not per-deployment configuration.

/// What a badge measures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BadgeCriterion {
    /// Cumulative ledger points reach the threshold.
    TotalPoints(u64),
    /// Number of reports the user has submitted.
    TotalReports(usize),
    /// Number of the user's reports that reached completion.
    CompletedReports(usize),
    /// Cumulative collected/reported weight in kg.
    TotalWeightKg(f64),
}

#[derive(Debug, Clone, Copy)]
pub struct BadgeSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points_required: u64,
    pub category: &'static str,
    pub criterion: BadgeCriterion,
}

pub const BADGES: &[BadgeSpec] = &[
    BadgeSpec {
        id: "first_report",
        name: "First Report",
        description: "Submitted your first garbage report",
        points_required: 0,
        category: "milestone",
        criterion: BadgeCriterion::TotalReports(1),
    },
    BadgeSpec {
        id: "week_warrior",
        name: "Week Warrior",
        description: "5 reports in a week",
        points_required: 100,
        category: "activity",
        criterion: BadgeCriterion::TotalPoints(100),
    },
    BadgeSpec {
        id: "location_scout",
        name: "Location Scout",
        description: "Reports from 5 different areas",
        points_required: 250,
        category: "exploration",
        criterion: BadgeCriterion::TotalReports(5),
    },
    BadgeSpec {
        id: "eco_champion",
        name: "Eco Champion",
        description: "500 points milestone",
        points_required: 500,
        category: "milestone",
        criterion: BadgeCriterion::TotalPoints(500),
    },
    BadgeSpec {
        id: "community_hero",
        name: "Community Hero",
        description: "10 completed reports",
        points_required: 300,
        category: "community",
        criterion: BadgeCriterion::CompletedReports(10),
    },
    BadgeSpec {
        id: "clean_city_partner",
        name: "Clean City Partner",
        description: "1000 points milestone",
        points_required: 1000,
        category: "partnership",
        criterion: BadgeCriterion::TotalPoints(1000),
    },
    BadgeSpec {
        id: "waste_warrior",
        name: "Waste Warrior",
        description: "20kg+ waste reported",
        points_required: 600,
        category: "impact",
        criterion: BadgeCriterion::TotalWeightKg(20.0),
    },
    BadgeSpec {
        id: "super_reporter",
        name: "Super Reporter",
        description: "25 reports submitted",
        points_required: 750,
        category: "activity",
        criterion: BadgeCriterion::TotalReports(25),
    },
];

#[derive(Debug, Clone, Copy)]
pub struct LevelSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub points_required: u64,
    pub rewards: &'static [&'static str],
}

/// Ordered tier list; each entry's threshold is strictly above the previous.
pub const LEVELS: &[LevelSpec] = &[
    LevelSpec {
        id: "novice",
        name: "Novice",
        points_required: 0,
        rewards: &["Basic reporting access", "Community forum access"],
    },
    LevelSpec {
        id: "contributor",
        name: "Contributor",
        points_required: 100,
        rewards: &["Advanced reporting tools", "Priority support"],
    },
    LevelSpec {
        id: "advocate",
        name: "Advocate",
        points_required: 500,
        rewards: &["Organize cleanup drives", "Exclusive badges"],
    },
    LevelSpec {
        id: "champion",
        name: "Champion",
        points_required: 1000,
        rewards: &["Municipality partnerships", "VIP events"],
    },
    LevelSpec {
        id: "legend",
        name: "Legend",
        points_required: 2500,
        rewards: &["City recognition", "Leadership opportunities"],
    },
];

#[derive(Debug, Clone, Copy)]
pub struct PerkSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points_cost: u64,
    /// Lifetime-points unlock predicate, on top of the available-points cost.
    pub min_total_points: Option<u64>,
    pub category: &'static str,
    /// Informational only; redemption never decrements it.
    pub stock: u32,
}

pub const PERKS: &[PerkSpec] = &[
    PerkSpec {
        id: "eco_bottle",
        name: "Eco-friendly Water Bottle",
        description: "Reusable water bottle made from recycled materials",
        points_cost: 200,
        min_total_points: None,
        category: "merchandise",
        stock: 50,
    },
    PerkSpec {
        id: "community_pass",
        name: "Community Meetup Pass",
        description: "Free entry to next community cleanup event",
        points_cost: 150,
        min_total_points: None,
        category: "events",
        stock: 20,
    },
    PerkSpec {
        id: "tree_planting",
        name: "Tree Planting Kit",
        description: "Saplings and planting supplies for urban gardening",
        points_cost: 300,
        min_total_points: None,
        category: "environment",
        stock: 30,
    },
    PerkSpec {
        id: "municipality_recognition",
        name: "Municipality Recognition",
        description: "Get featured in city newsletter",
        points_cost: 500,
        min_total_points: Some(1000),
        category: "recognition",
        stock: 10,
    },
    PerkSpec {
        id: "vip_event",
        name: "VIP Cleanup Event",
        description: "Exclusive access to special cleanup initiatives",
        points_cost: 800,
        min_total_points: Some(1500),
        category: "exclusive",
        stock: 5,
    },
    PerkSpec {
        id: "leadership_workshop",
        name: "Environmental Leadership Workshop",
        description: "Attend exclusive workshop on environmental leadership",
        points_cost: 1000,
        min_total_points: Some(2000),
        category: "education",
        stock: 15,
    },
];

/// Catalog lookup by perk id.
pub fn perk_by_id(id: &str) -> Option<&'static PerkSpec> {
    PERKS.iter().find(|p| p.id == id)
}
