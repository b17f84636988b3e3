//! Dashboard topic areas and their indicator code tables.
//!
//! Each domain is served by exactly one upstream; the tables carry the
//! human-readable names the upstreams often omit.

use crate::indicator::SourceId;

/// A dashboard topic area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// WHO health indicators.
    Health,
    /// UNESCO education indicators.
    Education,
    /// World Bank economic indicators.
    Economics,
    /// World Bank demographic indicators.
    Demographics,
    /// World Bank infrastructure indicators.
    Infrastructure,
    /// World Bank environment indicators.
    Environment,
}

/// WHO health indicator table.
const HEALTH: &[(&str, &str)] = &[
    ("WHOSIS_000001", "Life expectancy at birth"),
    ("WHOSIS_000015", "Infant mortality rate"),
    ("MDG_0000000001", "Maternal mortality ratio"),
    ("WHS9_86", "Tuberculosis incidence"),
    ("MALARIA_EST_DEATHS", "Malaria deaths (estimated)"),
    ("HIV_0000000026", "HIV prevalence"),
    ("NUTRITION_ANAEMIA_CHILDREN_PREV", "Anaemia prevalence in children"),
];

/// UNESCO education indicator table.
const EDUCATION: &[(&str, &str)] = &[
    ("CR.1", "Completion rate, primary education"),
    ("CR.2", "Completion rate, lower secondary education"),
    ("CR.3", "Completion rate, upper secondary education"),
    ("ROFST.1", "Out-of-school rate, primary education"),
];

/// World Bank economic indicator table.
const ECONOMICS: &[(&str, &str)] = &[
    ("NY.GDP.MKTP.CD", "GDP (current US$)"),
    ("NY.GDP.PCAP.CD", "GDP per capita (current US$)"),
    ("FP.CPI.TOTL.ZG", "Inflation, consumer prices (annual %)"),
    ("SL.UEM.TOTL.ZS", "Unemployment, total (% of labor force)"),
];

/// World Bank demographic indicator table.
const DEMOGRAPHICS: &[(&str, &str)] = &[
    ("SP.POP.TOTL", "Population, total"),
    ("SP.DYN.LE00.IN", "Life expectancy at birth (years)"),
    ("SP.URB.TOTL.IN.ZS", "Urban population (% of total)"),
    ("SP.POP.GROW", "Population growth (annual %)"),
];

/// World Bank infrastructure indicator table.
const INFRASTRUCTURE: &[(&str, &str)] = &[
    ("EG.ELC.ACCS.ZS", "Access to electricity (% of population)"),
    ("IT.NET.USER.ZS", "Internet users (% of population)"),
    ("IT.CEL.SETS.P2", "Mobile subscriptions (per 100 people)"),
];

/// World Bank environment indicator table.
const ENVIRONMENT: &[(&str, &str)] = &[
    ("AG.LND.FRST.ZS", "Forest area (% of land area)"),
    ("AG.LND.AGRI.ZS", "Agricultural land (% of land area)"),
    ("EN.ATM.CO2E.PC", "CO2 emissions (metric tons per capita)"),
];

impl Domain {
    /// All domains, in display order.
    pub const ALL: [Domain; 6] = [
        Domain::Health,
        Domain::Education,
        Domain::Economics,
        Domain::Demographics,
        Domain::Infrastructure,
        Domain::Environment,
    ];

    /// Parse a URL path segment into a domain.
    pub fn parse(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "health" => Some(Domain::Health),
            "education" => Some(Domain::Education),
            "economics" | "economy" => Some(Domain::Economics),
            "demographics" => Some(Domain::Demographics),
            "infrastructure" => Some(Domain::Infrastructure),
            "environment" => Some(Domain::Environment),
            _ => None,
        }
    }

    /// Canonical path segment for the domain.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Health => "health",
            Domain::Education => "education",
            Domain::Economics => "economics",
            Domain::Demographics => "demographics",
            Domain::Infrastructure => "infrastructure",
            Domain::Environment => "environment",
        }
    }

    /// The upstream serving this domain.
    pub fn source(&self) -> SourceId {
        match self {
            Domain::Health => SourceId::Who,
            Domain::Education => SourceId::Unesco,
            _ => SourceId::WorldBank,
        }
    }

    /// `(code, name)` table for this domain.
    pub fn indicators(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Domain::Health => HEALTH,
            Domain::Education => EDUCATION,
            Domain::Economics => ECONOMICS,
            Domain::Demographics => DEMOGRAPHICS,
            Domain::Infrastructure => INFRASTRUCTURE,
            Domain::Environment => ENVIRONMENT,
        }
    }

    /// Just the codes, for fetch fan-out.
    pub fn codes(&self) -> Vec<&'static str> {
        self.indicators().iter().map(|(code, _)| *code).collect()
    }
}

/// Human-readable name for a code, searching every domain table.
pub fn indicator_name(code: &str) -> Option<&'static str> {
    Domain::ALL.iter().find_map(|domain| {
        domain
            .indicators()
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    })
}

/// The upstream that owns a code, searching every domain table.
pub fn owning_source(code: &str) -> Option<SourceId> {
    Domain::ALL.iter().find_map(|domain| {
        domain
            .indicators()
            .iter()
            .any(|(c, _)| *c == code)
            .then(|| domain.source())
    })
}

/// Headline indicators shown on the summary page.
pub const SUMMARY_INDICATORS: &[(SourceId, &str)] = &[
    (SourceId::Who, "WHOSIS_000001"),
    (SourceId::WorldBank, "SP.POP.TOTL"),
    (SourceId::WorldBank, "NY.GDP.MKTP.CD"),
    (SourceId::Unesco, "CR.1"),
];
